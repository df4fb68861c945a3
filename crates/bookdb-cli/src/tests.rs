use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["bookdb-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["bookdb-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["bookdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn crawl_without_flags_defers_to_config() {
    let cli = Cli::try_parse_from(["bookdb-cli", "crawl"]).unwrap();
    let Some(Commands::Crawl(args)) = cli.command else {
        panic!("expected crawl command");
    };
    assert!(args.url.is_none());
    assert!(args.stop_at.is_none());
    assert!(!args.all_pages);
    assert!(args.max_pages.is_none());
    assert!(!args.dry_run);
}

#[test]
fn crawl_accepts_bounds_and_dry_run() {
    let cli = Cli::try_parse_from([
        "bookdb-cli",
        "crawl",
        "--url",
        "https://books.toscrape.com/catalogue/page-1.html",
        "--stop-at",
        "page-5.html",
        "--max-pages",
        "4",
        "--dry-run",
    ])
    .unwrap();
    let Some(Commands::Crawl(args)) = cli.command else {
        panic!("expected crawl command");
    };
    assert_eq!(
        args.url.as_deref(),
        Some("https://books.toscrape.com/catalogue/page-1.html")
    );
    assert_eq!(args.stop_at.as_deref(), Some("page-5.html"));
    assert_eq!(args.max_pages, Some(4));
    assert!(args.dry_run);
}

#[test]
fn crawl_all_pages_conflicts_with_stop_at() {
    let result = Cli::try_parse_from([
        "bookdb-cli",
        "crawl",
        "--all-pages",
        "--stop-at",
        "page-3.html",
    ]);
    assert!(result.is_err());
}

#[test]
fn crawl_rejects_non_numeric_max_pages() {
    let result = Cli::try_parse_from(["bookdb-cli", "crawl", "--max-pages", "many"]);
    assert!(result.is_err());
}

#[test]
fn runs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["bookdb-cli", "runs"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 20 })));
}

#[test]
fn runs_accepts_limit() {
    let cli = Cli::try_parse_from(["bookdb-cli", "runs", "--limit", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 5 })));
}
