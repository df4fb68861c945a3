mod crawl;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::crawl::CrawlArgs;

#[derive(Debug, Parser)]
#[command(name = "bookdb-cli")]
#[command(about = "Book catalog crawler and database tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the catalog and store every record in one batch
    Crawl(CrawlArgs),
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// List recent crawl runs
    Runs {
        /// Number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = bookdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("bookdb-cli: no command given; try `bookdb-cli --help`");
        return Ok(());
    };

    if let Commands::Crawl(args) = &command {
        if args.dry_run {
            return crawl::run_crawl_dry(&config, args).await;
        }
    }

    let pool_config = bookdb_db::PoolConfig::from_app_config(&config);
    let pool = bookdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Crawl(args) => {
            bookdb_db::run_migrations(&pool).await?;
            crawl::run_crawl(&pool, &config, &args).await?;
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            bookdb_db::health_check(&pool).await?;
            println!("database reachable");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = bookdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
        Commands::Runs { limit } => print_runs(&pool, limit).await?,
    }

    Ok(())
}

async fn print_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = bookdb_db::list_crawl_runs(pool, limit.clamp(1, 500)).await?;
    if runs.is_empty() {
        println!("no crawl runs recorded");
        return Ok(());
    }
    for run in runs {
        println!(
            "{:>6}  {:<9}  pages={:<4} records={:<6} {}  {}",
            run.id,
            run.status,
            run.pages_processed,
            run.records_processed,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.error_message.as_deref().unwrap_or(&run.start_url),
        );
    }
    Ok(())
}

/// Mark a crawl run as failed, logging rather than propagating any error from
/// the ledger update itself.
pub(crate) async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = bookdb_db::fail_crawl_run(pool, run_id, message).await {
        tracing::error!(run_id, error = %mark_err, "failed to mark crawl run as failed");
    }
}

#[cfg(test)]
mod tests;
