//! `crawl` command: wires config, the HTTP fetcher, the pagination driver,
//! and the Postgres sink together, and records each run in `crawl_runs`.

use std::sync::Arc;
use std::time::Duration;

use bookdb_core::AppConfig;
use bookdb_db::PgBookSink;
use bookdb_scraper::{
    crawl_into_sink, CancelToken, CrawlDriver, CrawlOptions, CrawlSummary, Diagnostics, HttpFetcher,
    SiteConfig, TracingDiagnostics,
};
use clap::Args;

use crate::fail_run_best_effort;

#[derive(Debug, Args)]
pub(crate) struct CrawlArgs {
    /// First listing page [default: BOOKDB_CRAWL_START_URL]
    #[arg(long)]
    pub url: Option<String>,

    /// Stop after the page reached through this next link [default: BOOKDB_CRAWL_STOP_AT]
    #[arg(long)]
    pub stop_at: Option<String>,

    /// Ignore the stop marker and follow next links to the last page
    #[arg(long, conflicts_with = "stop_at")]
    pub all_pages: bool,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Crawl and report the batch size without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

impl CrawlArgs {
    fn start_url<'a>(&'a self, config: &'a AppConfig) -> &'a str {
        self.url.as_deref().unwrap_or(&config.crawl_start_url)
    }
}

/// Resolves the termination bounds from flags, falling back to config.
pub(crate) fn crawl_options(args: &CrawlArgs, config: &AppConfig) -> CrawlOptions {
    let stop_at_next_link = if args.all_pages {
        None
    } else {
        args.stop_at
            .clone()
            .or_else(|| config.crawl_stop_at.clone())
            .filter(|s| !s.trim().is_empty())
    };
    CrawlOptions {
        stop_at_next_link,
        max_pages: args.max_pages.filter(|&n| n > 0),
    }
}

pub(crate) fn build_driver(
    config: &AppConfig,
    options: CrawlOptions,
) -> anyhow::Result<CrawlDriver<HttpFetcher>> {
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.scraper_request_timeout_secs),
        &config.scraper_user_agent,
        Arc::clone(&diagnostics),
    )?;
    Ok(CrawlDriver::new(
        fetcher,
        SiteConfig::new(&config.site_root),
        options,
        diagnostics,
    ))
}

/// Token tripped by Ctrl-C for as long as the returned guard is alive.
struct CtrlCGuard {
    handle: tokio::task::JoinHandle<()>,
}

impl CtrlCGuard {
    fn install(token: &CancelToken) -> Self {
        let token = token.clone();
        let handle = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping crawl");
                token.cancel("interrupted by ctrl-c");
            }
        });
        Self { handle }
    }
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Crawls without touching the database and prints the batch size.
///
/// # Errors
///
/// Returns any crawl error; nothing is persisted either way.
pub(crate) async fn run_crawl_dry(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let options = crawl_options(args, config);
    let mut driver = build_driver(config, options)?;
    let cancel = CancelToken::new();
    let _guard = CtrlCGuard::install(&cancel);

    let batch = driver.run(args.start_url(config), &cancel).await?;
    println!(
        "dry-run: crawled {} records from {} pages; nothing written",
        batch.records.len(),
        batch.pages
    );
    Ok(())
}

/// Crawls and inserts the batch, tracking the run in `crawl_runs`.
///
/// A failed or interrupted crawl marks the run `failed` and inserts nothing.
///
/// # Errors
///
/// Returns an error if the run cannot be created or started, the crawl
/// fails, or the batch cannot be persisted.
pub(crate) async fn run_crawl(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    args: &CrawlArgs,
) -> anyhow::Result<()> {
    let options = crawl_options(args, config);
    let start_url = args.start_url(config);
    let mut driver = build_driver(config, options)?;
    run_crawl_with(pool, &mut driver, start_url, &CancelToken::new()).await
}

pub(crate) async fn run_crawl_with(
    pool: &sqlx::PgPool,
    driver: &mut CrawlDriver<HttpFetcher>,
    start_url: &str,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    let run = bookdb_db::create_crawl_run(pool, start_url, "cli").await?;
    if let Err(e) = bookdb_db::start_crawl_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
        return Err(e.into());
    }
    tracing::info!(run_id = run.id, start_url, "crawl started");

    let _guard = CtrlCGuard::install(cancel);
    let sink = PgBookSink::new(pool.clone());
    let summary = match crawl_into_sink(driver, &sink, start_url, cancel).await {
        Ok(summary) => summary,
        Err(e) => {
            fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
            return Err(e.into());
        }
    };

    complete_run_best_effort(pool, run.id, summary).await;

    println!(
        "crawl complete: inserted {} records from {} pages (run {})",
        summary.inserted, summary.pages, run.id
    );
    Ok(())
}

/// Marks a run `succeeded` once its batch has committed. A ledger failure at
/// this point is logged; the stored books stay and the run is not marked
/// `failed`.
pub(crate) async fn complete_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    summary: CrawlSummary,
) {
    let pages = i32::try_from(summary.pages).unwrap_or(i32::MAX);
    let records = i32::try_from(summary.inserted).unwrap_or(i32::MAX);
    if let Err(e) = bookdb_db::complete_crawl_run(pool, run_id, pages, records).await {
        tracing::error!(
            run_id,
            inserted = summary.inserted,
            error = %e,
            "batch stored but crawl run could not be marked succeeded"
        );
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
