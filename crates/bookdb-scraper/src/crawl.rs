//! Pagination driver: walks listing pages, follows every item to its detail
//! page, and collects the normalized records into one batch.
//!
//! The driver is a strictly sequential state machine:
//!
//! ```text
//! Start -> FetchingListing -> ExtractingItems -> Advancing -+-> Done
//!               ^                                           |
//!               +-------------------------------------------+
//! (any state) -> Failed
//! ```
//!
//! A run either ends in `Done` with the complete batch or in `Failed` with no
//! batch at all. Cancellation is checked before each listing fetch and before
//! each detail fetch, and ends the run in `Failed` as well.

use std::sync::Arc;

use bookdb_core::{BookRecord, BookSink};

use crate::cancel::CancelToken;
use crate::client::PageFetcher;
use crate::detail::extract_detail;
use crate::diagnostics::Diagnostics;
use crate::error::ScraperError;
use crate::listing::parse_listing;
use crate::normalize::normalize;
use crate::pagination::PageCursor;
use crate::site::SiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Start,
    FetchingListing,
    ExtractingItems,
    Advancing,
    Done,
    Failed,
}

/// Termination bounds for a crawl. With neither set, the crawl runs until a
/// listing page has no next link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Stop once the page reached through a next link ending in this value
    /// has been processed, e.g. `"page-3.html"`.
    pub stop_at_next_link: Option<String>,
    /// Stop after this many listing pages.
    pub max_pages: Option<usize>,
}

/// Records of a completed crawl, in page-then-item order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlBatch {
    pub records: Vec<BookRecord>,
    pub pages: usize,
}

/// Outcome of [`crawl_into_sink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub inserted: usize,
}

/// Mutable state of one run. Owned by [`CrawlDriver::run`] and dropped with
/// the partial batch when the run fails.
struct Run {
    cursor: PageCursor,
    /// Link followed to reach the page in `cursor.url`.
    followed: String,
    markup: String,
    records: Vec<BookRecord>,
    pages: usize,
}

impl Run {
    fn new(start_url: &str) -> Self {
        Self {
            cursor: PageCursor::start(start_url),
            followed: String::new(),
            markup: String::new(),
            records: Vec::new(),
            pages: 0,
        }
    }
}

pub struct CrawlDriver<F> {
    fetcher: F,
    site: SiteConfig,
    options: CrawlOptions,
    diagnostics: Arc<dyn Diagnostics>,
    state: CrawlState,
}

impl<F: PageFetcher> CrawlDriver<F> {
    pub fn new(
        fetcher: F,
        site: SiteConfig,
        options: CrawlOptions,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            fetcher,
            site,
            options,
            diagnostics,
            state: CrawlState::Start,
        }
    }

    /// State reached by the most recent [`run`](Self::run).
    #[must_use]
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Crawls from `start_url` and returns the full batch.
    ///
    /// # Errors
    ///
    /// Returns the first fetch, parse, or validation error, or
    /// [`ScraperError::Cancelled`] if `cancel` was tripped. In every error
    /// case the records collected so far are discarded and the driver ends in
    /// [`CrawlState::Failed`].
    pub async fn run(
        &mut self,
        start_url: &str,
        cancel: &CancelToken,
    ) -> Result<CrawlBatch, ScraperError> {
        self.state = CrawlState::Start;
        let mut run = Run::new(start_url);

        loop {
            match self.step(&mut run, cancel).await {
                Ok(CrawlState::Done) => {
                    self.transition(CrawlState::Done);
                    self.diagnostics.info(&format!(
                        "crawl finished: {} records from {} pages",
                        run.records.len(),
                        run.pages
                    ));
                    return Ok(CrawlBatch {
                        records: run.records,
                        pages: run.pages,
                    });
                }
                Ok(next) => self.transition(next),
                Err(e) => {
                    self.transition(CrawlState::Failed);
                    self.diagnostics.error(
                        &format!(
                            "crawl failed on {}; discarding {} records",
                            run.cursor.url,
                            run.records.len()
                        ),
                        &e,
                    );
                    return Err(e);
                }
            }
        }
    }

    fn transition(&mut self, next: CrawlState) {
        tracing::debug!(from = ?self.state, to = ?next, "crawl state change");
        self.state = next;
    }

    async fn step(&self, run: &mut Run, cancel: &CancelToken) -> Result<CrawlState, ScraperError> {
        match self.state {
            CrawlState::Start => Ok(CrawlState::FetchingListing),
            CrawlState::FetchingListing => self.fetch_listing(run, cancel).await,
            CrawlState::ExtractingItems => self.extract_items(run, cancel).await,
            CrawlState::Advancing => Ok(self.advance(run)),
            CrawlState::Done | CrawlState::Failed => Ok(self.state),
        }
    }

    async fn fetch_listing(
        &self,
        run: &mut Run,
        cancel: &CancelToken,
    ) -> Result<CrawlState, ScraperError> {
        check_cancelled(cancel)?;

        let Some(url) = run.cursor.next_url() else {
            return Ok(CrawlState::Done);
        };
        run.markup = self.fetcher.fetch(&url).await?;
        run.followed = std::mem::take(&mut run.cursor.next_link);
        run.cursor.url = url;
        Ok(CrawlState::ExtractingItems)
    }

    async fn extract_items(
        &self,
        run: &mut Run,
        cancel: &CancelToken,
    ) -> Result<CrawlState, ScraperError> {
        let page_url = run.cursor.url.clone();
        let listing = parse_listing(&run.markup, &self.site, &page_url)?;
        run.markup.clear();

        self.diagnostics.info(&format!(
            "page {}: {} items on {page_url}",
            run.pages + 1,
            listing.items.len()
        ));

        for summary in &listing.items {
            check_cancelled(cancel)?;

            let markup = self.fetcher.fetch(&summary.detail_page_url).await?;
            let page = extract_detail(&markup).map_err(|e| e.at(&summary.detail_page_url))?;
            let record = normalize(summary, &page)?;

            self.diagnostics.info(&format!(
                "extracted \"{}\" (upc {}, {} reviews)",
                record.title, record.detail.upc, page.review_count
            ));
            run.records.push(record);
        }

        run.pages += 1;
        run.cursor.next_link = listing.next_link;
        Ok(CrawlState::Advancing)
    }

    fn advance(&self, run: &Run) -> CrawlState {
        if !run.cursor.has_next() {
            self.diagnostics.info("no next link; last page reached");
            return CrawlState::Done;
        }
        if let Some(marker) = self.options.stop_at_next_link.as_deref() {
            if !marker.is_empty() && run.followed.ends_with(marker) {
                self.diagnostics
                    .info(&format!("stop marker {marker} reached after {}", run.cursor.url));
                return CrawlState::Done;
            }
        }
        if self.options.max_pages.is_some_and(|max| run.pages >= max) {
            self.diagnostics
                .info(&format!("page limit reached after {} pages", run.pages));
            return CrawlState::Done;
        }
        CrawlState::FetchingListing
    }
}

fn check_cancelled(cancel: &CancelToken) -> Result<(), ScraperError> {
    if cancel.is_cancelled() {
        let reason = cancel.reason().unwrap_or_else(|| "cancelled".to_owned());
        return Err(ScraperError::Cancelled(reason));
    }
    Ok(())
}

/// Runs a crawl and hands the complete batch to `sink` in one call.
///
/// The sink is not called at all when the crawl fails.
///
/// # Errors
///
/// Returns any error from [`CrawlDriver::run`], or
/// [`ScraperError::Persistence`] if the sink rejects the batch.
pub async fn crawl_into_sink<F, S>(
    driver: &mut CrawlDriver<F>,
    sink: &S,
    start_url: &str,
    cancel: &CancelToken,
) -> Result<CrawlSummary, ScraperError>
where
    F: PageFetcher,
    S: BookSink,
{
    let batch = driver.run(start_url, cancel).await?;
    let pages = batch.pages;
    let inserted = sink.insert_batch(batch.records).await?;
    tracing::info!(pages, inserted, "crawl batch persisted");
    Ok(CrawlSummary { pages, inserted })
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
