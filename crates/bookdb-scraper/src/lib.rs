pub mod cancel;
pub mod client;
pub mod crawl;
pub mod detail;
pub mod diagnostics;
pub mod error;
pub mod listing;
pub mod normalize;
pub mod pagination;
pub mod site;

pub use cancel::CancelToken;
pub use client::{HttpFetcher, PageFetcher};
pub use crawl::{crawl_into_sink, CrawlBatch, CrawlDriver, CrawlOptions, CrawlState, CrawlSummary};
pub use detail::{extract_detail, DetailPage};
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::ScraperError;
pub use listing::{extract_summary, parse_listing, BookSummary, ListingPage};
pub use normalize::normalize;
pub use pagination::PageCursor;
pub use site::SiteConfig;
