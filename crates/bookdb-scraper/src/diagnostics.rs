//! Injectable sink for crawl diagnostics.
//!
//! One instance is built per process and shared as `Arc<dyn Diagnostics>`
//! with the fetcher and the driver. Production code uses
//! [`TracingDiagnostics`]; tests substitute a recorder.

/// Receives one event per notable crawl step (fetches, extracted records,
/// state changes) and one per failure.
pub trait Diagnostics: Send + Sync {
    fn info(&self, event: &str);
    fn error(&self, event: &str, cause: &dyn std::error::Error);
}

/// Forwards crawl diagnostics to `tracing` under the `bookdb::crawl` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn info(&self, event: &str) {
        tracing::info!(target: "bookdb::crawl", "{event}");
    }

    fn error(&self, event: &str, cause: &dyn std::error::Error) {
        tracing::error!(target: "bookdb::crawl", error = %cause, "{event}");
    }
}
