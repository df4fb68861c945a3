use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Cooperative cancellation flag checked by the crawl driver before every
/// listing fetch and every detail fetch.
///
/// Clones share state, so one clone can be handed to a signal handler while
/// the driver polls another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Requests cancellation. Idempotent; only the first reason is kept.
    ///
    /// The reason is stored before the flag is raised, so an observer that
    /// sees the token cancelled also sees its reason.
    pub fn cancel(&self, reason: impl Into<String>) {
        if let Ok(mut slot) = self.inner.reason.lock() {
            if slot.is_none() {
                *slot = Some(reason.into());
            }
        }
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.inner.reason.lock().ok().and_then(|slot| slot.clone())
    }
}
