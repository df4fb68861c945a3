use bookdb_core::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("invalid record field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("crawl cancelled: {0}")]
    Cancelled(String),
}

impl ScraperError {
    pub(crate) fn parse(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the context of a [`ScraperError::Parse`] with the page URL it
    /// came from. Other variants pass through unchanged.
    #[must_use]
    pub(crate) fn at(self, url: &str) -> Self {
        match self {
            Self::Parse { context, reason } => Self::Parse {
                context: format!("{context} of {url}"),
                reason,
            },
            other => other,
        }
    }

    /// `true` for network, timeout, and non-2xx failures.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Fetch { .. } | Self::UnexpectedStatus { .. }
        )
    }
}
