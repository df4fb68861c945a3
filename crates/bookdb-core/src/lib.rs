pub mod app_config;
pub mod book_id;
pub mod books;
pub mod config;
pub mod sink;

pub use app_config::{AppConfig, Environment};
pub use book_id::BookId;
pub use books::{
    BookDetail, BookDetailPatch, BookPatch, BookRecord, StoredBook, OUT_OF_STOCK, PRICE_LIMIT,
    PRICE_SCALE,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use sink::{BookSink, PersistenceError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid book id \"{0}\": expected 24 hexadecimal characters")]
    InvalidBookId(String),

    #[error("invalid book record field `{field}`: {reason}")]
    InvalidRecord { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
