use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_START_URL: &str = "https://books.toscrape.com/catalogue/category/books_1/page-1.html";
const DEFAULT_SITE_ROOT: &str = "https://books.toscrape.com/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let http_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default).trim().to_string();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an absolute http(s) URL, got '{raw}'"),
            })
        }
    };

    let database_url = require("DATABASE_URL")?;
    if database_url.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "DATABASE_URL".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let env = parse_environment(&or_default("BOOKDB_ENV", "development"))?;
    let bind_addr = parse_addr("BOOKDB_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("BOOKDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("BOOKDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BOOKDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BOOKDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("BOOKDB_SCRAPER_REQUEST_TIMEOUT_SECS", "10")?;
    let scraper_user_agent = or_default("BOOKDB_SCRAPER_USER_AGENT", "bookdb/0.1 (catalog-crawler)");

    let crawl_start_url = http_url("BOOKDB_CRAWL_START_URL", DEFAULT_START_URL)?;
    let crawl_stop_at = Some(or_default("BOOKDB_CRAWL_STOP_AT", "page-3.html"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut site_root = http_url("BOOKDB_SITE_ROOT", DEFAULT_SITE_ROOT)?;
    if !site_root.ends_with('/') {
        site_root.push('/');
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        crawl_start_url,
        crawl_stop_at,
        site_root,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BOOKDB_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
