use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default desktop-browser user agent for static fetches.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. All variables have
/// defaults; none are required.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let catalog_path = PathBuf::from(or_default("PRICEWATCH_CATALOG_PATH", "./catalog.json"));
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("PRICEWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let product_concurrency = parse_usize("PRICEWATCH_PRODUCT_CONCURRENCY", "2")?;
    let url_concurrency = parse_usize("PRICEWATCH_URL_CONCURRENCY", "5")?;
    let min_refresh_interval_mins = parse_i64("PRICEWATCH_MIN_REFRESH_INTERVAL_MINS", "10")?;
    let browser_pool_size = parse_usize("PRICEWATCH_BROWSER_POOL_SIZE", "5")?;
    let navigation_timeout_secs = parse_u64("PRICEWATCH_NAVIGATION_TIMEOUT_SECS", "30")?;
    let render_settle_ms = parse_u64("PRICEWATCH_RENDER_SETTLE_MS", "1500")?;
    let price_floor = parse_u64("PRICEWATCH_PRICE_FLOOR", "1000")?;

    Ok(AppConfig {
        catalog_path,
        log_level,
        request_timeout_secs,
        user_agent,
        product_concurrency,
        url_concurrency,
        min_refresh_interval_mins,
        browser_pool_size,
        navigation_timeout_secs,
        render_settle_ms,
        price_floor,
    })
}
