pub mod app_config;
pub mod config;
mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    CrawlResult, CrawlStatus, PricePoint, ProductAggregate, ProductUrlEntry, TrackedProduct,
    PRICE_HISTORY_CAP,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
