pub mod aggregate;
pub mod lock;
pub mod orchestrator;
pub mod store;

pub use aggregate::aggregate;
pub use lock::{CategoryGuard, CategoryLocks};
pub use orchestrator::{
    Crawler, Orchestrator, RefreshOptions, RefreshSummary, RefreshedProduct,
};
pub use store::{CatalogStore, MemoryCatalog, ProductFilter, StoreError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A refresh for this category is already running in this process.
    /// Reported as a conflict, not a failure.
    #[error("refresh already running for category \"{0}\"")]
    CategoryBusy(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
