pub mod browser;
pub mod error;
pub mod fetch;
pub mod numerals;
pub mod sites;

pub use browser::PagePool;
pub use error::ScrapeError;
pub use fetch::FetchClient;
pub use numerals::{fold_digits, parse_price, PriceRules};
pub use sites::{Dispatcher, SiteExtractor, SiteId};
