//! Meghdadit product-page extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div#buy-box [itemprop=\"price\"]",
    "div#buy-box span.product-price",
];

const ATTR_SCOPES: &[(&str, &str)] = &[("div#buy-box [itemprop=\"price\"]", "content")];

const UNAVAILABLE_MARKERS: &[&str] = &["تماس بگیرید"];

pub(super) struct Meghdadit {
    fetch: Arc<FetchClient>,
}

impl Meghdadit {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Meghdadit {
    fn site(&self) -> SiteId {
        SiteId::Meghdadit
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    // Microdata first: the content attribute holds the unformatted value.
    if let Some(price) = extract::select_attr_price(html, ATTR_SCOPES, &PRICE_RULES) {
        return Ok(price);
    }
    if let Some(price) = extract::select_price(html, PRICE_SCOPES, &PRICE_RULES) {
        return Ok(price);
    }
    let text = extract::page_text(html);
    if let Some(price) = extract::scan_text_prices(&text, &PRICE_RULES).first().copied() {
        return Ok(price);
    }
    if extract::is_unavailable(&text, UNAVAILABLE_MARKERS) {
        return Err(ScrapeError::Unavailable);
    }
    Err(ScrapeError::PriceNotFound)
}
