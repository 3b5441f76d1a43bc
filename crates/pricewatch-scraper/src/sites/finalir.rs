//! Final product-page extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div.product-purchase span.discount-price",
    "div.product-purchase span.main-price",
];

const UNAVAILABLE_MARKERS: &[&str] = &["اتمام موجودی کالا"];

pub(super) struct Final {
    fetch: Arc<FetchClient>,
}

impl Final {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Final {
    fn site(&self) -> SiteId {
        SiteId::Final
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::jsonld_price(html, &PRICE_RULES) {
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
