//! Emalls product-page extractor (rendered).
//!
//! Legacy ASP.NET WebForms front end with stable server-generated control
//! ids, but the price grid itself is filled in by script; rial values.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::PagePool;
use crate::error::ScrapeError;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(10_000);

const PRICE_SCOPES: &[&str] = &[
    "span#ContentPlaceHolder1_LblMinPrice",
    "div.shop-list div.price-cell",
];

const UNAVAILABLE_MARKERS: &[&str] = &["قیمتی ثبت نشده"];

pub(super) struct Emalls {
    pool: Arc<PagePool>,
}

impl Emalls {
    pub(super) fn new(pool: Arc<PagePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteExtractor for Emalls {
    fn site(&self) -> SiteId {
        SiteId::Emalls
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let rendered = self.pool.render(url, None).await?;
        price_from_html(&rendered.html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
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
