//! Okala product-page extractor (rendered).
//!
//! The price block is painted client-side after a storefront API call, so
//! a plain fetch returns an empty shell; the page must run in the
//! headless browser before the selectors below mean anything.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::PagePool;
use crate::error::ScrapeError;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div.product-price-block span.discounted-amount",
    "div.product-price-block span.amount",
];

const UNAVAILABLE_MARKERS: &[&str] = &["در فروشگاه انتخابی موجود نیست"];

pub(super) struct Okala {
    pool: Arc<PagePool>,
}

impl Okala {
    pub(super) fn new(pool: Arc<PagePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteExtractor for Okala {
    fn site(&self) -> SiteId {
        SiteId::Okala
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_amount_beats_regular_amount() {
        let html = r#"
            <div class="product-price-block">
                <span class="amount">۴۸,۵۰۰ تومان</span>
                <span class="discounted-amount">۴۲,۹۰۰ تومان</span>
            </div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 42_900);
    }

    #[test]
    fn store_specific_stockout_is_unavailable() {
        let html = "<p>در فروشگاه انتخابی موجود نیست</p>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }

    #[test]
    fn unrendered_shell_is_price_not_found() {
        let html = r#"<div id="root"></div>"#;
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::PriceNotFound)
        ));
    }
}
