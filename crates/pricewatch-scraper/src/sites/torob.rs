//! Torob product-page extractor (rendered).
//!
//! Torob aggregates other shops' listings; the canonical number for a
//! product is its own "best price" field, which the client app stores in
//! `__NEXT_DATA__` once hydration finishes. The DOM price box lists every
//! shop's offer, so it is only scanned after the state blob.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::PagePool;
use crate::error::ScrapeError;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const STATE_KEYS: &[&str] = &["price", "min_price"];

const PRICE_SCOPES: &[&str] = &[
    "div[class*=\"ProductInfo\"] div[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["در هیچ فروشگاهی موجود نیست"];

pub(super) struct Torob {
    pool: Arc<PagePool>,
}

impl Torob {
    pub(super) fn new(pool: Arc<PagePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteExtractor for Torob {
    fn site(&self) -> SiteId {
        SiteId::Torob
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let rendered = self.pool.render(url, None).await?;
        price_from_html(&rendered.html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::next_data_price(html, STATE_KEYS, &PRICE_RULES) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_blob_best_price_wins_over_shop_list() {
        let html = r#"
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"baseProduct":{"price":31500000,"shops":[{"price":32900000}]}}}}
            </script>
            <div class="ProductInfo_box"><div class="price_row">۳۲,۹۰۰,۰۰۰</div></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 31_500_000);
    }

    #[test]
    fn no_shop_has_stock_is_unavailable() {
        let html = "<p>در هیچ فروشگاهی موجود نیست</p>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
