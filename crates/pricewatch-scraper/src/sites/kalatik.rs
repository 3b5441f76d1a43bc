//! Kalatik product-page extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div.kt-product-side b.kt-price",
    "div.kt-product-side span.kt-price-value",
];

const UNAVAILABLE_MARKERS: &[&str] = &["این کالا موقتا موجود نمی‌باشد"];

pub(super) struct Kalatik {
    fetch: Arc<FetchClient>,
}

impl Kalatik {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Kalatik {
    fn site(&self) -> SiteId {
        SiteId::Kalatik
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_panel_price_is_extracted() {
        let html = r#"<div class="kt-product-side"><b class="kt-price">۳۴,۷۰۰,۰۰۰ تومان</b></div>"#;
        assert_eq!(price_from_html(html).unwrap(), 34_700_000);
    }

    #[test]
    fn temporary_out_of_stock_is_unavailable() {
        let html = "<span>این کالا موقتا موجود نمی‌باشد</span>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
