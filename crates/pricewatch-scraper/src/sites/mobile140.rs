//! Mobile140 product-page extractor.
//!
//! Prices are listed in rial, so the plausibility floor sits an order of
//! magnitude above the toman sites; without it the text scan promotes
//! installment-plan month counts to prices.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(10_000);

const PRICE_SCOPES: &[&str] = &[
    "div.product-info span.sale-price",
    "div.product-info span.price",
];

const UNAVAILABLE_MARKERS: &[&str] = &["به من اطلاع بده", "تامین کننده ندارد"];

pub(super) struct Mobile140 {
    fetch: Arc<FetchClient>,
}

impl Mobile140 {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Mobile140 {
    fn site(&self) -> SiteId {
        SiteId::Mobile140
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
    fn rial_price_is_extracted_from_product_info() {
        let html = r#"<div class="product-info"><span class="sale-price">۲۵۴,۰۰۰,۰۰۰ ریال</span></div>"#;
        assert_eq!(price_from_html(html).unwrap(), 254_000_000);
    }

    #[test]
    fn rial_floor_drops_installment_month_counts() {
        // "12 ماه" styled text near a ریال suffix must not be taken as a price.
        let html = "<main><p>پرداخت در 12 قسط — قیمت ۲۵۴,۰۰۰,۰۰۰ ریال</p></main>";
        assert_eq!(price_from_html(html).unwrap(), 254_000_000);
    }

    #[test]
    fn notify_me_widget_reads_as_unavailable() {
        let html = "<button>به من اطلاع بده</button>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
