//! Digikala product-page extractor.
//!
//! ## Observed markup
//!
//! Server-rendered pages carry a schema.org `Product` JSON-LD block with
//! the selling price in toman — by far the most stable signal across
//! redesigns. The visible price lives inside the buy box
//! (`data-testid="buy-box"`); the same page also renders seller-list and
//! recommendation prices, so selectors must stay anchored on the buy box.
//! Out-of-stock pages drop the offer from JSON-LD and show «ناموجود» in
//! the buy box.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const PRICE_SCOPES: &[&str] = &[
    "div[data-testid=\"buy-box\"] span[data-testid=\"price-final\"]",
    "div[data-testid=\"buy-box\"] span[data-testid=\"price-no-discount\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["فروشنده‌ای برای این کالا وجود ندارد"];

pub(super) struct Digikala {
    fetch: Arc<FetchClient>,
}

impl Digikala {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Digikala {
    fn site(&self) -> SiteId {
        SiteId::Digikala
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
    }
}

fn price_from_html(html: &str) -> Result<u64, ScrapeError> {
    if let Some(price) = extract::jsonld_price(html, &PRICE_RULES) {
        tracing::debug!(price, "digikala: price from JSON-LD");
        return Ok(price);
    }
    if let Some(price) = extract::select_price(html, PRICE_SCOPES, &PRICE_RULES) {
        tracing::debug!(price, "digikala: price from buy box");
        return Ok(price);
    }
    let text = extract::page_text(html);
    if let Some(price) = extract::scan_text_prices(&text, &PRICE_RULES).first().copied() {
        tracing::debug!(price, "digikala: price from text scan");
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
    fn jsonld_wins_over_buy_box() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"price": "24500000"}}
            </script>
            <div data-testid="buy-box"><span data-testid="price-final">۲۴,۹۰۰,۰۰۰</span></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 24_500_000);
    }

    #[test]
    fn buy_box_selector_ignores_seller_list() {
        let html = r#"
            <div data-testid="buy-box"><span data-testid="price-final">۲۴,۹۰۰,۰۰۰ تومان</span></div>
            <div class="sellers"><span data-testid="price-final">۲۶,۱۰۰,۰۰۰ تومان</span></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 24_900_000);
    }

    #[test]
    fn missing_offer_with_unavailable_text_is_distinguished() {
        let html = r"
            <div data-testid='buy-box'>
                <span>ناموجود</span>
                <p>فروشنده‌ای برای این کالا وجود ندارد</p>
            </div>
        ";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }

    #[test]
    fn empty_page_is_price_not_found() {
        assert!(matches!(
            price_from_html("<html><body></body></html>"),
            Err(ScrapeError::PriceNotFound)
        ));
    }
}
