//! Mobit product-page extractor.
//!
//! Next.js storefront: `__NEXT_DATA__` carries `selling_price` for the
//! default variant. The DOM fallback anchors on the order box.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(1_000);

const STATE_KEYS: &[&str] = &["selling_price", "discounted_price", "price"];

const PRICE_SCOPES: &[&str] = &[
    "section.order-box span.price-amount",
    "section.order-box span[class*=\"price\"]",
];

const UNAVAILABLE_MARKERS: &[&str] = &["مهلت سفارش به پایان رسید"];

pub(super) struct Mobit {
    fetch: Arc<FetchClient>,
}

impl Mobit {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Mobit {
    fn site(&self) -> SiteId {
        SiteId::Mobit
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
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
    fn next_data_selling_price_wins() {
        let html = r#"
            <script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"product":{"selling_price":15980000,"price":16500000}}}}
            </script>
            <section class="order-box"><span class="price-amount">۱۶,۲۰۰,۰۰۰</span></section>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 15_980_000);
    }

    #[test]
    fn order_box_selector_is_the_fallback() {
        let html = r#"<section class="order-box"><span class="price-amount">۱۶,۲۰۰,۰۰۰ تومان</span></section>"#;
        assert_eq!(price_from_html(html).unwrap(), 16_200_000);
    }

    #[test]
    fn expired_order_window_reads_as_unavailable() {
        let html = "<div>مهلت سفارش به پایان رسید</div>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
