//! Gooshishop product-page extractor.
//!
//! No structured data and a theme that renames price classes every few
//! months; the free-text scan carries most of the load here, with the
//! rial-level floor keeping review counts and model numbers out.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::fetch::FetchClient;
use crate::numerals::PriceRules;
use crate::sites::{extract, SiteExtractor, SiteId};

const PRICE_RULES: PriceRules = PriceRules::with_floor(10_000);

const PRICE_SCOPES: &[&str] = &[
    "div.product-buy-box span.woocommerce-Price-amount",
    "div.summary span.price ins",
    "div.summary span.price",
];

const UNAVAILABLE_MARKERS: &[&str] = &["در انبار موجود نمی‌باشد"];

pub(super) struct Gooshishop {
    fetch: Arc<FetchClient>,
}

impl Gooshishop {
    pub(super) fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl SiteExtractor for Gooshishop {
    fn site(&self) -> SiteId {
        SiteId::Gooshishop
    }

    async fn extract(&self, url: &str) -> Result<u64, ScrapeError> {
        let html = self.fetch.get_html(url).await?;
        price_from_html(&html)
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
    fn woocommerce_amount_is_extracted() {
        let html = r#"
            <div class="product-buy-box">
                <span class="woocommerce-Price-amount">۱۲۵,۵۰۰,۰۰۰ ریال</span>
            </div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 125_500_000);
    }

    #[test]
    fn sale_ins_price_beats_struck_price() {
        let html = r#"
            <div class="summary"><span class="price">
                <del>۱۳۵,۰۰۰,۰۰۰</del><ins>۱۲۵,۵۰۰,۰۰۰ ریال</ins>
            </span></div>
        "#;
        assert_eq!(price_from_html(html).unwrap(), 125_500_000);
    }

    #[test]
    fn text_scan_takes_first_price_in_document_order() {
        let html = "<main>قیمت ۱۲۵,۵۰۰,۰۰۰ ریال — پیشنهاد مرتبط ۹۸,۰۰۰,۰۰۰ ریال</main>";
        assert_eq!(price_from_html(html).unwrap(), 125_500_000);
    }

    #[test]
    fn warehouse_out_of_stock_is_unavailable() {
        let html = "<p>در انبار موجود نمی‌باشد</p>";
        assert!(matches!(
            price_from_html(html),
            Err(ScrapeError::Unavailable)
        ));
    }
}
