//! Integration tests for static-site extraction through the dispatcher.
//!
//! Uses `wiremock` to stand up a local HTTP server per test, so no real
//! network traffic is made. The local server's hostname never matches the
//! site table, which also exercises hint-based resolution and the generic
//! fallback.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch_core::AppConfig;
use pricewatch_scraper::{Dispatcher, SiteId};

fn test_config() -> AppConfig {
    AppConfig {
        catalog_path: "./catalog.json".into(),
        log_level: "info".to_string(),
        request_timeout_secs: 5,
        user_agent: "pricewatch-test/0.1".to_string(),
        product_concurrency: 2,
        url_concurrency: 5,
        min_refresh_interval_mins: 10,
        browser_pool_size: 1,
        navigation_timeout_secs: 5,
        render_settle_ms: 0,
        price_floor: 1000,
    }
}

async fn serve_html(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn crawl_extracts_jsonld_price_end_to_end() {
    let body = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "offers": {"price": "24500000"}}
        </script>
        </head><body></body></html>
    "#;
    let server = serve_html(body).await;

    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), Some("digikala"))
        .unwrap();

    let result = extractor
        .crawl(&format!("{}/product/test", server.uri()))
        .await;
    assert!(result.success, "expected success, got: {result:?}");
    assert_eq!(result.price, Some(24_500_000));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn crawl_maps_http_404_to_a_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/test"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), Some("digikala"))
        .unwrap();

    let result = extractor
        .crawl(&format!("{}/product/test", server.uri()))
        .await;
    assert!(!result.success);
    assert!(result.price.is_none());
    assert_eq!(result.error.as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn crawl_distinguishes_unavailable_from_not_found() {
    let body = "<html><body><div>این کالا فعلا ناموجود است</div></body></html>";
    let server = serve_html(body).await;

    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), Some("mobit"))
        .unwrap();

    let result = extractor
        .crawl(&format!("{}/product/test", server.uri()))
        .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Product not available"));
}

#[tokio::test]
async fn crawl_reports_price_not_found_on_priceless_page() {
    let body = "<html><body><p>صفحه اصلی فروشگاه</p></body></html>";
    let server = serve_html(body).await;

    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), Some("khanoumi"))
        .unwrap();

    let result = extractor
        .crawl(&format!("{}/product/test", server.uri()))
        .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Price not found"));
}

#[tokio::test]
async fn unmatched_hostname_resolves_to_generic() {
    let server = MockServer::start().await;
    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), None)
        .unwrap();
    assert_eq!(extractor.site(), SiteId::Generic);
}

#[tokio::test]
async fn generic_floor_rejects_shipping_fee_noise() {
    // The only currency-suffixed number is below the generic floor, so the
    // crawl must not promote it to a price.
    let body = "<html><body><p>ارسال از ۲۵,۰۰۰ تومان</p></body></html>";
    let server = serve_html(body).await;

    let dispatcher = Dispatcher::new(&test_config()).unwrap();
    let extractor = dispatcher
        .resolve(&format!("{}/product/test", server.uri()), None)
        .unwrap();

    let result = extractor
        .crawl(&format!("{}/product/test", server.uri()))
        .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Price not found"));
}
