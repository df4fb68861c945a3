//! End-to-end crawls against a local `wiremock` catalog.
//!
//! Each test stands up a `MockServer` laid out like the real site
//! (`/catalogue/category/books_1/page-N.html`, `/catalogue/<slug>/index.html`)
//! and drives `CrawlDriver` through the real `HttpFetcher`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookdb_scraper::{
    CancelToken, CrawlDriver, CrawlOptions, CrawlState, HttpFetcher, PageFetcher, ScraperError,
    SiteConfig, TracingDiagnostics,
};

fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(
        Duration::from_secs(5),
        "bookdb-test/0.1",
        Arc::new(TracingDiagnostics),
    )
    .expect("failed to build test HttpFetcher")
}

fn listing_page(items: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let items: String = items
        .iter()
        .map(|(slug, title, price)| {
            format!(
                r#"<li class="col-xs-6"><article class="product_pod">
  <div class="image_container"><a href="../../{slug}/index.html"><img src="../../../media/cache/{slug}.jpg" alt="{title}"></a></div>
  <h3><a href="../../{slug}/index.html" title="{title}">{title}</a></h3>
  <div class="product_price">
    <p class="price_color">{price}</p>
    <p class="instock availability">
        <i class="icon-ok"></i>
        In stock
    </p>
  </div>
</article></li>"#
            )
        })
        .collect();
    let pager = next.map_or_else(String::new, |href| {
        format!(r#"<ul class="pager"><li class="current">Page</li><li class="next"><a href="{href}">next</a></li></ul>"#)
    });
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body><section>\
         <ol class=\"row\">{items}</ol><div>{pager}</div></section></body></html>"
    )
}

fn detail_page(upc: &str, availability: &str, reviews: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><article class="product_page">
<div class="row"><h1>Book</h1></div>
<div id="product_description" class="sub-header"><h2>Product Description</h2></div>
<p>It's hard to imagine a world without this book.</p>
<table class="table table-striped">
<tr><th>UPC</th><td>{upc}</td></tr>
<tr><th>Product Type</th><td>Books</td></tr>
<tr><th>Price (excl. tax)</th><td>£51.77</td></tr>
<tr><th>Price (incl. tax)</th><td>£51.77</td></tr>
<tr><th>Tax</th><td>£0.00</td></tr>
<tr><th>Availability</th><td>{availability}</td></tr>
<tr><th>Number of reviews</th><td>{reviews}</td></tr>
</table></article></body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn listing_route(page: u32) -> String {
    format!("/catalogue/category/books_1/page-{page}.html")
}

// ---------------------------------------------------------------------------
// Single page, single item
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_item_page_yields_one_complete_record() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        &listing_route(1),
        listing_page(&[("a-light-in-the-attic_1000", "A Light in the Attic", "£51.77")], None),
    )
    .await;
    mount_html(
        &server,
        "/catalogue/a-light-in-the-attic_1000/index.html",
        detail_page("a897fe39b1053632", "In stock (22 available)", "22"),
    )
    .await;

    let site = SiteConfig::new(&server.uri());
    let mut driver = CrawlDriver::new(
        test_fetcher(),
        site,
        CrawlOptions::default(),
        Arc::new(TracingDiagnostics),
    );
    let start = format!("{}{}", server.uri(), listing_route(1));

    let batch = driver.run(&start, &CancelToken::new()).await.unwrap();

    assert_eq!(driver.state(), CrawlState::Done);
    assert_eq!(batch.records.len(), 1);
    let record = &batch.records[0];
    assert_eq!(record.title, "A Light in the Attic");
    assert_eq!(record.price, Decimal::from_str("51.77").unwrap());
    assert_eq!(record.stock_text, "In stock");
    assert_eq!(
        record.image_url,
        format!("{}/media/cache/a-light-in-the-attic_1000.jpg", server.uri())
    );
    assert_eq!(
        record.detail_page_url,
        format!("{}/catalogue/a-light-in-the-attic_1000/index.html", server.uri())
    );
    assert_eq!(record.detail.upc, "a897fe39b1053632");
    assert_eq!(record.detail.product_type, "Books");
    assert_eq!(record.detail.availability_count, 22);
    assert_eq!(
        record.detail.description,
        "It's hard to imagine a world without this book."
    );
}

// ---------------------------------------------------------------------------
// Multi-page crawl bounded by the stop marker
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_page_crawl_stops_after_marked_page() {
    let server = MockServer::start().await;
    mount_html(&server, &listing_route(1), listing_page(&[("one_1", "One", "£1.00")], Some("page-2.html"))).await;
    mount_html(&server, &listing_route(2), listing_page(&[("two_2", "Two", "£2.00")], Some("page-3.html"))).await;
    mount_html(&server, &listing_route(3), listing_page(&[("three_3", "Three", "£3.00")], Some("page-4.html"))).await;
    for (slug, upc) in [("one_1", "u1"), ("two_2", "u2"), ("three_3", "u3")] {
        mount_html(
            &server,
            &format!("/catalogue/{slug}/index.html"),
            detail_page(upc, "In stock (1 available)", "0"),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path(listing_route(4)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut driver = CrawlDriver::new(
        test_fetcher(),
        SiteConfig::new(&server.uri()),
        CrawlOptions {
            stop_at_next_link: Some("page-3.html".to_owned()),
            max_pages: None,
        },
        Arc::new(TracingDiagnostics),
    );
    let start = format!("{}{}", server.uri(), listing_route(1));

    let batch = driver.run(&start, &CancelToken::new()).await.unwrap();

    assert_eq!(driver.state(), CrawlState::Done);
    assert_eq!(batch.pages, 3);
    let titles: Vec<&str> = batch.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
}

// ---------------------------------------------------------------------------
// Fetch failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_returns_unexpected_status_on_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}/broken.html", server.uri());
    let err = test_fetcher().fetch(&url).await.unwrap_err();

    assert!(err.is_fetch_error());
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 500, url: ref u } if *u == url),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn missing_detail_page_fails_the_crawl() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        &listing_route(1),
        listing_page(&[("gone_9", "Gone", "£9.00")], None),
    )
    .await;

    let mut driver = CrawlDriver::new(
        test_fetcher(),
        SiteConfig::new(&server.uri()),
        CrawlOptions::default(),
        Arc::new(TracingDiagnostics),
    );
    let start = format!("{}{}", server.uri(), listing_route(1));

    let err = driver.run(&start, &CancelToken::new()).await.unwrap_err();

    assert_eq!(driver.state(), CrawlState::Failed);
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 404, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_times_out_as_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(
        Duration::from_millis(200),
        "bookdb-test/0.1",
        Arc::new(TracingDiagnostics),
    )
    .unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow.html", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::Fetch { .. }), "got: {err:?}");
}
