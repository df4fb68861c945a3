use super::*;

const PAGE_URL: &str = "https://books.toscrape.com/catalogue/category/books_1/page-1.html";

fn item(slug: &str, title: &str, price: &str, stock: &str) -> String {
    format!(
        r#"<li class="col-xs-6">
  <article class="product_pod">
    <div class="image_container">
      <a href="../../{slug}/index.html"><img src="../../../media/cache/{slug}.jpg" alt="{title}" class="thumbnail"></a>
    </div>
    <h3><a href="../../{slug}/index.html" title="{title}">{title}</a></h3>
    <div class="product_price">
      <p class="price_color">{price}</p>
      <p class="instock availability">
        <i class="icon-ok"></i>{stock}</p>
    </div>
  </article>
</li>"#
    )
}

fn page(items: &[String], next: Option<&str>) -> String {
    let pager = next.map_or_else(String::new, |href| {
        format!(r#"<ul class="pager"><li class="next"><a href="{href}">next</a></li></ul>"#)
    });
    format!(
        "<html><body><section><ol class=\"row\">{}</ol>{pager}</section></body></html>",
        items.join("\n")
    )
}

fn first_fragment(markup: &str) -> Html {
    Html::parse_document(markup)
}

// -----------------------------------------------------------------------
// parse_listing
// -----------------------------------------------------------------------

#[test]
fn parse_listing_extracts_items_in_page_order() {
    let markup = page(
        &[
            item("a-light-in-the-attic_1000", "A Light in the Attic", "£51.77", "\n\n    In stock\n"),
            item("tipping-the-velvet_999", "Tipping the Velvet", "£53.74", "\n\n    In stock\n"),
        ],
        Some("page-2.html"),
    );

    let listing = parse_listing(&markup, &SiteConfig::default(), PAGE_URL).unwrap();

    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.items[0].title, "A Light in the Attic");
    assert_eq!(listing.items[1].title, "Tipping the Velvet");
    assert_eq!(listing.next_link, "page-2.html");
}

#[test]
fn parse_listing_without_next_link_returns_empty_string() {
    let markup = page(&[item("b_1", "B", "£10.00", "In stock")], None);
    let listing = parse_listing(&markup, &SiteConfig::default(), PAGE_URL).unwrap();
    assert_eq!(listing.next_link, "");
}

#[test]
fn parse_listing_with_no_items_is_empty() {
    let markup = page(&[], None);
    let listing = parse_listing(&markup, &SiteConfig::default(), PAGE_URL).unwrap();
    assert!(listing.items.is_empty());
}

#[test]
fn parse_listing_reports_failing_item_position() {
    let broken = item("c_3", "C", "£free", "In stock");
    let markup = page(&[item("b_1", "B", "£10.00", "In stock"), broken], None);

    let err = parse_listing(&markup, &SiteConfig::default(), PAGE_URL).unwrap_err();

    match err {
        ScraperError::Parse { context, .. } => {
            assert!(context.contains("item 2"), "context: {context}");
            assert!(context.contains(PAGE_URL), "context: {context}");
        }
        other => panic!("expected Parse, got: {other:?}"),
    }
}

// -----------------------------------------------------------------------
// extract_summary
// -----------------------------------------------------------------------

#[test]
fn extract_summary_rewrites_relative_urls() {
    let doc = first_fragment(&page(
        &[item("a-light-in-the-attic_1000", "A Light in the Attic", "£51.77", "In stock")],
        None,
    ));
    let fragment = doc.select(&ITEM).next().unwrap();

    let summary = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap();

    assert_eq!(
        summary.image_url,
        "https://books.toscrape.com/media/cache/a-light-in-the-attic_1000.jpg"
    );
    assert_eq!(
        summary.detail_page_url,
        "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html"
    );
}

#[test]
fn extract_summary_reads_title_price_and_stock() {
    let doc = first_fragment(&page(
        &[item("x_1", "Sharp Objects", "£47.82", "\n\n    In stock (22 available)\n")],
        None,
    ));
    let fragment = doc.select(&ITEM).next().unwrap();

    let summary = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap();

    assert_eq!(summary.title, "Sharp Objects");
    assert_eq!(summary.price, Decimal::from_str("47.82").unwrap());
    assert_eq!(summary.stock_text, "In stock (22 available)");
}

#[test]
fn extract_summary_leaves_blank_stock_empty() {
    let doc = first_fragment(&page(&[item("x_1", "X", "£1.00", "\n   \n")], None));
    let fragment = doc.select(&ITEM).next().unwrap();
    let summary = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap();
    assert_eq!(summary.stock_text, "");
}

#[test]
fn extract_summary_without_image_fails() {
    let markup = page(
        &[r#"<li><h3><a href="../../x/index.html" title="X">X</a></h3><p class="price_color">£1.00</p></li>"#
            .to_owned()],
        None,
    );
    let doc = first_fragment(&markup);
    let fragment = doc.select(&ITEM).next().unwrap();

    let err = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap_err();
    assert!(
        matches!(err, ScraperError::Parse { ref context, .. } if context == "image"),
        "got: {err:?}"
    );
}

#[test]
fn extract_summary_without_title_fails() {
    let markup = page(
        &[r#"<li><img src="../../../media/x.jpg"><h3><a href="../../x/index.html">X</a></h3><p class="price_color">£1.00</p></li>"#
            .to_owned()],
        None,
    );
    let doc = first_fragment(&markup);
    let fragment = doc.select(&ITEM).next().unwrap();

    let err = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap_err();
    assert!(
        matches!(err, ScraperError::Parse { ref context, .. } if context == "title"),
        "got: {err:?}"
    );
}

#[test]
fn extract_summary_without_detail_link_fails() {
    let markup = page(
        &[r#"<li><img src="../../../media/x.jpg"><h3><a title="X">X</a></h3><p class="price_color">£1.00</p></li>"#
            .to_owned()],
        None,
    );
    let doc = first_fragment(&markup);
    let fragment = doc.select(&ITEM).next().unwrap();

    let err = extract_summary(fragment, &SiteConfig::default(), PAGE_URL).unwrap_err();
    assert!(
        matches!(err, ScraperError::Parse { ref context, .. } if context == "detail link"),
        "got: {err:?}"
    );
}

// -----------------------------------------------------------------------
// parse_price
// -----------------------------------------------------------------------

#[test]
fn price_strips_pound_sign() {
    assert_eq!(parse_price("£51.77").unwrap(), Decimal::from_str("51.77").unwrap());
}

#[test]
fn price_strips_mis_decoded_prefix() {
    assert_eq!(parse_price("Â£13.99").unwrap(), Decimal::from_str("13.99").unwrap());
}

#[test]
fn price_strips_multi_char_prefix_and_whitespace() {
    assert_eq!(parse_price("  US$ 7.5 ").unwrap(), Decimal::from_str("7.5").unwrap());
}

#[test]
fn price_keeps_leading_decimal_point() {
    assert_eq!(parse_price("£.50").unwrap(), Decimal::from_str("0.50").unwrap());
}

#[test]
fn negative_price_fails() {
    let err = parse_price("£-5.00").unwrap_err();
    assert!(matches!(err, ScraperError::Parse { .. }), "got: {err:?}");
    assert!(err.to_string().contains("negative"), "got: {err}");
}

#[test]
fn price_without_digits_fails() {
    let err = parse_price("£").unwrap_err();
    assert!(matches!(err, ScraperError::Parse { .. }), "got: {err:?}");
}

#[test]
fn price_with_trailing_garbage_fails() {
    assert!(parse_price("£12.00 each").is_err());
}
