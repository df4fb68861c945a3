//! Listing-page extraction: splitting a page into item fragments, pulling the
//! summary fields out of each fragment, and reading the "next" link.
//!
//! Expected item markup (one `<li>` per book inside an `<ol>`):
//!
//! ```html
//! <li>
//!   <article class="product_pod">
//!     <div class="image_container">
//!       <a href="../../a-light-in-the-attic_1000/index.html">
//!         <img src="../../../media/cache/2c/da/2cdad67c.jpg" alt="A Light in the Attic">
//!       </a>
//!     </div>
//!     <h3><a href="../../a-light-in-the-attic_1000/index.html" title="A Light in the Attic">A Light in the ...</a></h3>
//!     <div class="product_price">
//!       <p class="price_color">£51.77</p>
//!       <p class="instock availability">
//!         <i class="icon-ok"></i>
//!         In stock
//!       </p>
//!     </div>
//!   </article>
//! </li>
//! ```

use std::str::FromStr;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::site::SiteConfig;

static ITEM: LazyLock<Selector> = LazyLock::new(|| sel("ol > li"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| sel("img"));
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| sel("h3 > a"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| sel("p.price_color"));
static AVAILABILITY: LazyLock<Selector> = LazyLock::new(|| sel("p.instock.availability"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| sel("a"));

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid listing selector")
}

/// Summary fields of one listing item, before the detail page is merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub image_url: String,
    pub title: String,
    pub price: Decimal,
    /// Trimmed availability text; empty when the item carries none.
    pub stock_text: String,
    pub detail_page_url: String,
}

/// Everything the driver needs from one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Items in page order.
    pub items: Vec<BookSummary>,
    /// Raw `href` of the "next" anchor, or empty when this is the last page.
    pub next_link: String,
}

/// Parses a listing page into its item summaries and its "next" link.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] for the first item missing a required
/// field; items after it are not examined.
pub fn parse_listing(
    markup: &str,
    site: &SiteConfig,
    page_url: &str,
) -> Result<ListingPage, ScraperError> {
    let document = Html::parse_document(markup);

    let items = document
        .select(&ITEM)
        .enumerate()
        .map(|(idx, fragment)| {
            extract_summary(fragment, site, page_url)
                .map_err(|e| e.at(&format!("item {} on {page_url}", idx + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListingPage {
        items,
        next_link: extract_next_link(&document),
    })
}

/// Extracts the summary fields of one listing item.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when the image, title, price, or detail
/// link is missing, or the price is not numeric.
pub fn extract_summary(
    fragment: ElementRef<'_>,
    site: &SiteConfig,
    page_url: &str,
) -> Result<BookSummary, ScraperError> {
    let src = fragment
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| ScraperError::parse("image", "no image source"))?;
    let image_url = site.image_url(src, page_url)?;

    let link = fragment.select(&TITLE_LINK).next();

    let title = link
        .and_then(|a| a.value().attr("title"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ScraperError::parse("title", "no title attribute"))?
        .to_owned();

    let price_text = fragment
        .select(&PRICE)
        .next()
        .map(|p| p.text().collect::<String>())
        .ok_or_else(|| ScraperError::parse("price", "no price element"))?;
    let price = parse_price(&price_text)?;

    let stock_text = fragment
        .select(&AVAILABILITY)
        .next()
        .and_then(|p| {
            p.children()
                .filter_map(|node| node.value().as_text())
                .nth(1)
                .map(|text| text.trim().to_owned())
        })
        .unwrap_or_default();

    let href = link
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| ScraperError::parse("detail link", "no href"))?;
    let detail_page_url = site.detail_url(href, page_url)?;

    Ok(BookSummary {
        image_url,
        title,
        price,
        stock_text,
        detail_page_url,
    })
}

/// Returns the `href` of the anchor whose text is `next`, or an empty string.
#[must_use]
pub fn extract_next_link(document: &Html) -> String {
    document
        .select(&ANCHOR)
        .find(|a| a.text().collect::<String>().trim() == "next")
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_owned())
        .unwrap_or_default()
}

/// Parses a currency-prefixed price such as `"£51.77"`.
///
/// The leading currency run (anything before the first digit, `.` or `-`)
/// is dropped, so multi-byte glyphs and mis-decoded prefixes like `"Â£"` are
/// handled alike. Negative amounts are rejected.
pub(crate) fn parse_price(raw: &str) -> Result<Decimal, ScraperError> {
    let raw = raw.trim();
    let amount = raw.trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'));
    let price = Decimal::from_str(amount)
        .map_err(|e| ScraperError::parse("price", format!("\"{raw}\": {e}")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ScraperError::parse(
            "price",
            format!("\"{raw}\": must not be negative"),
        ));
    }
    Ok(price)
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
