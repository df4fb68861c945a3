//! Detail-page extraction.
//!
//! The product information table on a detail page is read by position, not
//! by its row labels:
//!
//! | row   | content                       |
//! |-------|-------------------------------|
//! | 0     | UPC                           |
//! | 1     | product type                  |
//! | 5     | availability, `In stock (N available)` |
//! | last  | number of reviews             |
//!
//! This is a contract with the site's current layout. If the table changes,
//! the row constants below are the only thing to update.

use std::sync::LazyLock;

use bookdb_core::BookDetail;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::ScraperError;

pub const UPC_ROW: usize = 0;
pub const PRODUCT_TYPE_ROW: usize = 1;
pub const AVAILABILITY_ROW: usize = 5;

static TABLE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr td").expect("valid table cell selector"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article > p").expect("valid description selector"));
static AVAILABLE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)").expect("valid availability regex"));

/// Detail-page fields plus the review count, which is parsed but not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub detail: BookDetail,
    pub review_count: u32,
}

/// Positional view over the text of a product table's value cells.
///
/// Cells without any text are skipped, so indices count only populated cells.
struct DetailTable {
    cells: Vec<String>,
}

impl DetailTable {
    fn from_document(document: &Html) -> Self {
        let cells = document
            .select(&TABLE_CELL)
            .map(|td| td.text().collect::<String>())
            .filter(|text| !text.is_empty())
            .collect();
        Self { cells }
    }

    fn row(&self, index: usize, label: &str) -> Result<&str, ScraperError> {
        self.cells.get(index).map(|s| s.trim()).ok_or_else(|| {
            ScraperError::parse(
                label,
                format!(
                    "product table has {} rows, expected row {index}",
                    self.cells.len()
                ),
            )
        })
    }

    fn last(&self, label: &str) -> Result<&str, ScraperError> {
        self.cells
            .last()
            .map(|s| s.trim())
            .ok_or_else(|| ScraperError::parse(label, "product table is empty"))
    }
}

/// Extracts the detail fields from a detail page's markup.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when the product table lacks the UPC,
/// product type, or availability row, or the review count isn't an integer.
/// A missing description is not an error.
pub fn extract_detail(markup: &str) -> Result<DetailPage, ScraperError> {
    let document = Html::parse_document(markup);
    let table = DetailTable::from_document(&document);

    let upc = table.row(UPC_ROW, "upc")?.to_owned();
    let product_type = table.row(PRODUCT_TYPE_ROW, "product type")?.to_owned();
    let availability_count = parse_availability_count(table.row(AVAILABILITY_ROW, "availability")?);

    let reviews = table.last("review count")?;
    let review_count = reviews.parse::<u32>().map_err(|e| {
        ScraperError::parse("review count", format!("\"{reviews}\": {e}"))
    })?;

    let description = document
        .select(&DESCRIPTION)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_owned())
        .unwrap_or_default();

    Ok(DetailPage {
        detail: BookDetail {
            upc,
            description,
            product_type,
            availability_count,
        },
        review_count,
    })
}

/// Reads `N` from text like `"In stock (22 available)"`; `0` when absent.
pub(crate) fn parse_availability_count(text: &str) -> u32 {
    AVAILABLE_COUNT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}
