//! Merges a listing summary with its detail page into a [`BookRecord`].

use bookdb_core::books::stock_text_or_default;
use bookdb_core::{BookDetail, BookRecord, CoreError};

use crate::detail::DetailPage;
use crate::error::ScraperError;
use crate::listing::BookSummary;

/// Builds the canonical record for one listing item.
///
/// String fields are trimmed, blank stock text becomes
/// [`bookdb_core::OUT_OF_STOCK`], and the result is validated before it is
/// returned. Calling this again on the same inputs yields an equal record.
///
/// # Errors
///
/// Returns [`ScraperError::Validation`] naming the first field that is still
/// blank after trimming.
pub fn normalize(summary: &BookSummary, page: &DetailPage) -> Result<BookRecord, ScraperError> {
    let record = BookRecord {
        image_url: summary.image_url.trim().to_owned(),
        title: summary.title.trim().to_owned(),
        price: summary.price,
        stock_text: stock_text_or_default(&summary.stock_text),
        detail_page_url: summary.detail_page_url.trim().to_owned(),
        detail: BookDetail {
            upc: page.detail.upc.trim().to_owned(),
            description: page.detail.description.trim().to_owned(),
            product_type: page.detail.product_type.trim().to_owned(),
            availability_count: page.detail.availability_count,
        },
    };

    record.validate().map_err(|e| match e {
        CoreError::InvalidRecord { field, reason } => ScraperError::Validation { field, reason },
        other => ScraperError::Validation {
            field: "record",
            reason: other.to_string(),
        },
    })?;

    Ok(record)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
