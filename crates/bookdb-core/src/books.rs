//! Canonical book record shapes shared by the crawler, the store, and the API.
//!
//! A [`BookRecord`] always owns exactly one [`BookDetail`]; the two are built
//! together from one listing fragment and one detail page and never shared
//! between records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BookId, CoreError};

/// Stock text stored when a listing item carries no availability text.
pub const OUT_OF_STOCK: &str = "Out of stock";

/// Attributes scraped from a book's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    /// Universal product code from the first row of the product table.
    pub upc: String,
    /// First paragraph of the product description; empty when the page has none.
    #[serde(default)]
    pub description: String,
    /// Product type from the second row of the product table (e.g. `"Books"`).
    pub product_type: String,
    /// Units in stock, parsed from `"In stock (22 available)"`. `0` when absent.
    #[serde(default)]
    pub availability_count: u32,
}

/// One normalized book, as persisted and as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub image_url: String,
    pub title: String,
    /// Price with the currency glyph already stripped, e.g. `51.77`.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Availability text from the listing page, or [`OUT_OF_STOCK`].
    pub stock_text: String,
    /// Absolute URL of the book's detail page.
    pub detail_page_url: String,
    pub detail: BookDetail,
}

impl BookRecord {
    /// Checks the record invariants: required strings are non-blank and the
    /// price fits the stored column. `description` may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("image_url", &self.image_url)?;
        require_text("title", &self.title)?;
        require_price(self.price)?;
        require_text("stock_text", &self.stock_text)?;
        require_text("detail_page_url", &self.detail_page_url)?;
        require_text("detail.upc", &self.detail.upc)?;
        require_text("detail.product_type", &self.detail.product_type)?;
        Ok(())
    }
}

/// Trims raw availability text, substituting [`OUT_OF_STOCK`] when nothing
/// is left.
#[must_use]
pub fn stock_text_or_default(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        OUT_OF_STOCK.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Fails with [`CoreError::InvalidRecord`] when `value` is empty after trimming.
///
/// # Errors
///
/// See above.
pub fn require_text(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidRecord {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

/// Largest scale the `books.price` column stores without rounding.
pub const PRICE_SCALE: u32 = 2;

/// Exclusive upper bound on prices, set by the `NUMERIC(10, 2)` column.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Fails with [`CoreError::InvalidRecord`] when `price` is negative, has more
/// than [`PRICE_SCALE`] decimal places, or is not below [`PRICE_LIMIT`].
///
/// # Errors
///
/// See above.
pub fn require_price(price: Decimal) -> Result<(), CoreError> {
    let reason = if price.is_sign_negative() && !price.is_zero() {
        format!("must not be negative, got {price}")
    } else if price.normalize().scale() > PRICE_SCALE {
        format!("must have at most {PRICE_SCALE} decimal places, got {price}")
    } else if price >= PRICE_LIMIT {
        format!("must be below {PRICE_LIMIT}, got {price}")
    } else {
        return Ok(());
    };
    Err(CoreError::InvalidRecord {
        field: "price",
        reason,
    })
}

/// A persisted [`BookRecord`] together with its identifier.
///
/// Serializes flat: the `id` sits next to the record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBook {
    pub id: BookId,
    #[serde(flatten)]
    pub record: BookRecord,
}

/// Partial update of a stored record's detail fields. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookDetailPatch {
    pub upc: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub availability_count: Option<u32>,
}

/// Partial update of a stored record. `None` leaves the stored value
/// untouched; fields that are present must satisfy the same rules as a full
/// [`BookRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookPatch {
    pub image_url: Option<String>,
    pub title: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock_text: Option<String>,
    pub detail_page_url: Option<String>,
    #[serde(default)]
    pub detail: BookDetailPatch,
}

impl BookPatch {
    /// `true` when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validates the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let texts = [
            ("image_url", &self.image_url),
            ("title", &self.title),
            ("stock_text", &self.stock_text),
            ("detail_page_url", &self.detail_page_url),
            ("detail.upc", &self.detail.upc),
            ("detail.product_type", &self.detail.product_type),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        if let Some(price) = self.price {
            require_price(price)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "books_test.rs"]
mod tests;
