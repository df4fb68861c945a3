//! Opaque 24-character hex identifiers for stored book records.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;

use crate::CoreError;

/// Identifier of a stored [`crate::BookRecord`].
///
/// Layout: 4 bytes of Unix seconds followed by 8 random bytes, rendered as
/// 24 lowercase hex characters. Only the shape is validated on parse; the
/// timestamp prefix carries no meaning for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub const LEN: usize = 24;

    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let tail: [u8; 8] = rand::random();

        let mut id = String::with_capacity(Self::LEN);
        let _ = write!(id, "{secs:08x}");
        for byte in tail {
            let _ = write!(id, "{byte:02x}");
        }
        Self(id)
    }

    /// Parses a caller-supplied identifier, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBookId`] unless `raw` is exactly 24 ASCII
    /// hex digits.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(CoreError::InvalidBookId(raw.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BookId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_24_lowercase_hex_chars() {
        let id = BookId::generate();
        assert_eq!(id.as_str().len(), BookId::LEN);
        assert!(id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(BookId::generate(), BookId::generate());
    }

    #[test]
    fn generated_id_round_trips_through_parse() {
        let id = BookId::generate();
        assert_eq!(BookId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn parse_normalizes_uppercase() {
        let id = BookId::parse("65A1B2C3D4E5F60718293A4B").unwrap();
        assert_eq!(id.as_str(), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            BookId::parse("abc123"),
            Err(CoreError::InvalidBookId(ref raw)) if raw == "abc123"
        ));
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(BookId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }
}
