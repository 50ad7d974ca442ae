//! # Stages Module
//!
//! The three hashing stages of the signer and the item type they share.
//!
//! ## Stages
//! - `SingleHash` - `checksum(x) ~ checksum(digest(x))` per item
//! - `MultiHash` - six indexed checksums per item, concatenated in order
//! - `CombineResults` - sort everything and join with `_`

mod combine;
mod multi_hash;
mod single_hash;

pub use combine::{CombineResults, COMBINE_SEPARATOR};
pub use multi_hash::{MultiHash, MULTI_HASH_ROUNDS};
pub use single_hash::SingleHash;

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An item flowing through the signer pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    /// Seed value, hashed through its decimal form
    Number(i64),
    /// A string, either seed input or an intermediate hash
    Text(String),
}

impl Datum {
    /// Parse a command-line value.
    ///
    /// Only integers written in canonical decimal form become numbers, so
    /// `08` or `+8` stay text and are hashed exactly as typed.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Datum::Number(n),
            _ => Datum::Text(raw.to_string()),
        }
    }

    /// Take the text out of an intermediate result.
    ///
    /// Stages after `SingleHash` only ever receive hash strings; a number
    /// there means the pipeline was assembled wrong.
    pub(crate) fn into_text(self, stage: &str) -> Result<String, PipelineError> {
        match self {
            Datum::Text(text) => Ok(text),
            Datum::Number(n) => Err(PipelineError::InvalidItem {
                stage: stage.to_string(),
                item: n.to_string(),
            }),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{n}"),
            Datum::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for Datum {
    fn from(n: i64) -> Self {
        Datum::Number(n)
    }
}

impl From<String> for Datum {
    fn from(text: String) -> Self {
        Datum::Text(text)
    }
}

impl From<&str> for Datum {
    fn from(text: &str) -> Self {
        Datum::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_as_decimal() {
        assert_eq!(Datum::Number(42).to_string(), "42");
        assert_eq!(Datum::Number(-7).to_string(), "-7");
        assert_eq!(Datum::from("abc").to_string(), "abc");
    }

    #[test]
    fn parse_distinguishes_numbers_from_text() {
        assert_eq!(Datum::parse("8"), Datum::Number(8));
        assert_eq!(Datum::parse("-8"), Datum::Number(-8));
        assert_eq!(Datum::parse("08x"), Datum::Text("08x".to_string()));
    }

    #[test]
    fn parse_keeps_non_canonical_integers_as_typed() {
        assert_eq!(Datum::parse("08"), Datum::Text("08".to_string()));
        assert_eq!(Datum::parse("+8"), Datum::Text("+8".to_string()));
        assert_eq!(Datum::parse("-0"), Datum::Text("-0".to_string()));
        assert_eq!(Datum::parse("08").to_string(), "08");
    }

    #[test]
    fn numbers_are_not_text() {
        assert!(matches!(
            Datum::Number(1).into_text("MultiHash"),
            Err(PipelineError::InvalidItem { .. })
        ));
        assert_eq!(Datum::from("x").into_text("MultiHash").unwrap(), "x");
    }
}
