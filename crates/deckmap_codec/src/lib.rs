//! # DeckMap Codec
//!
//! Schema, record and table model plus the table file codecs.
//!
//! This crate provides:
//! - [`Schema`] and its `name:type` grammar
//! - [`Table`] and [`Record`], the backend-agnostic row model
//! - [`TableCodec`], with a delimited [`TextCodec`] and a compact
//!   [`BinaryCodec`]
//!
//! Both codecs are deterministic (the same table always encodes to the same
//! bytes) and round-trip every value exactly.
//!
//! ## Usage
//!
//! ```
//! use deckmap_codec::{CodecKind, Schema, Table};
//!
//! let schema = Schema::parse("Name:string,EmailAddress:string").unwrap();
//! let mut table = Table::new("Contacts", schema);
//! table
//!     .add_record([("Name", "Alice"), ("EmailAddress", "a@x.com")])
//!     .unwrap();
//!
//! let codec = CodecKind::Binary.codec();
//! let bytes = codec.encode(&table).unwrap();
//! let decoded = codec.decode("Contacts", &bytes, None).unwrap();
//! assert_eq!(decoded, table);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod binary;
mod error;
mod record;
mod schema;
mod table;
mod text;
mod value;

pub use binary::BinaryCodec;
pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use schema::{Field, Schema};
pub use table::Table;
pub use text::TextCodec;
pub use value::{FieldType, FromValue, Value};

use std::fmt;
use std::str::FromStr;

/// A table file format.
///
/// A codec turns a whole table into bytes and back. Decoding builds the
/// complete table before returning it, so a failed decode never yields a
/// partially populated table.
pub trait TableCodec: Send + Sync {
    /// Returns which format this codec implements.
    fn kind(&self) -> CodecKind;

    /// Encodes the schema and all rows of `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be represented in this format
    /// (for example a string longer than the format's length prefix).
    fn encode(&self, table: &Table) -> CodecResult<Vec<u8>>;

    /// Decodes a table called `name` from `bytes`.
    ///
    /// The schema is read from the bytes themselves. When `expected` is
    /// given, the stored schema must equal it.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed, a value cannot be
    /// decoded, or the stored schema differs from `expected`.
    fn decode(&self, name: &str, bytes: &[u8], expected: Option<&Schema>) -> CodecResult<Table>;
}

/// The available table codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    /// Delimited UTF-8 text, see [`TextCodec`].
    Text,
    /// Compact binary, see [`BinaryCodec`].
    Binary,
}

impl CodecKind {
    /// Returns the file extension used for tables in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "csv",
            Self::Binary => "bin",
        }
    }

    /// Returns a codec instance for this format.
    #[must_use]
    pub fn codec(self) -> Box<dyn TableCodec> {
        match self {
            Self::Text => Box::new(TextCodec::new()),
            Self::Binary => Box::new(BinaryCodec::new()),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "csv" => Ok(Self::Text),
            "binary" | "bin" => Ok(Self::Binary),
            other => Err(format!("unknown codec {other:?} (expected text or binary)")),
        }
    }
}

/// Fails with [`CodecError::SchemaMismatch`] if a caller-supplied schema
/// differs from the one stored in the file.
pub(crate) fn check_expected_schema(actual: &Schema, expected: Option<&Schema>) -> CodecResult<()> {
    match expected {
        Some(expected) if expected != actual => Err(CodecError::schema_mismatch(format!(
            "file schema {actual} differs from expected {expected}"
        ))),
        _ => Ok(()),
    }
}
