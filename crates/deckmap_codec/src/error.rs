//! Error types for the codec crate.

use crate::value::FieldType;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised by the schema parser, tables, records and codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed or duplicate field specification.
    #[error("schema error: {message}")]
    Schema {
        /// Description of the problem.
        message: String,
    },

    /// A filter or accessor referenced a field the schema does not define.
    #[error("field not found: {field}")]
    FieldNotFound {
        /// The unknown field name.
        field: String,
    },

    /// A value was requested or compared as the wrong type.
    #[error("type mismatch on field {field}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// The field involved.
        field: String,
        /// The type the field holds.
        expected: FieldType,
        /// The type that was asked for.
        actual: FieldType,
    },

    /// A row does not match the table schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// A text token could not be decoded into its declared type.
    #[error("cannot decode row {row}, field {field}: {message}")]
    ValueDecode {
        /// 1-based data row number.
        row: usize,
        /// The field being decoded.
        field: String,
        /// Description of the problem, including the offending token.
        message: String,
    },

    /// A length or count does not fit the binary layout.
    #[error("{what} of {len} does not fit in the binary format")]
    TooLarge {
        /// What was being written.
        what: &'static str,
        /// The length that overflowed.
        len: usize,
    },

    /// A table file is truncated or internally inconsistent.
    #[error("corrupt table file: {message}")]
    Corrupt {
        /// Description of the corruption.
        message: String,
    },
}

impl CodecError {
    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates a field not found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Creates a value decode error.
    pub fn value_decode(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValueDecode {
            row,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a too large error.
    pub fn too_large(what: &'static str, len: usize) -> Self {
        Self::TooLarge { what, len }
    }

    /// Creates a corrupt file error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}
