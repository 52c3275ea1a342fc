//! Error types for DeckMap core.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in DeckMap core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] deckmap_storage::StorageError),

    /// Schema, record or table codec error.
    #[error("codec error: {0}")]
    Codec(#[from] deckmap_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table with this name already exists.
    #[error("table already exists: {name}")]
    DuplicateTable {
        /// Name of the table.
        name: String,
    },

    /// One or more tables could not be saved.
    ///
    /// Tables not listed here were written successfully.
    #[error("failed to save {} table(s): {}", .failures.len(), SaveFailures(.failures))]
    SaveFailed {
        /// Every table that failed, with its cause.
        failures: Vec<TableSaveFailure>,
    },

    /// An index manifest is missing or corrupt.
    ///
    /// This is recoverable: the index is a rebuildable cache, and
    /// `FileIndex::load_index` turns it into `None`.
    #[error("cannot load index manifest {}: {message}", .path.display())]
    ManifestLoad {
        /// Path of the manifest file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A path cannot be used the way it was asked to.
    #[error("invalid path {}: {message}", .path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },
}

/// A single table that `Database::save_changes` could not persist.
#[derive(Debug)]
pub struct TableSaveFailure {
    /// Name of the table.
    pub table: String,
    /// Why it failed.
    pub error: Box<CoreError>,
}

struct SaveFailures<'a>(&'a [TableSaveFailure]);

impl fmt::Display for SaveFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", failure.table, failure.error)?;
        }
        Ok(())
    }
}

impl CoreError {
    /// Creates a duplicate table error.
    pub fn duplicate_table(name: impl Into<String>) -> Self {
        Self::DuplicateTable { name: name.into() }
    }

    /// Creates a manifest load error.
    pub fn manifest_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ManifestLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the names of the tables that failed to save, if this is a
    /// [`CoreError::SaveFailed`].
    #[must_use]
    pub fn failed_tables(&self) -> Vec<&str> {
        match self {
            Self::SaveFailed { failures } => failures.iter().map(|f| f.table.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}
