//! Storage backend trait definition.

use crate::error::{StorageError, StorageResult};

/// A store of named byte blobs.
///
/// Backends are **opaque**: they never look inside the bytes. Each table of
/// a database lives in its own blob, so a failed write of one blob cannot
/// damage another.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`
/// - `write` replaces the whole blob atomically; on error the previous
///   contents are still readable
/// - `list` returns names in ascending order
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the blob called `name`.
    ///
    /// Returns `None` if no such blob exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the blob called `name` with `data`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs. The
    /// previous contents are left intact in that case.
    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Returns whether a blob called `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Removes the blob called `name`.
    ///
    /// Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn remove(&mut self, name: &str) -> StorageResult<bool>;

    /// Lists the names of all blobs, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list(&self) -> StorageResult<Vec<String>>;
}

/// Checks that `name` can be used as a blob name.
///
/// Names map directly to file names, so they must be a single path
/// component and must not start with `.` (reserved for temporary files).
///
/// # Errors
///
/// Returns [`StorageError::InvalidName`] describing the first problem found.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::invalid_name(name, "name is empty"));
    }
    if name.starts_with('.') {
        return Err(StorageError::invalid_name(name, "name starts with '.'"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(StorageError::invalid_name(
            name,
            "name contains a path separator or NUL",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_valid() {
        assert!(validate_name("Contacts.csv").is_ok());
        assert!(validate_name("scan 2024-01-01.bin").is_ok());
    }

    #[test]
    fn path_like_names_are_rejected() {
        for name in ["", ".hidden", "../up.csv", "a/b.csv", "a\\b.csv"] {
            assert!(
                matches!(validate_name(name), Err(StorageError::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }
}
