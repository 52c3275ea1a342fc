//! In-memory storage backend for testing.

use crate::backend::{validate_name, StorageBackend};
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory storage backend.
///
/// This backend keeps every blob in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Scratch databases that are never persisted
///
/// # Example
///
/// ```rust
/// use deckmap_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.write("Presets.csv", b"data").unwrap();
/// assert_eq!(backend.list().unwrap(), vec!["Presets.csv".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with blobs.
    ///
    /// Useful for testing how a database reacts to existing (or corrupt)
    /// files.
    #[must_use]
    pub fn with_blobs<I, K>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            blobs: RwLock::new(blobs.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Returns a copy of all blobs.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.blobs.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_name(name)?;
        Ok(self.blobs.read().get(name).cloned())
    }

    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_name(name)?;
        self.blobs.write().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_name(name)?;
        Ok(self.blobs.read().contains_key(name))
    }

    fn remove(&mut self, name: &str) -> StorageResult<bool> {
        validate_name(name)?;
        Ok(self.blobs.write().remove(name).is_some())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.blobs.read().keys().cloned().collect())
    }
}
