//! File-based storage backend for persistent storage.

use crate::backend::{validate_name, StorageBackend};
use crate::error::StorageResult;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A directory-based storage backend.
///
/// Every blob is one file directly inside the directory. Blobs are replaced
/// with [`write_atomic`], so a crash during a write leaves either the old or
/// the new file, never a torn one.
///
/// # Example
///
/// ```no_run
/// use deckmap_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("EmailDatabase")).unwrap();
/// backend.write("Contacts.csv", b"Name:string,EmailAddress:string\n").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens a backend rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the directory holding the blobs.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path a blob name maps to.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid.
    pub fn blob_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.blob_path(name)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.blob_path(name)?;
        write_atomic(&path, data)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.blob_path(name)?.is_file())
    }

    fn remove(&mut self, name: &str) -> StorageResult<bool> {
        let path = self.blob_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                sync_directory(&self.dir)?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Non-UTF-8 names cannot have been written through this backend.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Replaces the file at `path` with `data` atomically.
///
/// Uses the write-then-rename pattern:
/// 1. Write to a temporary sibling file (`.<name>.tmp`)
/// 2. Sync the temporary file to disk
/// 3. Rename it over `path`
/// 4. Fsync the parent directory so the rename is durable
///
/// If any step fails the temporary file is removed and the previous
/// contents of `path` are untouched.
///
/// # Errors
///
/// Returns an error if any of the steps above fails.
pub fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    let result = (|| -> StorageResult<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    sync_directory(&parent)
}

/// Syncs a directory so that renames and deletions inside it are durable.
///
/// Windows NTFS journals metadata updates and does not support opening a
/// directory for fsync, so this is a no-op there.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> StorageResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> StorageResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use tempfile::tempdir;

    #[test]
    fn open_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("db");

        let backend = FileBackend::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(backend.path(), path);
        assert!(backend.list().unwrap().is_empty());
    }

    #[test]
    fn write_and_read() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();

        backend.write("a.bin", b"hello").unwrap();
        assert_eq!(backend.read("a.bin").unwrap().unwrap(), b"hello");
        assert!(backend.exists("a.bin").unwrap());
        assert!(dir.path().join("a.bin").is_file());
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(backend.read("missing.csv").unwrap().is_none());
        assert!(!backend.exists("missing.csv").unwrap());
    }

    #[test]
    fn write_replaces_contents() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();

        backend.write("t.csv", b"a much longer first version").unwrap();
        backend.write("t.csv", b"short").unwrap();
        assert_eq!(backend.read("t.csv").unwrap().unwrap(), b"short");
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        backend.write("t.csv", b"data").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["t.csv".to_string()]);
    }

    #[test]
    fn list_is_sorted_and_skips_hidden() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        backend.write("b.csv", b"b").unwrap();
        backend.write("a.csv", b"a").unwrap();
        fs::write(dir.path().join(".a.csv.tmp"), b"junk").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(backend.list().unwrap(), vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn remove_blob() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        backend.write("a.csv", b"a").unwrap();

        assert!(backend.remove("a.csv").unwrap());
        assert!(!backend.remove("a.csv").unwrap());
        assert!(backend.read("a.csv").unwrap().is_none());
    }

    #[test]
    fn invalid_names_rejected() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        let result = backend.write("../escape.csv", b"x");
        assert!(matches!(result, Err(StorageError::InvalidName { .. })));
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("index.json");
        write_atomic(&target, b"old").unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir(dir.path().join(".index.json.tmp")).unwrap();
        assert!(write_atomic(&target, b"new").is_err());
        assert_eq!(fs::read(&target).unwrap(), b"old");
    }
}
