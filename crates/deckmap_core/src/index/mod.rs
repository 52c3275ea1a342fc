//! Persistent indices of the files in a folder.
//!
//! A [`FileIndex`] remembers which files live under a root directory,
//! together with their size, modification time and SHA-256 digest. It is
//! a rebuildable cache: a missing or corrupt manifest simply means the
//! index starts empty.
//!
//! - [`DataIndex`] tracks raw location data files
//! - [`ImageIndex`] tracks deck floorplan images

mod entry;
mod kind;
mod manifest;

pub use entry::IndexEntry;
pub use kind::{DataFiles, ImageFiles, IndexKind, IMAGE_EXTENSIONS};
pub use manifest::{MANIFEST_FILE, MANIFEST_VERSION};

use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::{self, ErrorKind};
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Index of raw location data files.
pub type DataIndex = FileIndex<DataFiles>;

/// Index of deck floorplan images.
pub type ImageIndex = FileIndex<ImageFiles>;

/// What [`FileIndex::verify`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Entries dropped because their file no longer exists.
    pub removed: Vec<String>,
    /// Entries whose contents changed and were re-fingerprinted.
    pub refreshed: Vec<String>,
    /// Entries kept unchanged because their file could not be checked.
    pub skipped: Vec<String>,
}

impl VerifyReport {
    /// Returns true if verification changed nothing but metadata and
    /// checked every entry.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && self.refreshed.is_empty() && self.skipped.is_empty()
    }
}

/// An index of the files under one root directory.
///
/// # Invariants
///
/// - Entry paths are unique, relative to the root and `/`-separated
/// - Scanning only adds entries; only verification removes them
/// - `index.json` in the root is only ever replaced atomically
#[derive(Debug, Clone, PartialEq)]
pub struct FileIndex<K: IndexKind> {
    root: PathBuf,
    entries: Vec<IndexEntry>,
    _kind: PhantomData<K>,
}

impl<K: IndexKind> FileIndex<K> {
    /// Creates an empty index rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Loads the index saved in `root`.
    ///
    /// Returns `None` if the manifest is missing, empty, unreadable or
    /// invalid; the caller is expected to start over with
    /// [`FileIndex::new`]. The manifest file is left as it is.
    pub fn load_index(root: impl Into<PathBuf>) -> Option<Self> {
        match Self::try_load_index(root) {
            Ok(index) => Some(index),
            Err(e) => {
                warn!(kind = K::LABEL, error = %e, "index manifest not loaded");
                None
            }
        }
    }

    /// Loads the index saved in `root`, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ManifestLoad`] if the manifest is missing or
    /// cannot be parsed.
    pub fn try_load_index(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        let entries = manifest::read(&root.join(MANIFEST_FILE))?;
        debug!(kind = K::LABEL, entries = entries.len(), "loaded index");
        Ok(Self {
            root,
            entries,
            _kind: PhantomData,
        })
    }

    /// Writes the index to `index.json` in the root.
    ///
    /// The root is created if needed. The manifest is replaced atomically,
    /// so on failure the previous one is still intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or the manifest
    /// cannot be written.
    pub fn save_index(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.root)?;
        manifest::write(&self.manifest_path(), &self.entries)?;
        debug!(kind = K::LABEL, entries = self.entries.len(), "saved index");
        Ok(())
    }

    /// Adds an entry for every tracked file under the root that is not
    /// indexed yet.
    ///
    /// Existing entries are never touched or removed. Returns the paths
    /// that were added, sorted.
    ///
    /// A new file that cannot be read is logged and left out, so the next
    /// scan tries it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not valid UTF-8 or cannot be walked.
    /// The index is unchanged in that case.
    pub fn scan_for_files(&mut self) -> CoreResult<Vec<String>> {
        let root = self
            .root
            .to_str()
            .ok_or_else(|| CoreError::invalid_path(&self.root, "root is not valid UTF-8"))?;
        let pattern = format!("{}/**/*", glob::Pattern::escape(root));

        let known: HashSet<&str> = self.entries.iter().map(|e| e.path.as_str()).collect();
        let mut candidates = BTreeSet::new();

        let paths = glob::glob(&pattern)
            .map_err(|e| CoreError::invalid_path(&self.root, format!("glob error: {e}")))?;
        for path in paths {
            let path = match path {
                Ok(path) => path,
                Err(e) => {
                    warn!(kind = K::LABEL, error = %e, "skipping unreadable path");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Some(relative) = self.relative(&path) else {
                warn!(
                    kind = K::LABEL,
                    path = %path.display(),
                    "skipping path that cannot be indexed"
                );
                continue;
            };
            if K::tracks(&relative) && !known.contains(relative.as_str()) {
                candidates.insert(relative);
            }
        }

        let mut added = Vec::with_capacity(candidates.len());
        for relative in candidates {
            let absolute = self.root.join(&relative);
            match IndexEntry::fingerprint(relative, &absolute) {
                Ok(mut entry) => {
                    K::annotate(&mut entry);
                    added.push(entry);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %absolute.display(), "file vanished during scan");
                }
                Err(e) => {
                    warn!(
                        kind = K::LABEL,
                        path = %absolute.display(),
                        error = %e,
                        "skipping unreadable file"
                    );
                }
            }
        }

        let paths: Vec<String> = added.iter().map(|e| e.path.clone()).collect();
        debug!(kind = K::LABEL, added = paths.len(), "scanned for files");
        self.entries.extend(added);
        Ok(paths)
    }

    /// Checks every entry against the file system.
    ///
    /// Entries whose file is gone are dropped, including files whose parent
    /// folder was replaced by something else. When size or modification
    /// time changed the digest is recomputed: an equal digest only updates
    /// the metadata, a different one re-fingerprints the entry. An entry
    /// whose file exists but cannot be checked is kept as it was and listed
    /// in [`VerifyReport::skipped`].
    ///
    /// # Errors
    ///
    /// Per-file failures never fail the call; the result is reserved for
    /// index-wide errors.
    pub fn verify(&mut self) -> CoreResult<VerifyReport> {
        let mut report = VerifyReport::default();
        let mut entries = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let absolute = self.absolute_path(entry);
            let metadata = match fs::metadata(&absolute) {
                Ok(m) if m.is_file() => m,
                Ok(_) => {
                    report.removed.push(entry.path.clone());
                    continue;
                }
                Err(e) if self.is_gone(entry, &e) => {
                    report.removed.push(entry.path.clone());
                    continue;
                }
                Err(e) => {
                    warn!(
                        kind = K::LABEL,
                        path = %entry.path,
                        error = %e,
                        "cannot check indexed file"
                    );
                    report.skipped.push(entry.path.clone());
                    entries.push(entry.clone());
                    continue;
                }
            };

            if !entry.is_stale(&metadata) && !entry.sha256.is_empty() {
                entries.push(entry.clone());
                continue;
            }

            let mut fresh = match IndexEntry::fingerprint(entry.path.clone(), &absolute) {
                Ok(fresh) => fresh,
                Err(e) if self.is_gone(entry, &e) => {
                    report.removed.push(entry.path.clone());
                    continue;
                }
                Err(e) => {
                    warn!(
                        kind = K::LABEL,
                        path = %entry.path,
                        error = %e,
                        "cannot read indexed file"
                    );
                    report.skipped.push(entry.path.clone());
                    entries.push(entry.clone());
                    continue;
                }
            };
            if fresh.sha256 == entry.sha256 {
                fresh.table_name.clone_from(&entry.table_name);
                fresh.deck = entry.deck;
            } else {
                K::annotate(&mut fresh);
                report.refreshed.push(entry.path.clone());
            }
            entries.push(fresh);
        }

        debug!(
            kind = K::LABEL,
            removed = report.removed.len(),
            refreshed = report.refreshed.len(),
            skipped = report.skipped.len(),
            "verified index"
        );
        self.entries = entries;
        Ok(report)
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Returns all entries in index order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Returns the entry for `path`, relative to the root.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves an entry to a path on disk.
    #[must_use]
    pub fn absolute_path(&self, entry: &IndexEntry) -> PathBuf {
        self.root.join(&entry.path)
    }

    /// Returns true if `error` means the entry's file no longer exists.
    ///
    /// A parent folder replaced by a regular file fails with `ENOTDIR`
    /// rather than `NotFound`, so the ancestors under the root are checked.
    fn is_gone(&self, entry: &IndexEntry, error: &io::Error) -> bool {
        if error.kind() == ErrorKind::NotFound {
            return true;
        }
        let mut folder = self.root.clone();
        let mut parts = entry.path.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                break;
            }
            folder.push(part);
            match fs::metadata(&folder) {
                Ok(m) if m.is_dir() => {}
                Ok(_) => return true,
                Err(e) => return e.kind() == ErrorKind::NotFound,
            }
        }
        false
    }

    /// Converts a path under the root into an entry path.
    ///
    /// `.` components are ignored on both sides, since glob may or may not
    /// keep them.
    fn relative(&self, path: &Path) -> Option<String> {
        let mut components = path.components().filter(|c| *c != Component::CurDir);
        for expected in self.root.components().filter(|c| *c != Component::CurDir) {
            if components.next()? != expected {
                return None;
            }
        }
        let parts = components
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        let joined = parts.join("/");
        manifest::check_entry_path(&joined).ok()?;
        Some(joined)
    }
}

impl FileIndex<DataFiles> {
    /// Same as [`FileIndex::verify`].
    ///
    /// # Errors
    ///
    /// Same as [`FileIndex::verify`].
    pub fn verify_data_files(&mut self) -> CoreResult<VerifyReport> {
        self.verify()
    }

    /// Returns the distinct table names of all data files, sorted.
    ///
    /// Files sharing a stem, such as `a/scan.csv` and `b/scan.csv`, name
    /// one table and appear once.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.table_name.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FileIndex<ImageFiles> {
    /// Same as [`FileIndex::verify`].
    ///
    /// # Errors
    ///
    /// Same as [`FileIndex::verify`].
    pub fn verify_image_files(&mut self) -> CoreResult<VerifyReport> {
        self.verify()
    }

    /// Returns the floorplan image for deck `deck`, if indexed.
    #[must_use]
    pub fn deck_image(&self, deck: u32) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.deck == Some(deck))
    }

    /// Returns every deck that has a floorplan image, sorted.
    #[must_use]
    pub fn available_decks(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter_map(|e| e.deck)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
