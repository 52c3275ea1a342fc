//! On-disk index manifest.
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": [
//!     { "path": "a/b.csv", "size": 10, "modified": 1700000000,
//!       "sha256": "…", "table_name": "b" }
//!   ]
//! }
//! ```

use super::entry::IndexEntry;
use crate::error::{CoreError, CoreResult};
use deckmap_storage::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Name of the manifest inside an index root.
pub const MANIFEST_FILE: &str = "index.json";

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Serialize)]
struct ManifestRef<'a> {
    version: u32,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct ManifestOwned {
    version: u32,
    #[serde(default)]
    entries: Vec<IndexEntry>,
}

/// Reads and validates the manifest at `path`.
///
/// Every failure, including a missing file, is a
/// [`CoreError::ManifestLoad`]. The file is never modified.
pub(crate) fn read(path: &Path) -> CoreResult<Vec<IndexEntry>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CoreError::manifest_load(path, "manifest does not exist"))
        }
        Err(e) => return Err(CoreError::manifest_load(path, e.to_string())),
    };
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(CoreError::manifest_load(path, "manifest is empty"));
    }

    let manifest: ManifestOwned = serde_json::from_slice(&data)
        .map_err(|e| CoreError::manifest_load(path, e.to_string()))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(CoreError::manifest_load(
            path,
            format!("unsupported manifest version {}", manifest.version),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &manifest.entries {
        check_entry_path(&entry.path).map_err(|reason| {
            CoreError::manifest_load(path, format!("entry {:?}: {reason}", entry.path))
        })?;
        if !seen.insert(entry.path.as_str()) {
            return Err(CoreError::manifest_load(
                path,
                format!("duplicate entry {:?}", entry.path),
            ));
        }
    }

    Ok(manifest.entries)
}

/// Atomically replaces the manifest at `path`.
pub(crate) fn write(path: &Path, entries: &[IndexEntry]) -> CoreResult<()> {
    let manifest = ManifestRef {
        version: MANIFEST_VERSION,
        entries,
    };
    let mut data = serde_json::to_vec_pretty(&manifest)?;
    data.push(b'\n');
    write_atomic(path, &data)?;
    Ok(())
}

/// Entry paths must stay inside the index root.
pub(crate) fn check_entry_path(path: &str) -> Result<(), &'static str> {
    if path.is_empty() {
        return Err("empty path");
    }
    if path.starts_with('/') || path.contains('\\') {
        return Err("path must be relative and '/'-separated");
    }
    if path.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return Err("path has an empty, '.' or '..' component");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry {
            path: path.into(),
            size: 3,
            modified: 1_700_000_000,
            modified_nanos: 250,
            sha256: "00".into(),
            table_name: Some("b".into()),
            deck: None,
        }
    }

    #[test]
    fn write_then_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        let entries = vec![entry("a/b.csv"), entry("c.csv")];

        write(&path, &entries).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"version\": 1"));
        assert!(text.ends_with('\n'));

        assert_eq!(read(&path).unwrap(), entries);
    }

    #[test]
    fn failures_are_manifest_load_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILE);

        let cases: [&[u8]; 6] = [
            b"",
            b"  \n",
            b"{not json",
            br#"{"version":2,"entries":[]}"#,
            br#"{"version":1,"entries":[{"path":"../x"}]}"#,
            br#"{"version":1,"entries":[{"path":"a"},{"path":"a"}]}"#,
        ];
        for bytes in cases {
            fs::write(&path, bytes).unwrap();
            assert!(
                matches!(read(&path), Err(CoreError::ManifestLoad { .. })),
                "{:?} should fail",
                String::from_utf8_lossy(bytes)
            );
            assert_eq!(fs::read(&path).unwrap(), bytes);
        }

        fs::remove_file(&path).unwrap();
        assert!(matches!(read(&path), Err(CoreError::ManifestLoad { .. })));
    }

    #[test]
    fn entries_may_be_omitted() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        fs::write(&path, br#"{"version":1}"#).unwrap();
        assert!(read(&path).unwrap().is_empty());
    }

    #[test]
    fn entry_path_rules() {
        assert!(check_entry_path("a/b.csv").is_ok());
        assert!(check_entry_path("aa:bb:cc.csv").is_ok());
        for bad in ["", "/abs", "a\\b", "a//b", "./a", "a/../b"] {
            assert!(check_entry_path(bad).is_err(), "{bad:?}");
        }
    }
}
