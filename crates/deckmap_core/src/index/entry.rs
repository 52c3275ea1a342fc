//! Index entries and file fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// One tracked file.
///
/// Fields other than `path` default when absent so a hand-edited manifest
/// still loads; such entries are refreshed by the next verify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Path relative to the index root, `/`-separated.
    pub path: String,
    /// Size in bytes when last fingerprinted.
    #[serde(default)]
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    #[serde(default)]
    pub modified: u64,
    /// Sub-second part of the modification time, in nanoseconds.
    ///
    /// Absent in older manifests; such entries are re-hashed once.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub modified_nanos: u32,
    /// Lowercase hex SHA-256 of the contents.
    #[serde(default)]
    pub sha256: String,
    /// Table the data file feeds (data indices only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Deck the image shows (image indices only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<u32>,
}

impl IndexEntry {
    /// Fingerprints the file at `absolute` into a new, unannotated entry.
    pub(crate) fn fingerprint(relative: String, absolute: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(absolute)?;
        let (modified, modified_nanos) = modified_time(&metadata);
        Ok(Self {
            path: relative,
            size: metadata.len(),
            modified,
            modified_nanos,
            sha256: sha256_file(absolute)?,
            table_name: None,
            deck: None,
        })
    }

    /// Returns whether size or mtime differ from `metadata`.
    ///
    /// Mtimes compare at the resolution the file system records, so a
    /// same-size rewrite is only missed when the clock did not advance.
    pub(crate) fn is_stale(&self, metadata: &Metadata) -> bool {
        self.size != metadata.len()
            || (self.modified, self.modified_nanos) != modified_time(metadata)
    }
}

/// Modification time as seconds and sub-second nanoseconds since the epoch.
pub(crate) fn modified_time(metadata: &Metadata) -> (u64, u32) {
    let since_epoch = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .unwrap_or_default();
    (since_epoch.as_secs(), since_epoch.subsec_nanos())
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Streams a file through SHA-256.
pub(crate) fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sha256_of_known_content() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_records_size_and_digest() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scan.csv");
        fs::write(&path, b"MAC:string\n").unwrap();

        let entry = IndexEntry::fingerprint("scan.csv".into(), &path).unwrap();
        assert_eq!(entry.path, "scan.csv");
        assert_eq!(entry.size, 11);
        assert!(entry.modified > 0);
        assert_eq!(entry.sha256.len(), 64);
        assert!(!entry.is_stale(&fs::metadata(&path).unwrap()));

        fs::write(&path, b"MAC:string\naa\n").unwrap();
        assert!(entry.is_stale(&fs::metadata(&path).unwrap()));
    }

    #[test]
    fn sub_second_mtime_change_is_stale() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scan.csv");
        fs::write(&path, b"MAC:string\n").unwrap();
        let metadata = fs::metadata(&path).unwrap();

        let mut entry = IndexEntry::fingerprint("scan.csv".into(), &path).unwrap();
        assert_eq!(
            (entry.modified, entry.modified_nanos),
            modified_time(&metadata)
        );
        entry.modified_nanos = entry.modified_nanos.wrapping_add(1) % 1_000_000_000;
        assert!(entry.is_stale(&metadata));
    }

    #[test]
    fn missing_fields_default() {
        let entry: IndexEntry = serde_json::from_str(r#"{"path":"a.csv","extra":1}"#).unwrap();
        assert_eq!(entry.path, "a.csv");
        assert_eq!(entry.size, 0);
        assert!(entry.sha256.is_empty());
        assert!(entry.table_name.is_none());
    }

    #[test]
    fn optional_annotations_are_omitted() {
        let entry = IndexEntry {
            path: "Deck1.bmp".into(),
            deck: Some(1),
            ..IndexEntry::default()
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""deck":1"#));
        assert!(!json.contains("table_name"));
    }
}
