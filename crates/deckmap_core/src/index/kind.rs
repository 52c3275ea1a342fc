//! What a file index tracks.

use super::entry::IndexEntry;
use super::manifest::MANIFEST_FILE;

/// Decides which files an index tracks and how entries are annotated.
///
/// Paths handed to a kind are relative to the index root and use `/` as the
/// separator.
pub trait IndexKind: Send + Sync + 'static {
    /// Short label used in logs.
    const LABEL: &'static str;

    /// Returns whether the file at `relative` belongs in the index.
    fn tracks(relative: &str) -> bool;

    /// Fills the kind-specific fields of a freshly built entry.
    fn annotate(entry: &mut IndexEntry);
}

/// Image formats an image index recognises, lowercase.
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "png", "jpg", "jpeg", "gif"];

/// Raw location data files.
///
/// Every regular file is tracked except the manifest and hidden or
/// temporary files. Entries carry the table name derived from the file
/// stem, since table blobs live in one flat folder. Files with the same
/// stem in different sub-folders therefore feed the same table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataFiles;

impl IndexKind for DataFiles {
    const LABEL: &'static str = "data";

    fn tracks(relative: &str) -> bool {
        relative != MANIFEST_FILE && !is_hidden(relative)
    }

    fn annotate(entry: &mut IndexEntry) {
        entry.table_name = Some(file_stem(&entry.path).to_string());
    }
}

/// Deck floorplan images.
///
/// Tracks files with an extension from [`IMAGE_EXTENSIONS`]. An image named
/// `Deck<N>.<ext>` is the floorplan for deck `N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageFiles;

impl IndexKind for ImageFiles {
    const LABEL: &'static str = "image";

    fn tracks(relative: &str) -> bool {
        if is_hidden(relative) {
            return false;
        }
        let name = file_name(relative);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)),
            _ => false,
        }
    }

    fn annotate(entry: &mut IndexEntry) {
        entry.deck = deck_number(file_stem(&entry.path));
    }
}

/// Parses `Deck<N>` (any case) into `N`.
pub(crate) fn deck_number(stem: &str) -> Option<u32> {
    let prefix = stem.get(..4)?;
    if !prefix.eq_ignore_ascii_case("deck") {
        return None;
    }
    let digits = &stem[4..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

fn file_stem(relative: &str) -> &str {
    let name = file_name(relative);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Dot-files, including the temporaries left by an interrupted atomic
/// write.
fn is_hidden(relative: &str) -> bool {
    relative.split('/').any(|part| part.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            ..IndexEntry::default()
        }
    }

    #[test]
    fn data_files_skip_manifest_and_temporaries() {
        assert!(DataFiles::tracks("scan1.csv"));
        assert!(DataFiles::tracks("2024/March/scan1.bin"));
        assert!(DataFiles::tracks("sub/index.json"));
        assert!(!DataFiles::tracks("index.json"));
        assert!(!DataFiles::tracks(".index.json.tmp"));
        assert!(!DataFiles::tracks(".git/config"));
    }

    #[test]
    fn image_files_by_extension() {
        assert!(ImageFiles::tracks("Deck1.bmp"));
        assert!(ImageFiles::tracks("extra/Deck2.PNG"));
        assert!(ImageFiles::tracks("photo.jpeg"));
        assert!(!ImageFiles::tracks("notes.txt"));
        assert!(!ImageFiles::tracks("index.json"));
        assert!(!ImageFiles::tracks(".png"));
        assert!(!ImageFiles::tracks("bmp"));
    }

    #[test]
    fn data_annotation_is_file_stem() {
        let mut e = entry("2024/pings.day1.csv");
        DataFiles::annotate(&mut e);
        assert_eq!(e.table_name.as_deref(), Some("pings.day1"));

        let mut e = entry("README");
        DataFiles::annotate(&mut e);
        assert_eq!(e.table_name.as_deref(), Some("README"));
    }

    #[test]
    fn image_annotation_is_deck_number() {
        let mut e = entry("Deck12.bmp");
        ImageFiles::annotate(&mut e);
        assert_eq!(e.deck, Some(12));

        let mut e = entry("floor/deck3.png");
        ImageFiles::annotate(&mut e);
        assert_eq!(e.deck, Some(3));

        let mut e = entry("Logo.png");
        ImageFiles::annotate(&mut e);
        assert_eq!(e.deck, None);
    }

    #[test]
    fn deck_number_parsing() {
        assert_eq!(deck_number("Deck0"), Some(0));
        assert_eq!(deck_number("DECK7"), Some(7));
        assert_eq!(deck_number("Deck"), None);
        assert_eq!(deck_number("Deck-1"), None);
        assert_eq!(deck_number("Deck1a"), None);
        assert_eq!(deck_number("Dé"), None);
        assert_eq!(deck_number("Deck99999999999"), None);
    }
}
