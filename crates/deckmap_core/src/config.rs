//! Workspace configuration.

use deckmap_codec::CodecKind;
use std::path::{Path, PathBuf};

/// Configuration for opening a [`crate::Workspace`].
///
/// Folder names are relative to `root` unless they are absolute.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the workspace.
    pub root: PathBuf,

    /// Raw location data files; holds the data index manifest.
    pub location_data_folder: PathBuf,

    /// Deck floorplan images; holds the image index manifest.
    pub image_folder: PathBuf,

    /// Decoded location tables.
    pub data_cache_folder: PathBuf,

    /// Analysis output.
    pub analysis_folder: PathBuf,

    /// Contacts and e-mail presets.
    pub email_database: PathBuf,

    /// Codec used for location tables.
    pub location_codec: CodecKind,

    /// Codec used for the e-mail database.
    pub email_codec: CodecKind,

    /// Whether `Workspace::open` creates missing folders.
    pub create_if_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            location_data_folder: PathBuf::from("LocationData"),
            image_folder: PathBuf::from("Images"),
            data_cache_folder: PathBuf::from("DataCache"),
            analysis_folder: PathBuf::from("Analysis"),
            email_database: PathBuf::from("EmailDatabase"),
            location_codec: CodecKind::Binary,
            email_codec: CodecKind::Text,
            create_if_missing: true,
        }
    }
}

impl Config {
    /// Creates a configuration with default folder names under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Sets the location data folder.
    #[must_use]
    pub fn location_data_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.location_data_folder = path.into();
        self
    }

    /// Sets the image folder.
    #[must_use]
    pub fn image_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_folder = path.into();
        self
    }

    /// Sets the data cache folder.
    #[must_use]
    pub fn data_cache_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_cache_folder = path.into();
        self
    }

    /// Sets the analysis folder.
    #[must_use]
    pub fn analysis_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.analysis_folder = path.into();
        self
    }

    /// Sets the e-mail database folder.
    #[must_use]
    pub fn email_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.email_database = path.into();
        self
    }

    /// Sets the codec used for location tables.
    #[must_use]
    pub const fn location_codec(mut self, kind: CodecKind) -> Self {
        self.location_codec = kind;
        self
    }

    /// Sets the codec used for the e-mail database.
    #[must_use]
    pub const fn email_codec(mut self, kind: CodecKind) -> Self {
        self.email_codec = kind;
        self
    }

    /// Sets whether missing folders are created.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Resolves a configured folder against the root.
    #[must_use]
    pub fn resolve(&self, folder: &Path) -> PathBuf {
        self.root.join(folder)
    }

    /// Returns every folder the workspace needs, resolved.
    #[must_use]
    pub fn folders(&self) -> Vec<PathBuf> {
        [
            &self.analysis_folder,
            &self.image_folder,
            &self.data_cache_folder,
            &self.location_data_folder,
            &self.email_database,
        ]
        .into_iter()
        .map(|f| self.resolve(f))
        .collect()
    }
}
