//! Workspace directory management.
//!
//! A workspace is a root directory with one folder per concern:
//!
//! ```text
//! <root>/
//! ├─ Analysis/
//! ├─ DataCache/        # Location tables (binary codec)
//! ├─ EmailDatabase/    # Contacts and presets (text codec)
//! ├─ Images/           # Deck images + index.json
//! └─ LocationData/     # Raw data files + index.json
//! ```

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Makes sure every folder named by `config` exists.
///
/// Returns the folders that had to be created, in the order they were
/// created.
///
/// # Errors
///
/// Returns an error if:
/// - A folder is missing and `create_if_missing` is false
/// - A folder path exists but is not a directory
/// - I/O errors occur
pub fn prepare_folders(config: &Config) -> CoreResult<Vec<PathBuf>> {
    let mut created = Vec::new();
    for folder in config.folders() {
        if ensure_dir(&folder, config.create_if_missing)? {
            created.push(folder);
        }
    }
    Ok(created)
}

/// Ensures `path` is a directory; returns whether it had to be created.
fn ensure_dir(path: &Path, create_if_missing: bool) -> CoreResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        return Err(CoreError::invalid_path(path, "exists but is not a directory"));
    }
    if !create_if_missing {
        return Err(CoreError::invalid_path(
            path,
            "folder does not exist and create_if_missing is false",
        ));
    }
    fs::create_dir_all(path)?;
    Ok(true)
}
