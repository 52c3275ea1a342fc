//! Index command implementation.

use deckmap_core::index::{DataFiles, FileIndex, ImageFiles, IndexKind};
use deckmap_core::Config;
use std::path::PathBuf;
use tracing::info;

/// What to do with an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add files not yet indexed, then save.
    Scan,
    /// Drop missing files and refresh changed ones, then save.
    Verify,
    /// Print the entries.
    Show,
}

/// Runs the index command on the data index.
pub fn run_data(config: &Config, action: Action) -> Result<(), Box<dyn std::error::Error>> {
    run::<DataFiles>(config.resolve(&config.location_data_folder), action)
}

/// Runs the index command on the image index.
pub fn run_image(config: &Config, action: Action) -> Result<(), Box<dyn std::error::Error>> {
    run::<ImageFiles>(config.resolve(&config.image_folder), action)
}

fn run<K: IndexKind>(root: PathBuf, action: Action) -> Result<(), Box<dyn std::error::Error>> {
    let mut index = match FileIndex::<K>::load_index(root.clone()) {
        Some(index) => index,
        None => {
            if action == Action::Show {
                return Err(format!("No {} index at {}", K::LABEL, root.display()).into());
            }
            info!(kind = K::LABEL, "starting a new index");
            FileIndex::new(root)
        }
    };

    match action {
        Action::Scan => {
            let added = index.scan_for_files()?;
            index.save_index()?;
            for path in &added {
                println!("+ {path}");
            }
            println!("{} added, {} indexed", added.len(), index.len());
        }
        Action::Verify => {
            let report = index.verify()?;
            index.save_index()?;
            for path in &report.removed {
                println!("- {path}");
            }
            for path in &report.refreshed {
                println!("~ {path}");
            }
            for path in &report.skipped {
                println!("? {path}");
            }
            println!(
                "{} removed, {} refreshed, {} skipped, {} indexed",
                report.removed.len(),
                report.refreshed.len(),
                report.skipped.len(),
                index.len()
            );
        }
        Action::Show => {
            for entry in index.entries() {
                let tag = entry
                    .table_name
                    .clone()
                    .or_else(|| entry.deck.map(|d| format!("Deck{d}")))
                    .unwrap_or_default();
                println!(
                    "{}  {} bytes  {}  {tag}",
                    entry.path,
                    entry.size,
                    entry.sha256.get(..12).unwrap_or(&entry.sha256)
                );
            }
            println!("{} indexed", index.len());
        }
    }

    Ok(())
}
