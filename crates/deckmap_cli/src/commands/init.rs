//! Init command implementation.

use deckmap_core::{Config, IndexStatus, Workspace};
use tracing::info;

/// Runs the init command.
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(root = %config.root.display(), "opening workspace");
    let workspace = Workspace::open(config)?;
    let startup = workspace.startup();

    println!("Workspace ready at {}", workspace.config().root.display());
    for folder in &startup.created_folders {
        println!("  created {}", folder.display());
    }
    print_status("Data index", &startup.data_index, workspace.data_index().len());
    print_status("Image index", &startup.image_index, workspace.image_index().len());
    if !startup.scanned_images.is_empty() {
        println!("  new images: {}", startup.scanned_images.join(", "));
    }

    let decks = workspace.image_index().available_decks();
    if decks.is_empty() {
        println!("  no deck images found");
    } else {
        let decks: Vec<String> = decks.iter().map(u32::to_string).collect();
        println!("  decks with images: {}", decks.join(", "));
    }

    Ok(())
}

fn print_status(label: &str, status: &IndexStatus, entries: usize) {
    match status {
        IndexStatus::Loaded(report) => println!(
            "  {label}: loaded, {entries} entries ({} removed, {} refreshed, {} skipped)",
            report.removed.len(),
            report.refreshed.len(),
            report.skipped.len()
        ),
        IndexStatus::Reinitialized => println!("  {label}: reinitialized, {entries} entries"),
    }
}
