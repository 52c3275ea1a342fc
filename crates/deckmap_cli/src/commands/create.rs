//! Create command implementation.

use deckmap_codec::{CodecKind, Schema};
use deckmap_core::Database;
use std::path::Path;
use tracing::info;

/// Runs the create command.
pub fn run(
    dir: &Path,
    codec: CodecKind,
    table: &str,
    schema: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::parse(schema)?;
    let mut db = Database::open(dir, codec)?;
    db.create_table(table, schema)?;
    db.save_changes()?;

    info!(table, dir = %dir.display(), "table created");
    println!("Created table {table}");
    Ok(())
}
