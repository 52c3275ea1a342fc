//! Insert command implementation.

use super::parse_assignment;
use deckmap_codec::CodecKind;
use deckmap_core::Database;
use std::path::Path;

/// Runs the insert command.
pub fn run(
    dir: &Path,
    codec: CodecKind,
    table: &str,
    values: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open(dir, codec)?;
    let target = db
        .get_table_mut(table)?
        .ok_or_else(|| format!("No table {table} in {}", dir.display()))?;

    let pairs = values
        .iter()
        .map(|v| parse_assignment(target.schema(), v))
        .collect::<Result<Vec<_>, _>>()?;
    target.add_record(pairs)?;
    let count = target.record_count();
    db.save_changes()?;

    println!("Inserted 1 record into {table} ({count} total)");
    Ok(())
}
