//! Tables command implementation.

use deckmap_codec::CodecKind;
use deckmap_core::Database;
use serde::Serialize;
use std::path::Path;

/// Summary of one table.
#[derive(Debug, Serialize)]
pub struct TableSummary {
    /// Table name.
    pub name: String,
    /// Schema spec.
    pub schema: String,
    /// Number of records.
    pub records: usize,
}

/// Runs the tables command.
pub fn run(dir: &Path, codec: CodecKind, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("No database found at {}", dir.display()).into());
    }
    let mut db = Database::open(dir, codec)?;

    let mut summaries = Vec::new();
    for name in db.table_names()? {
        if let Some(table) = db.get_table(&name)? {
            summaries.push(TableSummary {
                schema: table.schema().to_spec(),
                records: table.record_count(),
                name,
            });
        }
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summaries)?),
        _ => {
            if summaries.is_empty() {
                println!("No {codec} tables in {}", dir.display());
            }
            for s in &summaries {
                println!("{}  ({} records)  {}", s.name, s.records, s.schema);
            }
        }
    }

    Ok(())
}
