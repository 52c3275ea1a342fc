//! Show command implementation.

use super::parse_assignment;
use deckmap_codec::{CodecKind, Record};
use deckmap_core::Database;
use std::path::Path;

/// Runs the show command.
pub fn run(
    dir: &Path,
    codec: CodecKind,
    table: &str,
    filter: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open(dir, codec)?;
    let table = db
        .get_table(table)?
        .ok_or_else(|| format!("No table {table} in {}", dir.display()))?;

    let records: Vec<&Record> = match filter {
        Some(filter) => {
            let (field, value) = parse_assignment(table.schema(), filter)?;
            table.get_records(&field, value)?
        }
        None => table.records().iter().collect(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => print_text(table.schema().fields().iter().map(|f| f.name()), &records),
    }

    Ok(())
}

fn print_text<'a>(header: impl Iterator<Item = &'a str>, records: &[&Record]) {
    println!("{}", header.collect::<Vec<_>>().join("\t"));
    for record in records {
        let row: Vec<String> = record.values().iter().map(ToString::to_string).collect();
        println!("{}", row.join("\t"));
    }
    println!("({} records)", records.len());
}
