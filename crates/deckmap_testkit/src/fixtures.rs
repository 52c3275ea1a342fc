//! Test fixtures and workspace helpers.
//!
//! Provides temporary workspaces and sample tables for common test
//! scenarios.

use deckmap_codec::{CodecKind, Schema, Table, Value};
use deckmap_core::{Config, Database, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema of the sample location tables.
pub const LOCATION_SCHEMA: &str = "MAC:string,Deck:string,X:double,Y:double,Time:int";

/// A workspace in a temporary directory, removed on drop.
pub struct TempWorkspace {
    temp_dir: TempDir,
    config: Config,
}

impl TempWorkspace {
    /// Creates an empty temporary root with the default configuration.
    ///
    /// No folders are created until [`TempWorkspace::open`] or one of the
    /// write helpers runs.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::new(temp_dir.path());
        Self { temp_dir, config }
    }

    /// Returns the workspace root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the start-up sequence.
    pub fn open(&self) -> Workspace {
        Workspace::open(self.config.clone()).expect("Failed to open workspace")
    }

    /// Returns the resolved location data folder.
    pub fn data_dir(&self) -> PathBuf {
        self.config.resolve(&self.config.location_data_folder)
    }

    /// Returns the resolved image folder.
    pub fn image_dir(&self) -> PathBuf {
        self.config.resolve(&self.config.image_folder)
    }

    /// Writes a raw data file at `relative` under the data folder.
    pub fn write_data_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.data_dir().join(relative), contents)
    }

    /// Writes a placeholder image called `name` into the image folder.
    pub fn write_image(&self, name: &str) -> PathBuf {
        write_file(&self.image_dir().join(name), name.as_bytes())
    }

    /// Stores `tables` in the location database.
    pub fn store_location_tables(&self, tables: impl IntoIterator<Item = Table>) {
        let dir = self.config.resolve(&self.config.data_cache_folder);
        let mut db = Database::open(&dir, self.config.location_codec)
            .expect("Failed to open location database");
        for table in tables {
            let target = db
                .create_table(table.name(), table.schema().clone())
                .expect("Failed to create table");
            for record in table.records() {
                target
                    .add_row(record.values().to_vec())
                    .expect("Failed to copy row");
            }
        }
        db.save_changes().expect("Failed to save location tables");
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, contents: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, contents).expect("Failed to write file");
    path.to_path_buf()
}

/// One sample position: `(mac, deck, x, y)`.
pub type Sighting<'a> = (&'a str, u32, f64, f64);

/// Builds a location table from sightings; `Time` counts up from zero.
pub fn location_table(name: &str, sightings: &[Sighting<'_>]) -> Table {
    let schema = Schema::parse(LOCATION_SCHEMA).expect("Invalid location schema");
    let mut table = Table::new(name, schema);
    for (i, (mac, deck, x, y)) in sightings.iter().enumerate() {
        table
            .add_row(vec![
                Value::from(*mac),
                Value::from(format!("Deck{deck}")),
                Value::from(*x),
                Value::from(*y),
                Value::Int(i as i64),
            ])
            .expect("Failed to add sighting");
    }
    table
}

/// Builds the `Contacts` table with the given `(name, address)` pairs.
pub fn contacts_table(contacts: &[(&str, &str)]) -> Table {
    let schema =
        Schema::parse(deckmap_core::CONTACTS_SCHEMA).expect("Invalid contacts schema");
    let mut table = Table::new(deckmap_core::CONTACTS_TABLE, schema);
    for (name, address) in contacts {
        table
            .add_record([("Name", *name), ("EmailAddress", *address)])
            .expect("Failed to add contact");
    }
    table
}

/// Runs a test with an empty in-memory database.
///
/// # Example
///
/// ```
/// use deckmap_codec::CodecKind;
/// use deckmap_testkit::with_temp_db;
///
/// with_temp_db(CodecKind::Text, |db| {
///     assert!(db.get_table("Contacts").unwrap().is_none());
/// });
/// ```
pub fn with_temp_db<F, R>(kind: CodecKind, f: F) -> R
where
    F: FnOnce(&mut Database) -> R,
{
    let mut db = Database::in_memory(kind);
    f(&mut db)
}

/// Runs a test with a database in a temporary directory.
///
/// The closure also receives the directory, so it can reopen the database.
pub fn with_file_db<F, R>(kind: CodecKind, f: F) -> R
where
    F: FnOnce(&mut Database, &Path) -> R,
{
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut db = Database::open(temp_dir.path(), kind).expect("Failed to open file database");
    f(&mut db, temp_dir.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_location_table() {
        let table = location_table("day1", &[("aa", 1, 1.0, 2.0), ("bb", 2, 3.0, 4.0)]);
        assert_eq!(table.record_count(), 2);
        let rows = table.get_records("Deck", "Deck2").unwrap();
        assert_eq!(rows[0].get_value::<String>("MAC").unwrap(), "bb");
        assert_eq!(rows[0].get_value::<i64>("Time").unwrap(), 1);
    }

    #[test]
    fn temp_workspace_writes_files() {
        let ws = TempWorkspace::new();
        let path = ws.write_data_file("2024/day1.csv", b"raw");
        assert!(path.is_file());
        assert!(path.starts_with(ws.root()));
    }

    #[test]
    fn stored_tables_are_readable() {
        let ws = TempWorkspace::new();
        ws.store_location_tables([location_table("day1", &[("aa", 1, 1.0, 2.0)])]);

        let workspace = ws.open();
        let mut db = workspace.open_location_database().unwrap();
        let table = db.get_table("day1").unwrap().unwrap();
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn file_db_can_be_reopened() {
        with_file_db(CodecKind::Binary, |db, dir| {
            db.create_table("t", Schema::parse("A:int").unwrap()).unwrap();
            db.save_changes().unwrap();

            let mut reopened = Database::open(dir, CodecKind::Binary).unwrap();
            assert!(reopened.get_table("t").unwrap().is_some());
        });
    }

    #[test]
    fn contacts_fixture() {
        let table = contacts_table(&[("Alice", "a@x.com")]);
        assert_eq!(table.name(), "Contacts");
        assert_eq!(table.get_records("Name", "Alice").unwrap().len(), 1);
    }
}
