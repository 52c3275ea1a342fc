//! Database facade over a storage backend and a table codec.

use crate::error::{CoreError, CoreResult, TableSaveFailure};
use deckmap_codec::{CodecKind, Schema, Table, TableCodec};
use deckmap_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// A named set of tables persisted through one codec.
///
/// Each table lives in its own blob called `<table>.<extension>`, where the
/// extension comes from the codec (`csv` or `bin`). Tables are loaded
/// lazily on first access and cached; nothing is written until
/// [`Database::save_changes`].
///
/// # Opening a Database
///
/// ```
/// use deckmap_codec::{CodecKind, Schema};
/// use deckmap_core::Database;
///
/// let mut db = Database::in_memory(CodecKind::Text);
/// let contacts = db
///     .create_table("Contacts", Schema::parse("Name:string,EmailAddress:string").unwrap())
///     .unwrap();
/// contacts
///     .add_record([("Name", "Alice"), ("EmailAddress", "a@x.com")])
///     .unwrap();
/// db.save_changes().unwrap();
///
/// assert_eq!(db.table_names().unwrap(), vec!["Contacts"]);
/// ```
pub struct Database {
    backend: Box<dyn StorageBackend>,
    codec: Box<dyn TableCodec>,
    /// Tables loaded or created in this session.
    tables: BTreeMap<String, Table>,
}

impl Database {
    /// Opens a database stored in the directory `dir`.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path, kind: CodecKind) -> CoreResult<Self> {
        let backend = FileBackend::open(dir)?;
        debug!(dir = %dir.display(), codec = %kind, "opened database");
        Ok(Self::with_backend(Box::new(backend), kind))
    }

    /// Creates an empty in-memory database.
    #[must_use]
    pub fn in_memory(kind: CodecKind) -> Self {
        Self::with_backend(Box::new(InMemoryBackend::new()), kind)
    }

    /// Creates a database over an arbitrary backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn StorageBackend>, kind: CodecKind) -> Self {
        Self {
            backend,
            codec: kind.codec(),
            tables: BTreeMap::new(),
        }
    }

    /// Returns the codec this database stores tables with.
    #[must_use]
    pub fn codec_kind(&self) -> CodecKind {
        self.codec.kind()
    }

    /// Returns the underlying storage backend.
    #[must_use]
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Returns the table called `name`, loading it from storage if needed.
    ///
    /// Returns `None` if the table is neither loaded nor stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored table cannot be read or decoded. A
    /// table that fails to decode is not cached.
    pub fn get_table(&mut self, name: &str) -> CoreResult<Option<&Table>> {
        if !self.load(name)? {
            return Ok(None);
        }
        Ok(self.tables.get(name))
    }

    /// Mutable variant of [`Database::get_table`].
    ///
    /// # Errors
    ///
    /// Same as [`Database::get_table`].
    pub fn get_table_mut(&mut self, name: &str) -> CoreResult<Option<&mut Table>> {
        if !self.load(name)? {
            return Ok(None);
        }
        Ok(self.tables.get_mut(name))
    }

    /// Loads several tables at once, skipping names that do not exist.
    ///
    /// The result follows the order of `names`; a name given twice is
    /// returned twice.
    ///
    /// # Errors
    ///
    /// Returns the first load error, as [`Database::get_table`].
    pub fn load_tables<I, S>(&mut self, names: I) -> CoreResult<Vec<&Table>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.load(name)? {
                found.push(name.to_string());
            } else {
                debug!(table = name, "table not found, skipping");
            }
        }
        Ok(found
            .iter()
            .filter_map(|name| self.tables.get(name))
            .collect())
    }

    /// Registers a new, empty table.
    ///
    /// The table is only written by the next [`Database::save_changes`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateTable`] if a table with this name is
    /// already loaded or stored, or a storage error if the name is not a
    /// valid blob name.
    pub fn create_table(&mut self, name: &str, schema: Schema) -> CoreResult<&mut Table> {
        let blob = self.blob_name(name);
        if self.tables.contains_key(name) || self.backend.exists(&blob)? {
            return Err(CoreError::duplicate_table(name));
        }

        debug!(table = name, schema = %schema, "created table");
        Ok(self
            .tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name, schema)))
    }

    /// Returns the table called `name`, creating it with `schema` if it
    /// does not exist.
    ///
    /// An existing table is returned as stored, even if its schema differs.
    ///
    /// # Errors
    ///
    /// Same as [`Database::get_table`] and [`Database::create_table`].
    pub fn ensure_table(&mut self, name: &str, schema: Schema) -> CoreResult<&mut Table> {
        if !self.load(name)? {
            return self.create_table(name, schema);
        }
        self.tables
            .get_mut(name)
            .ok_or_else(|| CoreError::duplicate_table(name))
    }

    /// Writes every loaded or created table to storage.
    ///
    /// Each table is encoded and atomically replaced on its own. A failure
    /// on one table does not stop the others from being written.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SaveFailed`] listing every table that could not
    /// be written. Tables not listed were saved.
    pub fn save_changes(&mut self) -> CoreResult<()> {
        let mut failures = Vec::new();
        let extension = self.codec.kind().extension();
        let backend = &mut self.backend;

        for (name, table) in &self.tables {
            let blob = format!("{name}.{extension}");
            let result = self
                .codec
                .encode(table)
                .map_err(CoreError::from)
                .and_then(|bytes| backend.write(&blob, &bytes).map_err(CoreError::from));

            match result {
                Ok(()) => debug!(table = %name, rows = table.record_count(), "saved table"),
                Err(e) => {
                    warn!(table = %name, error = %e, "failed to save table");
                    failures.push(TableSaveFailure {
                        table: name.clone(),
                        error: Box::new(e),
                    });
                }
            }
        }

        if failures.is_empty() {
            info!(tables = self.tables.len(), "saved changes");
            Ok(())
        } else {
            Err(CoreError::SaveFailed { failures })
        }
    }

    /// Returns the names of all loaded and stored tables, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be listed.
    pub fn table_names(&self) -> CoreResult<Vec<String>> {
        let suffix = format!(".{}", self.codec.kind().extension());
        let mut names: BTreeSet<String> = self.tables.keys().cloned().collect();
        for blob in self.backend.list()? {
            if let Some(name) = blob.strip_suffix(&suffix) {
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    fn blob_name(&self, table: &str) -> String {
        format!("{table}.{}", self.codec.kind().extension())
    }

    /// Ensures `name` is cached; returns false if it does not exist.
    fn load(&mut self, name: &str) -> CoreResult<bool> {
        if self.tables.contains_key(name) {
            return Ok(true);
        }

        let blob = self.blob_name(name);
        let Some(bytes) = self.backend.read(&blob)? else {
            return Ok(false);
        };
        let table = self.codec.decode(name, &bytes, None)?;
        debug!(table = name, rows = table.record_count(), "loaded table");
        self.tables.insert(name.to_string(), table);
        Ok(true)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("codec", &self.codec.kind())
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckmap_codec::{CodecError, Value};
    use deckmap_storage::{StorageError, StorageResult};
    use std::io;
    use tempfile::tempdir;

    fn contacts_schema() -> Schema {
        Schema::parse("Name:string,EmailAddress:string").unwrap()
    }

    /// Backend that refuses to write one blob.
    struct RejectingBackend {
        inner: InMemoryBackend,
        reject: &'static str,
    }

    impl StorageBackend for RejectingBackend {
        fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
            self.inner.read(name)
        }
        fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()> {
            if name == self.reject {
                return Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.inner.write(name, data)
        }
        fn exists(&self, name: &str) -> StorageResult<bool> {
            self.inner.exists(name)
        }
        fn remove(&mut self, name: &str) -> StorageResult<bool> {
            self.inner.remove(name)
        }
        fn list(&self) -> StorageResult<Vec<String>> {
            self.inner.list()
        }
    }

    #[test]
    fn missing_table_is_none() {
        let mut db = Database::in_memory(CodecKind::Binary);
        assert!(db.get_table("LocationData").unwrap().is_none());
        assert!(db.get_table_mut("LocationData").unwrap().is_none());
    }

    #[test]
    fn create_then_get() {
        let mut db = Database::in_memory(CodecKind::Text);
        db.create_table("Contacts", contacts_schema()).unwrap();

        let table = db.get_table("Contacts").unwrap().unwrap();
        assert!(table.is_empty());
        assert_eq!(table.schema(), &contacts_schema());
    }

    #[test]
    fn create_duplicate_fails() {
        let mut db = Database::in_memory(CodecKind::Text);
        db.create_table("Contacts", contacts_schema()).unwrap();
        assert!(matches!(
            db.create_table("Contacts", contacts_schema()),
            Err(CoreError::DuplicateTable { .. })
        ));
    }

    #[test]
    fn create_fails_if_stored_but_not_loaded() {
        let backend =
            InMemoryBackend::with_blobs([("Contacts.csv", b"Name:string\n".to_vec())]);
        let mut db = Database::with_backend(Box::new(backend), CodecKind::Text);
        assert!(matches!(
            db.create_table("Contacts", contacts_schema()),
            Err(CoreError::DuplicateTable { .. })
        ));
    }

    #[test]
    fn invalid_table_name_is_rejected() {
        let mut db = Database::in_memory(CodecKind::Text);
        assert!(matches!(
            db.create_table("../escape", contacts_schema()),
            Err(CoreError::Storage(StorageError::InvalidName { .. }))
        ));
    }

    #[test]
    fn save_and_reopen() {
        let temp = tempdir().unwrap();
        {
            let mut db = Database::open(temp.path(), CodecKind::Text).unwrap();
            let table = db.create_table("Contacts", contacts_schema()).unwrap();
            table
                .add_record([("Name", "Alice"), ("EmailAddress", "a@x.com")])
                .unwrap();
            db.save_changes().unwrap();
        }
        assert!(temp.path().join("Contacts.csv").is_file());

        let mut db = Database::open(temp.path(), CodecKind::Text).unwrap();
        let table = db.get_table("Contacts").unwrap().unwrap();
        assert_eq!(table.record_count(), 1);
        let found = table.get_records("Name", "Alice").unwrap();
        assert_eq!(
            found[0].get_value::<String>("EmailAddress").unwrap(),
            "a@x.com"
        );
    }

    #[test]
    fn unsaved_changes_are_not_visible_to_other_handles() {
        let temp = tempdir().unwrap();
        let mut db = Database::open(temp.path(), CodecKind::Binary).unwrap();
        db.create_table("t", Schema::parse("A:int").unwrap()).unwrap();

        let mut other = Database::open(temp.path(), CodecKind::Binary).unwrap();
        assert!(other.get_table("t").unwrap().is_none());
    }

    #[test]
    fn mutations_through_get_table_mut_are_saved() {
        let mut db = Database::in_memory(CodecKind::Binary);
        db.create_table("t", Schema::parse("A:int").unwrap()).unwrap();
        db.save_changes().unwrap();

        db.get_table_mut("t")
            .unwrap()
            .unwrap()
            .add_row(vec![Value::Int(7)])
            .unwrap();
        db.save_changes().unwrap();

        let blobs = db.backend().list().unwrap();
        assert_eq!(blobs, vec!["t.bin"]);
        let bytes = db.backend().read("t.bin").unwrap().unwrap();
        let table = CodecKind::Binary.codec().decode("t", &bytes, None).unwrap();
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn ensure_table_keeps_existing_rows() {
        let mut db = Database::in_memory(CodecKind::Text);
        db.ensure_table("Contacts", contacts_schema())
            .unwrap()
            .add_record([("Name", "Alice"), ("EmailAddress", "a@x.com")])
            .unwrap();
        db.save_changes().unwrap();

        let table = db.ensure_table("Contacts", contacts_schema()).unwrap();
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn ensure_table_loads_stored_table_as_is() {
        let backend =
            InMemoryBackend::with_blobs([("Contacts.csv", b"Name:string\nBob\n".to_vec())]);
        let mut db = Database::with_backend(Box::new(backend), CodecKind::Text);

        let table = db.ensure_table("Contacts", contacts_schema()).unwrap();
        assert_eq!(table.schema().to_spec(), "Name:string");
        assert_eq!(table.record_count(), 1);

        let created = db.ensure_table("Presets", contacts_schema()).unwrap();
        assert_eq!(created.record_count(), 0);
        assert_eq!(db.table_names().unwrap(), vec!["Contacts", "Presets"]);
    }

    #[test]
    fn corrupt_table_is_an_error_and_not_cached() {
        let backend = InMemoryBackend::with_blobs([("t.bin", vec![1, 0, 0])]);
        let mut db = Database::with_backend(Box::new(backend), CodecKind::Binary);

        assert!(matches!(
            db.get_table("t"),
            Err(CoreError::Codec(CodecError::Corrupt { .. }))
        ));
        assert!(db.get_table("t").is_err());
    }

    #[test]
    fn save_failure_is_isolated_per_table() {
        let backend = RejectingBackend {
            inner: InMemoryBackend::new(),
            reject: "b.csv",
        };
        let mut db = Database::with_backend(Box::new(backend), CodecKind::Text);
        for name in ["a", "b", "c"] {
            db.create_table(name, Schema::parse("A:int").unwrap()).unwrap();
        }

        let err = db.save_changes().unwrap_err();
        assert_eq!(err.failed_tables(), vec!["b"]);
        assert_eq!(db.backend().list().unwrap(), vec!["a.csv", "c.csv"]);
    }

    #[test]
    fn table_names_merge_loaded_and_stored() {
        let backend = InMemoryBackend::with_blobs([
            ("Presets.csv", b"Name:string\n".to_vec()),
            ("notes.txt", b"ignored".to_vec()),
        ]);
        let mut db = Database::with_backend(Box::new(backend), CodecKind::Text);
        db.create_table("Contacts", contacts_schema()).unwrap();

        assert_eq!(db.table_names().unwrap(), vec!["Contacts", "Presets"]);
    }

    #[test]
    fn load_tables_skips_missing() {
        let mut db = Database::in_memory(CodecKind::Binary);
        db.create_table("day2", Schema::parse("A:int").unwrap()).unwrap();
        db.create_table("day1", Schema::parse("B:int").unwrap()).unwrap();

        let tables = db.load_tables(["day2", "missing", "day1"]).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["day2", "day1"]);
    }

    #[test]
    fn codec_selects_extension() {
        let mut db = Database::in_memory(CodecKind::Binary);
        assert_eq!(db.codec_kind(), CodecKind::Binary);
        db.create_table("t", Schema::parse("A:int").unwrap()).unwrap();
        db.save_changes().unwrap();
        assert!(db.backend().exists("t.bin").unwrap());
    }
}
