//! Workspace bootstrap.

use crate::config::Config;
use crate::database::Database;
use crate::dir::prepare_folders;
use crate::error::CoreResult;
use crate::index::{
    DataFiles, DataIndex, FileIndex, ImageFiles, ImageIndex, IndexKind, VerifyReport,
};
use deckmap_codec::{Schema, Table};
use std::path::PathBuf;
use tracing::info;

/// Name of the contacts table in the e-mail database.
pub const CONTACTS_TABLE: &str = "Contacts";
/// Schema of the contacts table.
pub const CONTACTS_SCHEMA: &str = "Name:string,EmailAddress:string";
/// Name of the e-mail presets table.
pub const PRESETS_TABLE: &str = "Presets";
/// Schema of the e-mail presets table.
pub const PRESETS_SCHEMA: &str = "Name:string,Subject:string,Body:string";

/// How an index came to be at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    /// The saved manifest loaded and was verified.
    Loaded(VerifyReport),
    /// The manifest was missing or unusable; the index started empty.
    Reinitialized,
}

/// What [`Workspace::open`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Folders that did not exist and were created.
    pub created_folders: Vec<PathBuf>,
    /// Data index outcome.
    pub data_index: IndexStatus,
    /// Image index outcome.
    pub image_index: IndexStatus,
    /// Images found by the start-up scan.
    pub scanned_images: Vec<String>,
}

/// An opened workspace: configuration plus both file indices.
///
/// # Example
///
/// ```no_run
/// use deckmap_core::{Config, LocationQuery, Workspace};
///
/// let workspace = Workspace::open(Config::new("/srv/deckmap")).unwrap();
/// let mut db = workspace.open_location_database().unwrap();
/// let tables = workspace.location_tables(&mut db).unwrap();
/// let points = deckmap_core::collect_points(tables, &LocationQuery::new("aa:bb", 1)).unwrap();
/// ```
#[derive(Debug)]
pub struct Workspace {
    config: Config,
    data_index: DataIndex,
    image_index: ImageIndex,
    startup: StartupReport,
}

impl Workspace {
    /// Opens the workspace described by `config`.
    ///
    /// 1. Creates missing folders
    /// 2. Loads and verifies the data index, or starts a new one
    /// 3. Loads and verifies the image index, or starts a new one
    /// 4. Ensures the e-mail database has its `Contacts` and `Presets`
    ///    tables and saves it
    /// 5. Saves the data index, scans for new images and saves the image
    ///    index
    ///
    /// # Errors
    ///
    /// Returns an error if a folder cannot be prepared, a file cannot be
    /// read while verifying, a stored e-mail table is corrupt, or a
    /// manifest or table cannot be written.
    pub fn open(config: Config) -> CoreResult<Self> {
        let created_folders = prepare_folders(&config)?;
        if !created_folders.is_empty() {
            info!(count = created_folders.len(), "created workspace folders");
        }

        let (data_index, data_status) =
            load_or_init::<DataFiles>(config.resolve(&config.location_data_folder))?;
        let (mut image_index, image_status) =
            load_or_init::<ImageFiles>(config.resolve(&config.image_folder))?;

        let mut email = Database::open(&config.resolve(&config.email_database), config.email_codec)?;
        ensure_email_tables(&mut email)?;
        email.save_changes()?;

        data_index.save_index()?;
        let scanned_images = image_index.scan_for_files()?;
        image_index.save_index()?;

        info!(
            data_files = data_index.len(),
            images = image_index.len(),
            new_images = scanned_images.len(),
            "workspace ready"
        );

        Ok(Self {
            config,
            data_index,
            image_index,
            startup: StartupReport {
                created_folders,
                data_index: data_status,
                image_index: image_status,
                scanned_images,
            },
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the data index.
    #[must_use]
    pub fn data_index(&self) -> &DataIndex {
        &self.data_index
    }

    /// Returns the data index for updating.
    pub fn data_index_mut(&mut self) -> &mut DataIndex {
        &mut self.data_index
    }

    /// Returns the image index.
    #[must_use]
    pub fn image_index(&self) -> &ImageIndex {
        &self.image_index
    }

    /// Returns the image index for updating.
    pub fn image_index_mut(&mut self) -> &mut ImageIndex {
        &mut self.image_index
    }

    /// Returns what happened while opening.
    #[must_use]
    pub fn startup(&self) -> &StartupReport {
        &self.startup
    }

    /// Returns whether deck `deck` has a floorplan image.
    #[must_use]
    pub fn deck_enabled(&self, deck: u32) -> bool {
        self.image_index.deck_image(deck).is_some()
    }

    /// Opens the database holding the location tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cache folder cannot be opened.
    pub fn open_location_database(&self) -> CoreResult<Database> {
        Database::open(
            &self.config.resolve(&self.config.data_cache_folder),
            self.config.location_codec,
        )
    }

    /// Opens the e-mail database.
    ///
    /// # Errors
    ///
    /// Returns an error if the e-mail folder cannot be opened.
    pub fn open_email_database(&self) -> CoreResult<Database> {
        Database::open(
            &self.config.resolve(&self.config.email_database),
            self.config.email_codec,
        )
    }

    /// Loads the location table of every indexed data file from `db`.
    ///
    /// Data files whose table has not been created yet are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored table cannot be decoded.
    pub fn location_tables<'db>(&self, db: &'db mut Database) -> CoreResult<Vec<&'db Table>> {
        db.load_tables(self.data_index.table_names())
    }
}

fn load_or_init<K: IndexKind>(root: PathBuf) -> CoreResult<(FileIndex<K>, IndexStatus)> {
    match FileIndex::<K>::load_index(root.clone()) {
        Some(mut index) => {
            let report = index.verify()?;
            info!(
                kind = K::LABEL,
                entries = index.len(),
                removed = report.removed.len(),
                refreshed = report.refreshed.len(),
                skipped = report.skipped.len(),
                "index loaded"
            );
            Ok((index, IndexStatus::Loaded(report)))
        }
        None => {
            info!(kind = K::LABEL, "index reinitialized");
            Ok((FileIndex::new(root), IndexStatus::Reinitialized))
        }
    }
}

fn ensure_email_tables(db: &mut Database) -> CoreResult<()> {
    for (name, spec) in [(CONTACTS_TABLE, CONTACTS_SCHEMA), (PRESETS_TABLE, PRESETS_SCHEMA)] {
        db.ensure_table(name, Schema::parse(spec)?)?;
    }
    Ok(())
}
