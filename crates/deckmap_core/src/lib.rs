//! # DeckMap Core
//!
//! Table database, file indices and workspace bootstrap for DeckMap.
//!
//! This crate provides:
//! - [`Database`], a set of named tables persisted through a codec
//! - [`DataIndex`] and [`ImageIndex`], persistent indices of the raw data
//!   files and deck images
//! - [`Workspace`], which prepares the folders, indices and e-mail tables
//!   at start-up
//! - [`collect_points`], the device position query behind the deck map
//!
//! ## Usage
//!
//! ```no_run
//! use deckmap_core::{Config, Workspace};
//!
//! let workspace = Workspace::open(Config::new("/srv/deckmap")).unwrap();
//! for deck in workspace.image_index().available_decks() {
//!     println!("deck {deck} has a floorplan");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod dir;
mod error;
pub mod index;
mod location;
mod workspace;

pub use config::Config;
pub use database::Database;
pub use dir::prepare_folders;
pub use error::{CoreError, CoreResult, TableSaveFailure};
pub use index::{DataIndex, FileIndex, ImageIndex, IndexEntry, VerifyReport};
pub use location::{collect_points, LocationQuery, Point, DECK_FIELD, MAC_FIELD, X_FIELD, Y_FIELD};
pub use workspace::{
    IndexStatus, StartupReport, Workspace, CONTACTS_SCHEMA, CONTACTS_TABLE, PRESETS_SCHEMA,
    PRESETS_TABLE,
};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export the types every caller of this crate needs.
pub use deckmap_codec::{CodecKind, Schema, Table};
