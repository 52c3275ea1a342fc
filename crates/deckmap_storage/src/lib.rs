//! # DeckMap Storage
//!
//! Named blob stores backing DeckMap tables.
//!
//! A storage backend is an **opaque store of named byte blobs**. It does not
//! interpret the bytes it holds: table codecs own the file formats, the
//! database owns the naming scheme (`<table>.<ext>`).
//!
//! ## Design Principles
//!
//! - Backends read and replace whole blobs; there are no partial writes
//! - Replacing a blob is atomic: a reader sees the old bytes or the new ones
//! - Backends must be `Send + Sync` so a database can move to a worker thread
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral databases
//! - [`FileBackend`] - One file per blob inside a directory
//!
//! ## Example
//!
//! ```rust
//! use deckmap_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.write("Contacts.csv", b"Name:string\n").unwrap();
//! let data = backend.read("Contacts.csv").unwrap();
//! assert_eq!(data.as_deref(), Some(&b"Name:string\n"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_name, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::{write_atomic, FileBackend};
pub use memory::InMemoryBackend;
