//! # DeckMap Testkit
//!
//! Test utilities for DeckMap.
//!
//! This crate provides:
//! - Temporary workspaces and sample tables
//! - Property-based test generators using proptest
//! - Fuzz targets for the table codecs and the schema parser
//!
//! Cross-crate integration tests live in `tests/`.
//!
//! ## Usage
//!
//! ```
//! use deckmap_testkit::prelude::*;
//!
//! let ws = TempWorkspace::new();
//! ws.write_image("Deck1.bmp");
//! let workspace = ws.open();
//! assert!(workspace.deck_enabled(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
