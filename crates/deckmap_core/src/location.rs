//! Device position queries over location tables.
//!
//! A location table has at least these fields:
//!
//! | Field  | Type   | Meaning                      |
//! |--------|--------|------------------------------|
//! | `MAC`  | string | Device hardware address      |
//! | `Deck` | string | `Deck<N>`                    |
//! | `X`    | double | Horizontal position on deck  |
//! | `Y`    | double | Vertical position on deck    |

use crate::error::CoreResult;
use deckmap_codec::Table;
use serde::Serialize;

/// Field holding the device address.
pub const MAC_FIELD: &str = "MAC";
/// Field holding the deck label.
pub const DECK_FIELD: &str = "Deck";
/// Field holding the x coordinate.
pub const X_FIELD: &str = "X";
/// Field holding the y coordinate.
pub const Y_FIELD: &str = "Y";

/// Selects the positions of one device on one deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    /// Device address, compared exactly.
    pub mac: String,
    /// Deck number.
    pub deck: u32,
}

impl LocationQuery {
    /// Creates a query.
    pub fn new(mac: impl Into<String>, deck: u32) -> Self {
        Self {
            mac: mac.into(),
            deck,
        }
    }

    /// Returns the value the `Deck` field must hold, e.g. `Deck3`.
    #[must_use]
    pub fn deck_label(&self) -> String {
        format!("Deck{}", self.deck)
    }
}

/// A position on a deck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Collects the positions matching `query` from every table, in table
/// order and then row order.
///
/// # Errors
///
/// Returns an error if a table lacks one of the location fields or holds
/// it with a different type.
pub fn collect_points<'a, I>(tables: I, query: &LocationQuery) -> CoreResult<Vec<Point>>
where
    I: IntoIterator<Item = &'a Table>,
{
    let deck = query.deck_label();
    let mut points = Vec::new();

    for table in tables {
        for record in table.get_records(MAC_FIELD, query.mac.as_str())? {
            if record.get_value::<String>(DECK_FIELD)? != deck {
                continue;
            }
            points.push(Point {
                x: record.get_value(X_FIELD)?,
                y: record.get_value(Y_FIELD)?,
            });
        }
    }

    Ok(points)
}
