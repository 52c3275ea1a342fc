//! Points command implementation.

use deckmap_core::{collect_points, Config, LocationQuery, Workspace};
use tracing::warn;

/// Runs the points command.
pub fn run(
    config: Config,
    mac: &str,
    deck: u32,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open(config)?;
    if !workspace.deck_enabled(deck) {
        warn!(deck, "deck has no floorplan image");
    }

    let mut db = workspace.open_location_database()?;
    let tables = workspace.location_tables(&mut db)?;
    let query = LocationQuery::new(mac, deck);
    let points = collect_points(tables, &query)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&points)?),
        _ => {
            for p in &points {
                println!("{}\t{}", p.x, p.y);
            }
            println!("({} points for {mac} on {})", points.len(), query.deck_label());
        }
    }

    Ok(())
}
