//! Benchmark utilities.

#![warn(missing_docs)]

use deckmap_codec::{Schema, Table, Value};
use rand::Rng;
use std::fs;
use std::path::Path;

/// Schema of generated location tables.
pub const LOCATION_SCHEMA: &str = "MAC:string,Deck:string,X:double,Y:double,Time:int,Valid:bool";

/// Generates `count` distinct MAC addresses.
pub fn generate_macs(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let b = (i as u64).to_be_bytes();
            format!("02:00:{:02x}:{:02x}:{:02x}:{:02x}", b[4], b[5], b[6], b[7])
        })
        .collect()
}

/// Generates a location table with `rows` random sightings spread over
/// `macs` devices and `decks` decks.
pub fn random_location_table(name: &str, rows: usize, macs: &[String], decks: u32) -> Table {
    let mut rng = rand::thread_rng();
    let schema = Schema::parse(LOCATION_SCHEMA).expect("Invalid location schema");
    let mut table = Table::new(name, schema);
    for i in 0..rows {
        let mac = &macs[rng.gen_range(0..macs.len())];
        table
            .add_row(vec![
                Value::from(mac.as_str()),
                Value::from(format!("Deck{}", rng.gen_range(1..=decks))),
                Value::from(rng.gen_range(0.0..500.0)),
                Value::from(rng.gen_range(0.0..120.0)),
                Value::Int(1_700_000_000 + i as i64),
                Value::from(rng.gen_bool(0.95)),
            ])
            .expect("Generated row must conform");
    }
    table
}

/// Writes `count` files of `size` random bytes into `dir`, spread over a
/// few subfolders.
pub fn write_random_files(dir: &Path, count: usize, size: usize) {
    let mut rng = rand::thread_rng();
    for i in 0..count {
        let sub = dir.join(format!("batch{}", i % 4));
        fs::create_dir_all(&sub).expect("Failed to create folder");
        let data: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        fs::write(sub.join(format!("scan{i}.csv")), data).expect("Failed to write file");
    }
}
