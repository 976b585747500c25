//! The Haystack JSON encoding through serde.
//!
//! Run with: cargo run --example json

use haystack_zinc::{dict, read_grid, Grid, Number, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let point = dict! {
        "point",
        "his",
        "dis": "Zone Temp",
        "curVal": Number::with_unit(72.4, "°F")?,
        "kind": "Number",
    };

    let json = serde_json::to_string_pretty(&point)?;
    println!("Dict as JSON:\n{}\n", json);

    let back: Value = serde_json::from_str(&json)?;
    assert_eq!(back, Value::from(point));

    let grid = read_grid("ver:\"3.0\"\nts,val\n2012-04-23T00:15:00-04:00 New_York,72.2°F\n")?;
    let json = serde_json::to_string_pretty(&grid)?;
    println!("Grid as JSON:\n{}", json);

    let grid_back: Grid = serde_json::from_str(&json)?;
    assert_eq!(grid_back, grid);
    println!("✓ Round-trip successful");

    Ok(())
}
