//! Building a grid, writing it as Zinc and reading it back.
//!
//! Run with: cargo run --example grid

use haystack_zinc::{dict, grid_to_string, read_grid, Dict, GridBuilder, Number, Ref};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let sites = vec![
        dict! {
            "id": Ref::with_dis("hq", "Headquarters")?,
            "site",
            "area": Number::with_unit(140_000.0, "ft²")?,
        },
        dict! {
            "id": Ref::with_dis("annex", "Annex")?,
            "site",
        },
    ];

    let grid = GridBuilder::dicts_to_grid(dict! { "dis": "Sites" }, &sites)?;
    let zinc = grid_to_string(&grid)?;
    println!("Zinc output:\n{}", zinc);

    let back = read_grid(&zinc)?;
    assert_eq!(back, grid);

    for row in back.rows() {
        let entity: Dict = row.to_dict();
        let area = row
            .get("area")
            .and_then(|v| v.as_number())
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<14} area {}", entity.dis().unwrap_or("?"), area);
    }

    // The second site has no area
    assert!(back.row(1).and_then(|r| r.get("area")).is_none());
    println!("✓ Round-trip successful");

    Ok(())
}
