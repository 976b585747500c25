//! Writing Zinc 2.0 and 3.0 with ZincOptions.
//!
//! Run with: cargo run --example versions

use haystack_zinc::{
    grid_to_string_with_options, read_grid, Bin, GridBuilder, Value, Version, XStr, ZincOptions,
    ZincReader,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut b = GridBuilder::new();
    b.add_col("file")?;
    b.add_row(vec![Some(Value::from(Bin::new("image/svg+xml")?))])?;
    let grid = b.build()?;

    // Default is 3.0
    let v3 = grid_to_string_with_options(&grid, ZincOptions::new())?;
    println!("Zinc 3.0:\n{}", v3);

    let v2 = grid_to_string_with_options(&grid, ZincOptions::new().with_version(Version::V2))?;
    println!("Zinc 2.0:\n{}", v2);

    // Both read back to the same grid
    assert_eq!(read_grid(&v3)?, grid);
    assert_eq!(read_grid(&v2)?, grid);

    let mut reader = ZincReader::from_str(&v2);
    reader.read_grid()?;
    println!("Declared version: {}", reader.version());

    // Older 2.0 producers leave the mime type unquoted
    let legacy = read_grid("ver:\"2.0\"\nfile\nBin(text/plain; charset=utf-8)\n")?;
    println!("Legacy Bin: {:?}", legacy.row(0).and_then(|r| r.get("file").cloned()));

    // XStr needs 3.0
    let mut b = GridBuilder::new();
    b.add_col("span")?;
    b.add_row(vec![Some(Value::from(XStr::new("Span", "today")?))])?;
    let spans = b.build()?;
    match grid_to_string_with_options(&spans, ZincOptions::v2()) {
        Ok(_) => println!("unexpected 2.0 output"),
        Err(e) => println!("Zinc 2.0 error: {}", e),
    }

    Ok(())
}
