//! Reading and writing single Zinc values.
//!
//! Run with: cargo run --example simple

use haystack_zinc::{read_value, to_string, Date, Number, Ref, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let values = vec![
        Value::MARKER,
        Value::from(Number::with_unit(72.5, "°F")?),
        Value::from("Main Lobby"),
        Value::from(Ref::with_dis("p:demo:r:1", "Demo Site")?),
        Value::from(Date::new(2011, 6, 7)?),
        Value::from(vec![Value::from(1), Value::from(2), Value::from(3)]),
    ];

    for value in &values {
        // Write to Zinc
        let zinc = to_string(value)?;
        println!("{:<10} {}", value.kind(), zinc);

        // Read it back
        let back = read_value(&zinc)?;
        assert_eq!(back.as_ref(), Some(value));
    }
    println!("✓ Round-trip successful");

    // N is the null literal
    assert_eq!(read_value("N")?, None);

    Ok(())
}
