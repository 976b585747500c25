//! # haystack-zinc
//!
//! The Project Haystack value model and the Zinc text format.
//!
//! ## What is Haystack?
//!
//! Haystack is a tagging convention for building automation and IoT data.
//! Entities are dictionaries of tags (`site`, `dis:"HQ"`, `area:1200ft²`),
//! and collections of entities travel as grids: a table with grid-level meta,
//! named columns with their own meta, and rows of optional cells.
//!
//! Zinc is the compact, CSV-like text encoding of those grids. A grid looks
//! like this:
//!
//! ```text
//! ver:"3.0" database:"test"
//! id,dis,area unit:"ft²"
//! @a,"Alpha",1200ft²
//! @b,"Beta",
//! ```
//!
//! ## Key Features
//!
//! - **Closed Value Model**: one [`Value`] enum covering every Haystack kind,
//!   with content equality and a total order
//! - **Immutable Collections**: [`Dict`], [`Grid`] and [`List`] share storage
//!   through `Arc` and are `Send + Sync`
//! - **Builders**: [`DictBuilder`] and [`GridBuilder`] freeze into immutable values
//! - **Lossless Zinc**: whatever [`ZincWriter`] writes, [`ZincReader`] reads back
//!   to an equal value, including nested lists, dicts and grids
//! - **Both Versions**: reads Zinc 2.0 and 3.0, writes either via [`ZincOptions`]
//! - **JSON**: serde `Serialize`/`Deserialize` using the Haystack JSON encoding
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! haystack-zinc = "0.1"
//! ```
//!
//! ### Reading a Grid
//!
//! ```rust
//! use haystack_zinc::read_grid;
//!
//! let grid = read_grid("ver:\"3.0\"\nid,dis,area\n@a,\"Alpha\",1200\n@b,\"Beta\",\n").unwrap();
//!
//! assert_eq!(grid.num_rows(), 2);
//! let beta = grid.row(1).unwrap();
//! assert_eq!(beta.get("dis").and_then(|v| v.as_str()), Some("Beta"));
//! assert!(beta.get("area").is_none());
//! ```
//!
//! ### Writing Values
//!
//! ```rust
//! use haystack_zinc::{to_string, Number, Value};
//!
//! let speed = Value::from(Number::with_unit(123.4, "m/s").unwrap());
//! assert_eq!(to_string(&speed).unwrap(), "123.4m/s");
//! ```
//!
//! ### Building Grids
//!
//! ```rust
//! use haystack_zinc::{dict, grid_to_string, GridBuilder, Dict};
//!
//! let sites = [
//!     dict! { "site", "dis": "HQ" },
//!     dict! { "site", "dis": "Annex", "area": 800 },
//! ];
//! let grid = GridBuilder::dicts_to_grid(Dict::empty(), &sites).unwrap();
//!
//! assert_eq!(
//!     grid_to_string(&grid).unwrap(),
//!     "ver:\"3.0\"\nsite,dis,area\nM,\"HQ\",\nM,\"Annex\",800\n"
//! );
//! ```
//!
//! ## Format Notes
//!
//! - Keywords: `N` (null), `M` marker, `R` remove, `NA`, `T`/`F`,
//!   `NaN`, `INF`, `-INF`
//! - Numbers carry an optional unit suffix: `72.5°F`, `2.4e-3fl_oz`, `0xff`
//! - Dates `2011-06-07`, times `09:51:27.354`,
//!   date-times `2011-06-07T09:51:27-04:00 New_York`
//! - Refs `@id "Display"`, URIs `` `http://a/b` ``, symbols `^elec-meter`
//! - Coordinates `C(37.55,-77.45)`, extended strings `Span("today")`
//! - A leading absent cell in a row is written `N`; later ones are left empty
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Malformed input is reported through [`Error`], never by panicking
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - reading and writing single values
//! - **`grid.rs`** - building, writing and reading grids
//! - **`json.rs`** - the Haystack JSON encoding
//! - **`versions.rs`** - Zinc 2.0 and 3.0 output
//!
//! Run any example with: `cargo run --example <name>`

#[macro_use]
mod macros;

pub mod dict;
pub mod error;
pub mod grid;
pub mod json;
pub mod options;
pub mod reader;
pub mod scalar;
pub mod temporal;
pub mod tokenizer;
pub mod value;
pub mod writer;

pub use dict::{Dict, DictBuilder};
pub use error::{Error, Result};
pub use grid::{Col, Grid, GridBuilder, Row};
pub use options::{Version, ZincOptions};
pub use reader::ZincReader;
pub use scalar::{Bin, Coord, Ref, Symbol, XStr};
pub use temporal::{Date, DateTime, Time};
pub use value::{List, Number, Value};
pub use writer::ZincWriter;

use std::io;

/// Reads a single Zinc value.
///
/// Returns `None` for the null keyword `N`. Text starting with `ver:` is
/// read as a grid.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::{read_value, Date, Value};
///
/// let v = read_value("2011-06-07").unwrap();
/// assert_eq!(v, Some(Value::from(Date::new(2011, 6, 7).unwrap())));
/// ```
///
/// # Errors
///
/// Returns an error if the text is not a single well-formed value. Error
/// messages include the line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_value(s: &str) -> Result<Option<Value>> {
    ZincReader::from_str(s).read_value()
}

/// Reads a dict written in braces, `{dis:"HQ" site}`.
///
/// # Errors
///
/// Returns an error if the text is not a single well-formed dict.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_dict(s: &str) -> Result<Dict> {
    ZincReader::from_str(s).read_dict()
}

/// Reads a single grid.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::read_grid;
///
/// let grid = read_grid("ver:\"3.0\"\nempty\n").unwrap();
/// assert!(grid.is_empty());
/// ```
///
/// # Errors
///
/// Returns an error if the text is not a single well-formed grid or declares
/// a version other than 2.0 or 3.0.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_grid(s: &str) -> Result<Grid> {
    ZincReader::from_str(s).read_grid()
}

/// Reads every grid in the text until the end of input.
///
/// # Errors
///
/// Returns an error if any grid is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_grids(s: &str) -> Result<Vec<Grid>> {
    ZincReader::from_str(s).read_grids()
}

/// Reads a single grid from an I/O stream of Zinc.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::grid_from_reader;
/// use std::io::Cursor;
///
/// let grid = grid_from_reader(Cursor::new(b"ver:\"3.0\"\na\n1\n")).unwrap();
/// assert_eq!(grid.num_rows(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the bytes are not UTF-8 or the text
/// is not a well-formed grid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grid_from_reader<R>(reader: R) -> Result<Grid>
where
    R: io::Read,
{
    read_grid(&read_all(reader)?)
}

/// Reads every grid from an I/O stream of Zinc.
///
/// # Errors
///
/// Returns an error if reading fails or any grid is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grids_from_reader<R>(reader: R) -> Result<Vec<Grid>>
where
    R: io::Read,
{
    read_grids(&read_all(reader)?)
}

fn read_all<R: io::Read>(mut reader: R) -> Result<String> {
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(string)
}

/// Encodes a value as Zinc text.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::{to_string, Ref, Value};
///
/// let r = Value::from(Ref::with_dis("a-1", "Main").unwrap());
/// assert_eq!(to_string(&r).unwrap(), "@a-1 \"Main\"");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded, for example a dict with
/// an invalid tag name or a URI holding control characters.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, ZincOptions::default())
}

/// Encodes a value as Zinc text with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded, including extended
/// strings under Zinc 2.0.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(value: &Value, options: ZincOptions) -> Result<String> {
    let mut writer = ZincWriter::new(options);
    writer.write_value(value)?;
    Ok(writer.into_inner())
}

/// Encodes a grid as Zinc text.
///
/// # Errors
///
/// Returns an error if any meta tag or cell cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grid_to_string(grid: &Grid) -> Result<String> {
    grid_to_string_with_options(grid, ZincOptions::default())
}

/// Encodes a grid as Zinc text with custom options.
///
/// # Errors
///
/// Returns an error if any meta tag or cell cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grid_to_string_with_options(grid: &Grid, options: ZincOptions) -> Result<String> {
    let mut writer = ZincWriter::new(options);
    writer.write_grid(grid)?;
    Ok(writer.into_inner())
}

/// Encodes grids as Zinc text separated by blank lines.
///
/// # Errors
///
/// Returns an error if any grid cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grids_to_string(grids: &[Grid]) -> Result<String> {
    let mut writer = ZincWriter::default();
    writer.write_grids(grids)?;
    Ok(writer.into_inner())
}

/// Writes a value as Zinc to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::{to_writer, Value};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Value::MARKER).unwrap();
/// assert_eq!(buffer, b"M");
/// ```
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, value: &Value) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, value, ZincOptions::default())
}

/// Writes a value as Zinc to an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W>(mut writer: W, value: &Value, options: ZincOptions) -> Result<()>
where
    W: io::Write,
{
    let zinc = to_string_with_options(value, options)?;
    writer
        .write_all(zinc.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Writes a grid as Zinc to an I/O stream.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn grid_to_writer<W>(mut writer: W, grid: &Grid) -> Result<()>
where
    W: io::Write,
{
    let zinc = grid_to_string(grid)?;
    writer
        .write_all(zinc.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}
