//! Zinc writer.
//!
//! This module provides [`ZincWriter`], which encodes values and grids as
//! Zinc text that [`ZincReader`](crate::ZincReader) reads back to equal
//! values.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use haystack_zinc::{grid_to_string, GridBuilder, Value};
//!
//! let mut b = GridBuilder::new();
//! b.add_col("a").unwrap();
//! b.add_col("b").unwrap();
//! b.add_row(vec![None, Some(Value::from(1))]).unwrap();
//! b.add_row(vec![Some(Value::from(2)), None]).unwrap();
//!
//! let zinc = grid_to_string(&b.build().unwrap()).unwrap();
//! assert_eq!(zinc, "ver:\"3.0\"\na,b\nN,1\n2,\n");
//! ```
//!
//! ## Direct Writer Usage
//!
//! ```rust
//! use haystack_zinc::{Value, ZincOptions, ZincWriter};
//!
//! let mut writer = ZincWriter::new(ZincOptions::new());
//! writer.write_value(&Value::from(vec![Value::MARKER, Value::from("x")])).unwrap();
//! assert_eq!(writer.into_inner(), "[M,\"x\"]");
//! ```

use crate::{Dict, Error, Grid, Number, Result, Value, Version, ZincOptions};

/// The Zinc writer.
///
/// Output accumulates in memory; take it with [`into_inner`](ZincWriter::into_inner).
pub struct ZincWriter {
    output: String,
    options: ZincOptions,
}

impl ZincWriter {
    pub fn new(options: ZincOptions) -> Self {
        ZincWriter {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    pub fn write_value(&mut self, val: &Value) -> Result<()> {
        match val {
            Value::Marker => self.output.push('M'),
            Value::Remove => self.output.push('R'),
            Value::Na => self.output.push_str("NA"),
            Value::Bool(b) => self.output.push(if *b { 'T' } else { 'F' }),
            Value::Num(n) => self.write_number(n)?,
            Value::Str(s) => write_str_literal(&mut self.output, s),
            Value::Uri(s) => self.write_uri(s)?,
            Value::Ref(r) => self.output.push_str(&r.to_string()),
            Value::Date(d) => self.output.push_str(&d.to_string()),
            Value::Time(t) => self.output.push_str(&t.to_string()),
            Value::DateTime(ts) => self.output.push_str(&ts.to_string()),
            Value::Coord(c) => self.output.push_str(&c.to_string()),
            Value::Bin(b) => self.output.push_str(&b.to_string()),
            Value::XStr(x) => {
                if self.options.version == Version::V2 {
                    return Err(Error::encode(
                        "xstr",
                        format!("{} requires zinc 3.0", x.type_name()),
                    ));
                }
                self.output.push_str(&x.to_string());
            }
            Value::Symbol(s) => self.output.push_str(&s.to_string()),
            Value::List(list) => {
                self.output.push('[');
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        self.output.push(',');
                    }
                    self.write_value(item)?;
                }
                self.output.push(']');
            }
            Value::Dict(d) => self.write_dict(d)?,
            Value::Grid(g) => {
                self.output.push_str("<<\n");
                self.write_grid(g)?;
                self.output.push_str(">>");
            }
        }
        Ok(())
    }

    /// Writes a value, or `N` for `None`.
    pub fn write_nullable(&mut self, val: Option<&Value>) -> Result<()> {
        match val {
            Some(val) => self.write_value(val),
            None => {
                self.output.push('N');
                Ok(())
            }
        }
    }

    /// Writes a dict in braces.
    pub fn write_dict(&mut self, dict: &Dict) -> Result<()> {
        self.output.push('{');
        for (i, (name, val)) in dict.iter().enumerate() {
            if i > 0 {
                self.output.push(' ');
            }
            self.write_pair(name, val)?;
        }
        self.output.push('}');
        Ok(())
    }

    /// Writes a grid: header line, column line and one line per row.
    pub fn write_grid(&mut self, grid: &Grid) -> Result<()> {
        self.output.push_str("ver:\"");
        self.output.push_str(self.options.version.as_str());
        self.output.push('"');
        self.write_meta(grid.meta())?;
        self.output.push('\n');

        for (i, col) in grid.cols().iter().enumerate() {
            if i > 0 {
                self.output.push(',');
            }
            self.output.push_str(col.name());
            self.write_meta(col.meta())?;
        }
        self.output.push('\n');

        for row in grid.rows() {
            for (i, cell) in row.cells().iter().enumerate() {
                if i > 0 {
                    self.output.push(',');
                }
                match cell {
                    Some(val) => self.write_value(val)?,
                    // only a leading absent cell is spelled out
                    None if i == 0 => self.output.push('N'),
                    None => {}
                }
            }
            self.output.push('\n');
        }
        Ok(())
    }

    /// Writes grids separated by blank lines.
    pub fn write_grids(&mut self, grids: &[Grid]) -> Result<()> {
        for (i, grid) in grids.iter().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            self.write_grid(grid)?;
        }
        Ok(())
    }

    fn write_meta(&mut self, meta: &Dict) -> Result<()> {
        for (name, val) in meta.iter() {
            self.output.push(' ');
            self.write_pair(name, val)?;
        }
        Ok(())
    }

    fn write_pair(&mut self, name: &str, val: &Value) -> Result<()> {
        if !Dict::is_tag_name(name) {
            return Err(Error::encode("tag", format!("invalid tag name '{}'", name)));
        }
        self.output.push_str(name);
        if !val.is_marker() {
            self.output.push(':');
            self.write_value(val)?;
        }
        Ok(())
    }

    fn write_number(&mut self, n: &Number) -> Result<()> {
        if let Some(unit) = n.unit() {
            if n.is_finite() && !Number::is_unit(unit) {
                return Err(Error::encode("number", format!("invalid unit '{}'", unit)));
            }
        }
        self.output.push_str(&n.to_string());
        Ok(())
    }

    fn write_uri(&mut self, s: &str) -> Result<()> {
        self.output.push('`');
        for ch in s.chars() {
            match ch {
                '`' => self.output.push_str("\\`"),
                c if c < ' ' => {
                    return Err(Error::encode(
                        "uri",
                        format!("control character {:?} in uri", c),
                    ))
                }
                c => self.output.push(c),
            }
        }
        self.output.push('`');
        Ok(())
    }
}

impl Default for ZincWriter {
    fn default() -> Self {
        Self::new(ZincOptions::default())
    }
}

/// Appends `s` as a quoted Zinc string.
pub(crate) fn write_str_literal(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c < ' ' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
