//! Two-dimensional tables of values.
//!
//! A [`Grid`] has grid-level meta, ordered columns (each with its own meta)
//! and ordered rows holding one optional cell per column. Grids are built
//! with [`GridBuilder`] and are immutable afterwards; rows are read through
//! borrowed [`Row`] views that resolve cells by column name.
//!
//! ## Examples
//!
//! ```rust
//! use haystack_zinc::{GridBuilder, Ref, Value};
//!
//! let mut b = GridBuilder::new();
//! b.add_col("id").unwrap();
//! b.add_col("area").unwrap().add_str("unit", "ft²");
//! b.add_row(vec![Some(Ref::new("a").unwrap().into()), Some(Value::from(1200))]).unwrap();
//! b.add_row(vec![Some(Ref::new("b").unwrap().into()), None]).unwrap();
//! let grid = b.build().unwrap();
//!
//! assert_eq!(grid.num_rows(), 2);
//! assert_eq!(grid.row(0).unwrap().get("area"), Some(&Value::from(1200)));
//! assert_eq!(grid.row(1).unwrap().get("area"), None);
//! assert_eq!(grid.col("area").unwrap().meta().get_str("unit"), Some("ft²"));
//! ```

use crate::{Dict, DictBuilder, Error, Result, Value};
use lazy_static::lazy_static;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref EMPTY: Grid = Grid::from_parts(
        Dict::empty(),
        vec![Col::new(0, "empty".to_string(), Dict::empty())],
        Vec::new(),
    );
}

/// A grid column: its position, name and meta.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Col {
    index: usize,
    name: String,
    meta: Dict,
}

impl Col {
    fn new(index: usize, name: String, meta: Dict) -> Self {
        Col { index, name, meta }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    /// The `dis` tag of the column meta, else the column name.
    #[must_use]
    pub fn dis(&self) -> &str {
        self.meta.get_str("dis").unwrap_or(&self.name)
    }
}

#[derive(Debug)]
struct GridData {
    meta: Dict,
    cols: Vec<Col>,
    by_name: HashMap<String, usize>,
    rows: Vec<Vec<Option<Value>>>,
}

/// An immutable table of values. Clones share storage.
#[derive(Debug, Clone)]
pub struct Grid(Arc<GridData>);

impl Grid {
    fn from_parts(meta: Dict, cols: Vec<Col>, rows: Vec<Vec<Option<Value>>>) -> Self {
        let by_name = cols.iter().map(|c| (c.name.clone(), c.index)).collect();
        Grid(Arc::new(GridData {
            meta,
            cols,
            by_name,
            rows,
        }))
    }

    /// The shared empty grid: a single `empty` column and no rows.
    #[must_use]
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Creates a conventional error grid: `err` marker, `dis` message and
    /// an optional `errTrace` in the meta.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{Error, Grid};
    ///
    /// let grid = Grid::err("point not found", None);
    /// assert!(grid.is_err());
    /// assert!(matches!(grid.check_err(), Err(Error::ErrGrid { .. })));
    /// ```
    #[must_use]
    pub fn err(dis: &str, trace: Option<&str>) -> Self {
        let mut meta = DictBuilder::new();
        meta.add_marker("err").add_str("dis", dis);
        if let Some(trace) = trace {
            meta.add_str("errTrace", trace);
        }
        Grid::from_parts(
            meta.build(),
            vec![Col::new(0, "empty".to_string(), Dict::empty())],
            Vec::new(),
        )
    }

    #[must_use]
    pub fn meta(&self) -> &Dict {
        &self.0.meta
    }

    #[must_use]
    pub fn cols(&self) -> &[Col] {
        &self.0.cols
    }

    #[must_use]
    pub fn col(&self, name: &str) -> Option<&Col> {
        self.0.by_name.get(name).map(|&i| &self.0.cols[i])
    }

    pub fn col_checked(&self, name: &str) -> Result<&Col> {
        self.col(name).ok_or_else(|| Error::unknown_name(name))
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.0.cols.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.0.rows.len()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.num_rows()).then_some(Row { grid: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.num_rows()).map(move |index| Row { grid: self, index })
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.rows.is_empty()
    }

    /// Returns `true` if the meta carries the `err` tag.
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.0.meta.has("err")
    }

    /// Converts an error grid into [`Error::ErrGrid`]; other grids pass
    /// through.
    pub fn check_err(&self) -> Result<&Self> {
        if !self.is_err() {
            return Ok(self);
        }
        let dis = self.0.meta.get_str("dis").unwrap_or("server side error");
        debug!(dis, "error grid");
        Err(Error::ErrGrid {
            dis: dis.to_string(),
            trace: self.0.meta.get_str("errTrace").map(str::to_string),
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.meta == other.0.meta
                && self.0.cols == other.0.cols
                && self.0.rows == other.0.rows)
    }
}

impl Eq for Grid {}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.meta.hash(state);
        self.0.cols.hash(state);
        self.0.rows.hash(state);
    }
}

impl PartialOrd for Grid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Grid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .meta
            .cmp(&other.0.meta)
            .then_with(|| self.0.cols.cmp(&other.0.cols))
            .then_with(|| self.0.rows.cmp(&other.0.rows))
    }
}

/// A borrowed view of one grid row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    grid: &'a Grid,
    index: usize,
}

impl<'a> Row<'a> {
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// All cells of this row, one per column.
    #[must_use]
    pub fn cells(&self) -> &'a [Option<Value>] {
        &self.grid.0.rows[self.index]
    }

    /// The cell at a column position; `None` if absent or out of range.
    #[must_use]
    pub fn cell(&self, col: usize) -> Option<&'a Value> {
        self.cells().get(col).and_then(Option::as_ref)
    }

    /// The cell under a named column; `None` if the column is unknown or
    /// the cell is absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let col = *self.grid.0.by_name.get(name)?;
        self.cell(col)
    }

    /// Like [`get`](Row::get) but fails with [`Error::UnknownName`].
    pub fn get_checked(&self, name: &str) -> Result<&'a Value> {
        self.get(name).ok_or_else(|| Error::unknown_name(name))
    }

    /// Iterates over the present cells as `(column name, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let cols = self.grid.cols();
        cols.iter()
            .zip(self.cells())
            .filter_map(|(col, cell)| cell.as_ref().map(|v| (col.name(), v)))
    }

    /// Copies the present cells into a dict.
    #[must_use]
    pub fn to_dict(&self) -> Dict {
        self.iter().map(|(name, v)| (name, v.clone())).collect()
    }
}

/// Mutable accumulator for a [`Grid`].
///
/// Columns must all be added before the first row.
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    meta: DictBuilder,
    cols: Vec<(String, DictBuilder)>,
    rows: Vec<Vec<Option<Value>>>,
}

impl GridBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid-level meta.
    pub fn meta(&mut self) -> &mut DictBuilder {
        &mut self.meta
    }

    /// Adds a column and returns its meta builder.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] once a row has been added, and
    /// [`Error::InvalidValue`] if `name` is not a valid tag name.
    pub fn add_col(&mut self, name: impl Into<String>) -> Result<&mut DictBuilder> {
        let name = name.into();
        if !self.rows.is_empty() {
            return Err(Error::illegal_state(format!(
                "cannot add column '{}' after rows",
                name
            )));
        }
        if !Dict::is_tag_name(&name) {
            return Err(Error::invalid("column", format!("invalid column name '{}'", name)));
        }
        self.cols.push((name, DictBuilder::new()));
        let last = self.cols.len() - 1;
        Ok(&mut self.cols[last].1)
    }

    /// Adds a row of cells, one per column.
    pub fn add_row(&mut self, cells: Vec<Option<Value>>) -> Result<&mut Self> {
        if cells.len() != self.cols.len() {
            return Err(Error::invalid(
                "row",
                format!("row has {} cells but grid has {} columns", cells.len(), self.cols.len()),
            ));
        }
        self.rows.push(cells);
        Ok(self)
    }

    /// Adds a row whose cells are looked up by column name in `dict`.
    /// Every tag of the dict must have a column.
    pub fn add_dict_row(&mut self, dict: &Dict) -> Result<&mut Self> {
        if let Some(name) = dict.keys().find(|k| !self.cols.iter().any(|(c, _)| c.as_str() == *k)) {
            return Err(Error::invalid("row", format!("no column for tag '{}'", name)));
        }
        let cells = self.cols.iter().map(|(c, _)| dict.get(c).cloned()).collect();
        self.add_row(cells)
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Freezes the builder.
    ///
    /// # Errors
    ///
    /// Fails if no columns were added or a column name repeats.
    pub fn build(self) -> Result<Grid> {
        if self.cols.is_empty() {
            return Err(Error::invalid("grid", "grid has no columns"));
        }
        let mut cols: Vec<Col> = Vec::with_capacity(self.cols.len());
        for (index, (name, meta)) in self.cols.into_iter().enumerate() {
            if cols.iter().any(|c| c.name == name) {
                return Err(Error::invalid("column", format!("duplicate column name '{}'", name)));
            }
            cols.push(Col::new(index, name, meta.build()));
        }
        Ok(Grid::from_parts(self.meta.build(), cols, self.rows))
    }

    /// Builds a grid from dicts, with one column per distinct tag name in
    /// first-seen order. Without any tags the grid gets a single `empty`
    /// column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{dict, Dict, GridBuilder};
    ///
    /// let a = dict! { "id": 1, "site" };
    /// let b = dict! { "id": 2, "area": 3.5 };
    /// let grid = GridBuilder::dicts_to_grid(Dict::empty(), &[a, b]).unwrap();
    ///
    /// let names: Vec<_> = grid.cols().iter().map(|c| c.name()).collect();
    /// assert_eq!(names, vec!["id", "site", "area"]);
    /// assert_eq!(grid.row(1).unwrap().get("site"), None);
    /// ```
    pub fn dicts_to_grid(meta: Dict, dicts: &[Dict]) -> Result<Grid> {
        let mut b = GridBuilder::new();
        b.meta().add_all(&meta);
        let mut names: Vec<&str> = Vec::new();
        for dict in dicts {
            for name in dict.keys() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        if names.is_empty() {
            b.add_col("empty")?;
        }
        for name in &names {
            b.add_col(*name)?;
        }
        for dict in dicts {
            b.add_dict_row(dict)?;
        }
        b.build()
    }
}
