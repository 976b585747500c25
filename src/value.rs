//! Dynamic value representation for Haystack data.
//!
//! This module provides the [`Value`] enum, the closed set of every value a
//! Haystack tag can hold, along with [`Number`] and [`List`].
//!
//! ## Core Types
//!
//! - [`Value`]: an enum over all scalar and collection kinds
//! - [`Number`]: a 64-bit float with an optional unit
//! - [`List`]: an immutable, cheaply cloned sequence of values
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use haystack_zinc::{Number, Value};
//!
//! let marker = Value::MARKER;
//! let flag = Value::from(true);
//! let area = Value::from(Number::with_unit(1200.0, "ft²").unwrap());
//! let dis = Value::from("Main Building");
//!
//! assert!(marker.is_marker());
//! assert_eq!(flag, Value::TRUE);
//! assert_eq!(area.as_number().and_then(Number::unit), Some("ft²"));
//! assert_eq!(dis.as_str(), Some("Main Building"));
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use haystack_zinc::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(72.5);
//! let num = f64::try_from(value).unwrap();
//! assert_eq!(num, 72.5);
//!
//! assert!(bool::try_from(Value::MARKER).is_err());
//! ```

use crate::{Bin, Coord, Date, DateTime, Dict, Error, Grid, Ref, Result, Symbol, Time, XStr};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Any Haystack value.
///
/// Equality and hashing are structural. The derived order ranks values by
/// variant first (in declaration order), then by payload, which gives a
/// total order suitable for sorting heterogeneous columns.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::{Ref, Value};
///
/// let id = Value::from(Ref::new("site-1").unwrap());
/// assert!(id.is_ref());
/// assert_eq!(id.kind(), "Ref");
/// assert!(Value::MARKER < Value::TRUE);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Marker,
    Remove,
    Na,
    Bool(bool),
    Num(Number),
    Str(String),
    Uri(String),
    Ref(Ref),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Coord(Coord),
    Bin(Bin),
    XStr(XStr),
    Symbol(Symbol),
    List(List),
    Dict(Dict),
    Grid(Grid),
}

impl Value {
    pub const MARKER: Value = Value::Marker;
    pub const REMOVE: Value = Value::Remove;
    pub const NA: Value = Value::Na;
    pub const TRUE: Value = Value::Bool(true);
    pub const FALSE: Value = Value::Bool(false);
    pub const EMPTY_STR: Value = Value::Str(String::new());
    pub const EMPTY_URI: Value = Value::Uri(String::new());
    pub const ZERO: Value = Value::Num(Number::ZERO);

    /// Creates a URI value. Control characters are only rejected when
    /// the value is written.
    pub fn uri(s: impl Into<String>) -> Self {
        Value::Uri(s.into())
    }

    /// Name of this value's kind, as used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Marker => "Marker",
            Value::Remove => "Remove",
            Value::Na => "NA",
            Value::Bool(_) => "Bool",
            Value::Num(_) => "Number",
            Value::Str(_) => "Str",
            Value::Uri(_) => "Uri",
            Value::Ref(_) => "Ref",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::DateTime(_) => "DateTime",
            Value::Coord(_) => "Coord",
            Value::Bin(_) => "Bin",
            Value::XStr(_) => "XStr",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
            Value::Dict(_) => "Dict",
            Value::Grid(_) => "Grid",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, Value::Marker)
    }

    #[inline]
    #[must_use]
    pub const fn is_remove(&self) -> bool {
        matches!(self, Value::Remove)
    }

    #[inline]
    #[must_use]
    pub const fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Num(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_uri(&self) -> bool {
        matches!(self, Value::Uri(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_grid(&self) -> bool {
        matches!(self, Value::Grid(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Value;
    ///
    /// assert_eq!(Value::TRUE.as_bool(), Some(true));
    /// assert_eq!(Value::MARKER.as_bool(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Num(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the float of a number value, ignoring its unit.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::val)
    }

    /// Returns the text of a `Str` value. A `Uri` is not a string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Value::Uri(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_ref(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_time(&self) -> Option<Time> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Value::DateTime(ts) => Some(ts),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_coord(&self) -> Option<Coord> {
        match self {
            Value::Coord(c) => Some(*c),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Value::Grid(g) => Some(g),
            _ => None,
        }
    }

    /// Encodes this value as Zinc text using the default options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{Number, Value};
    ///
    /// let v = Value::from(Number::with_unit(123.4, "m/s").unwrap());
    /// assert_eq!(v.to_zinc().unwrap(), "123.4m/s");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the value contains something Zinc cannot carry,
    /// such as a dict key that is not a valid tag name.
    pub fn to_zinc(&self) -> Result<String> {
        crate::to_string(self)
    }
}

/// A 64-bit float with an optional unit.
///
/// Units are validated on construction: ASCII letters, `_`, `$`, `%`, `/`
/// and any non-ASCII character. Non-finite numbers are written without
/// their unit.
///
/// Equality compares the bit pattern of the float, so `NaN == NaN` and
/// `0.0 != -0.0`.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Number;
///
/// let speed = Number::with_unit(123.4, "m/s").unwrap();
/// assert_eq!(speed.to_string(), "123.4m/s");
///
/// let nan = Number::with_unit(f64::NAN, "m").unwrap();
/// assert_eq!(nan.to_string(), "NaN");
/// assert_eq!(nan, Number::NAN);
///
/// assert!(Number::with_unit(1.0, "").is_err());
/// assert!(Number::with_unit(1.0, "m s").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Number {
    val: f64,
    unit: Option<String>,
}

impl Number {
    pub const ZERO: Number = Number {
        val: 0.0,
        unit: None,
    };
    pub const NAN: Number = Number {
        val: f64::NAN,
        unit: None,
    };
    pub const POS_INF: Number = Number {
        val: f64::INFINITY,
        unit: None,
    };
    pub const NEG_INF: Number = Number {
        val: f64::NEG_INFINITY,
        unit: None,
    };

    /// Creates a unitless number.
    #[must_use]
    pub const fn new(val: f64) -> Self {
        Number { val, unit: None }
    }

    /// Creates a number with a unit.
    pub fn with_unit(val: f64, unit: impl Into<String>) -> Result<Self> {
        Number::new(val).into_unit(unit)
    }

    /// Replaces the unit of this number.
    ///
    /// The unit is still validated for `NaN` and the infinities, but it is
    /// not kept: non-finite numbers are always unitless.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Number;
    ///
    /// assert_eq!(Number::with_unit(f64::NAN, "kW").unwrap(), Number::NAN);
    /// assert!(Number::with_unit(f64::INFINITY, "k W").is_err());
    /// ```
    pub fn into_unit(mut self, unit: impl Into<String>) -> Result<Self> {
        let unit = unit.into();
        if !Self::is_unit(&unit) {
            return Err(Error::invalid("unit", format!("invalid unit '{}'", unit)));
        }
        self.unit = if self.val.is_finite() { Some(unit) } else { None };
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub const fn val(&self) -> f64 {
        self.val
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.val.is_finite()
    }

    /// Returns the value as `i64` if it has no fractional part and fits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Number;
    ///
    /// assert_eq!(Number::new(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::new(42.5).as_i64(), None);
    /// assert_eq!(Number::POS_INF.as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        let f = self.val;
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }

    /// Returns `true` if `s` is a non-empty run of unit characters.
    #[must_use]
    pub fn is_unit(s: &str) -> bool {
        !s.is_empty() && s.chars().all(Self::is_unit_char)
    }

    #[inline]
    #[must_use]
    pub fn is_unit_char(c: char) -> bool {
        c.is_ascii_alphabetic() || matches!(c, '_' | '$' | '%' | '/') || !c.is_ascii()
    }
}

impl Number {
    // every NaN collapses onto one bit pattern
    fn canonical(&self) -> f64 {
        if self.val.is_nan() {
            f64::NAN
        } else {
            self.val
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.canonical().to_bits() == other.canonical().to_bits() && self.unit == other.unit
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().to_bits().hash(state);
        self.unit.hash(state);
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical()
            .total_cmp(&other.canonical())
            .then_with(|| self.unit.cmp(&other.unit))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.val;
        if v.is_nan() {
            return f.write_str("NaN");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "INF" } else { "-INF" });
        }
        let abs = v.abs();
        if abs >= 1e16 || (abs != 0.0 && abs < 1e-6) {
            write!(f, "{:e}", v)?;
        } else {
            write!(f, "{}", v)?;
        }
        if let Some(unit) = &self.unit {
            // keep `0xff` units from reading back as hex
            if v == 0.0 && v.is_sign_positive() && unit.starts_with('x') {
                f.write_str(".0")?;
            }
            f.write_str(unit)?;
        }
        Ok(())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::new(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::new(f64::from(value))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::new(f64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::new(f64::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::new(value as f64)
    }
}

/// An immutable list of values.
///
/// Clones share storage.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::{List, Value};
///
/// let list: List = vec![Value::from(1), Value::MARKER].into();
/// assert_eq!(list.len(), 2);
/// assert!(list[1].is_marker());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct List(Arc<[Value]>);

impl List {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        List(values.into())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl Default for List {
    fn default() -> Self {
        List::new(Vec::new())
    }
}

impl Deref for List {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        List::new(values)
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// TryFrom implementations for extracting payloads from Value
impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(Error::invalid(
                "value",
                format!("expected Bool, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Num(n) => Ok(n.val),
            other => Err(Error::invalid(
                "value",
                format!("expected Number, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for Number {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Num(n) => Ok(n),
            other => Err(Error::invalid(
                "value",
                format!("expected Number, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(Error::invalid(
                "value",
                format!("expected Str, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for Ref {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Ref(r) => Ok(r),
            other => Err(Error::invalid(
                "value",
                format!("expected Ref, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for Dict {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Dict(d) => Ok(d),
            other => Err(Error::invalid(
                "value",
                format!("expected Dict, found {}", other.kind()),
            )),
        }
    }
}

impl TryFrom<Value> for Grid {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Grid(g) => Ok(g),
            other => Err(Error::invalid(
                "value",
                format!("expected Grid, found {}", other.kind()),
            )),
        }
    }
}

// From implementations for creating Value from payloads
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Num(Number::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Num(Number::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(Number::from(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Num(Number::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(Number::from(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Num(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Ref> for Value {
    fn from(value: Ref) -> Self {
        Value::Ref(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(value)
    }
}

impl From<DateTime> for Value {
    fn from(value: DateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Coord> for Value {
    fn from(value: Coord) -> Self {
        Value::Coord(value)
    }
}

impl From<Bin> for Value {
    fn from(value: Bin) -> Self {
        Value::Bin(value)
    }
}

impl From<XStr> for Value {
    fn from(value: XStr) -> Self {
        Value::XStr(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(List::new(value))
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(value)
    }
}

impl From<Grid> for Value {
    fn from(value: Grid) -> Self {
        Value::Grid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Value::TRUE, Value::from(true));
        assert_eq!(Value::ZERO, Value::from(0));
        assert_eq!(Value::EMPTY_STR, Value::from(""));
        assert_ne!(Value::EMPTY_STR, Value::EMPTY_URI);
        assert_ne!(Value::ZERO, Value::from(-0.0));
    }

    #[test]
    fn test_number_units() {
        assert!(Number::with_unit(1.0, "kW").is_ok());
        assert!(Number::with_unit(1.0, "$").is_ok());
        assert!(Number::with_unit(1.0, "%").is_ok());
        assert!(Number::with_unit(1.0, "°F").is_ok());
        assert!(Number::with_unit(1.0, "m²").is_ok());
        assert!(Number::with_unit(1.0, "m2").is_err());
        assert!(Number::with_unit(1.0, "m-s").is_err());
        assert!(Number::with_unit(1.0, "").is_err());
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::new(1.0).to_string(), "1");
        assert_eq!(Number::new(-0.5).to_string(), "-0.5");
        assert_eq!(Number::new(1e16).to_string(), "1e16");
        assert_eq!(Number::new(1.5e-7).to_string(), "1.5e-7");
        assert_eq!(Number::new(0.0).to_string(), "0");
        assert_eq!(Number::with_unit(f64::INFINITY, "m").unwrap().to_string(), "INF");
        assert_eq!(Number::with_unit(f64::NEG_INFINITY, "m").unwrap().to_string(), "-INF");
    }

    #[test]
    fn test_number_nan_equality() {
        assert_eq!(Number::NAN, Number::new(f64::NAN));
        assert_eq!(Number::NAN, Number::new(-f64::NAN));
        assert_ne!(Number::ZERO, Number::new(-0.0));
    }

    #[test]
    fn test_non_finite_numbers_drop_units() {
        let nan = Number::with_unit(f64::NAN, "m").unwrap();
        assert_eq!(nan.unit(), None);
        assert_eq!(nan, Number::NAN);
        assert_eq!(Number::POS_INF.into_unit("kW").unwrap(), Number::POS_INF);
        assert_eq!(Number::with_unit(f64::NEG_INFINITY, "°F").unwrap().unit(), None);
        assert!(Number::NAN.into_unit("1m").is_err());
    }

    #[test]
    fn test_zero_with_x_unit_display() {
        assert_eq!(Number::with_unit(0.0, "xy").unwrap().to_string(), "0.0xy");
        assert_eq!(Number::with_unit(-0.0, "xy").unwrap().to_string(), "-0xy");
        assert_eq!(Number::with_unit(0.0, "kW").unwrap().to_string(), "0kW");
        assert_eq!(Number::with_unit(10.0, "xy").unwrap().to_string(), "10xy");
    }

    #[test]
    fn test_number_ordering() {
        let mut nums = vec![
            Number::new(3.0),
            Number::NEG_INF,
            Number::with_unit(3.0, "m").unwrap(),
            Number::new(-1.0),
        ];
        nums.sort();
        assert_eq!(nums[0], Number::NEG_INF);
        assert_eq!(nums[1], Number::new(-1.0));
        assert_eq!(nums[2], Number::new(3.0));
        assert_eq!(nums[3].unit(), Some("m"));
    }

    #[test]
    fn test_try_from_mismatch() {
        let err = String::try_from(Value::uri("http://x")).unwrap_err();
        assert!(err.to_string().contains("expected Str, found Uri"));
    }

    #[test]
    fn test_list_shares_storage() {
        let list: List = (0..3).map(Value::from).collect();
        let copy = list.clone();
        assert!(std::ptr::eq(list.as_slice(), copy.as_slice()));
        assert_eq!(list.iter().filter_map(Value::as_f64).sum::<f64>(), 3.0);
    }
}
