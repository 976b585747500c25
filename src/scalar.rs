//! Identifier-like scalar values: [`Ref`], [`Coord`], [`Bin`], [`XStr`] and
//! [`Symbol`].
//!
//! All of these validate their payload on construction, so a value that
//! exists is always writable as Zinc. `Display` renders the Zinc literal.

use crate::writer::write_str_literal;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A reference to an entity: an identifier plus an optional display string.
///
/// Equality, hashing and ordering consider the identifier only.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Ref;
///
/// let plain = Ref::new("site-1").unwrap();
/// let named = Ref::with_dis("site-1", "Headquarters").unwrap();
/// assert_eq!(plain, named);
/// assert_eq!(named.dis(), Some("Headquarters"));
/// assert!(Ref::new("has space").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Ref {
    id: String,
    dis: Option<String>,
}

impl Ref {
    /// Creates a ref with no display string.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !Self::is_id(&id) {
            return Err(Error::invalid("ref", format!("invalid id '{}'", id)));
        }
        Ok(Ref { id, dis: None })
    }

    /// Creates a ref carrying a display string.
    pub fn with_dis(id: impl Into<String>, dis: impl Into<String>) -> Result<Self> {
        let mut r = Self::new(id)?;
        r.dis = Some(dis.into());
        Ok(r)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn dis(&self) -> Option<&str> {
        self.dis.as_deref()
    }

    /// Returns `true` if `s` is a non-empty run of ref id characters.
    #[must_use]
    pub fn is_id(s: &str) -> bool {
        !s.is_empty() && s.chars().all(Self::is_id_char)
    }

    /// Letters, digits and `_ - : . ~`.
    #[inline]
    #[must_use]
    pub fn is_id_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '~')
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ref {}

impl Hash for Ref {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Ref {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ref {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.id)?;
        if let Some(dis) = &self.dis {
            let mut s = String::with_capacity(dis.len() + 3);
            s.push(' ');
            write_str_literal(&mut s, dis);
            f.write_str(&s)?;
        }
        Ok(())
    }
}

/// A geographic coordinate stored as integer micro-degrees.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Coord;
///
/// let c = Coord::new(37.55, -77.45).unwrap();
/// assert_eq!(c.lat(), 37.55);
/// assert_eq!(c.to_string(), "C(37.55,-77.45)");
/// assert!(Coord::new(90.5, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    ulat: i32,
    ulng: i32,
}

const MICRO: f64 = 1_000_000.0;

impl Coord {
    /// Creates a coordinate from decimal degrees.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::invalid("coord", format!("invalid lat {}", lat)));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(Error::invalid("coord", format!("invalid lng {}", lng)));
        }
        Ok(Coord {
            ulat: (lat * MICRO).round() as i32,
            ulng: (lng * MICRO).round() as i32,
        })
    }

    /// Creates a coordinate from micro-degrees.
    pub fn from_micro(ulat: i32, ulng: i32) -> Result<Self> {
        if !(-90_000_000..=90_000_000).contains(&ulat) {
            return Err(Error::invalid("coord", format!("invalid lat {}", ulat)));
        }
        if !(-180_000_000..=180_000_000).contains(&ulng) {
            return Err(Error::invalid("coord", format!("invalid lng {}", ulng)));
        }
        Ok(Coord { ulat, ulng })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        f64::from(self.ulat) / MICRO
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        f64::from(self.ulng) / MICRO
    }

    #[must_use]
    pub const fn ulat(&self) -> i32 {
        self.ulat
    }

    #[must_use]
    pub const fn ulng(&self) -> i32 {
        self.ulng
    }
}

// Decimal degrees with at least one and at most six fraction digits.
fn push_micro(out: &mut String, micro: i32) {
    if micro < 0 {
        out.push('-');
    }
    let abs = micro.unsigned_abs();
    out.push_str(&(abs / 1_000_000).to_string());
    out.push('.');
    let frac = format!("{:06}", abs % 1_000_000);
    let trimmed = frac.trim_end_matches('0');
    out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::from("C(");
        push_micro(&mut s, self.ulat);
        s.push(',');
        push_micro(&mut s, self.ulng);
        s.push(')');
        f.write_str(&s)
    }
}

/// A reference to a binary payload, identified by its MIME type.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Bin;
///
/// let bin = Bin::new("text/plain; charset=utf-8").unwrap();
/// assert_eq!(bin.to_string(), "Bin(\"text/plain; charset=utf-8\")");
/// assert!(Bin::new("text/plain)").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bin {
    mime: String,
}

impl Bin {
    pub fn new(mime: impl Into<String>) -> Result<Self> {
        let mime = mime.into();
        if mime.is_empty() {
            return Err(Error::invalid("bin", "empty mime type"));
        }
        if let Some(c) = mime.chars().find(|&c| c < ' ' || c == ')') {
            return Err(Error::invalid(
                "bin",
                format!("invalid char {:?} in mime type '{}'", c, mime),
            ));
        }
        Ok(Bin { mime })
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::from("Bin(");
        write_str_literal(&mut s, &self.mime);
        s.push(')');
        f.write_str(&s)
    }
}

/// An extended string: a value of a type unknown to the core model, carried
/// as its type name plus string encoding.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::XStr;
///
/// let span = XStr::new("Span", "today").unwrap();
/// assert_eq!(span.to_string(), "Span(\"today\")");
/// assert!(XStr::new("span", "today").is_err());
/// assert!(XStr::new("Bin", "text/plain").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XStr {
    type_name: String,
    val: String,
}

impl XStr {
    pub fn new(type_name: impl Into<String>, val: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        if !Self::is_type_name(&type_name) {
            return Err(Error::invalid(
                "xstr",
                format!("invalid type name '{}'", type_name),
            ));
        }
        if type_name == "Bin" {
            return Err(Error::invalid("xstr", "Bin values are built with Bin::new"));
        }
        Ok(XStr {
            type_name,
            val: val.into(),
        })
    }

    /// An uppercase ASCII letter followed by letters, digits or `_`.
    #[must_use]
    pub fn is_type_name(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_uppercase() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn val(&self) -> &str {
        &self.val
    }
}

impl fmt::Display for XStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(self.type_name.len() + self.val.len() + 4);
        s.push_str(&self.type_name);
        s.push('(');
        write_str_literal(&mut s, &self.val);
        s.push(')');
        f.write_str(&s)
    }
}

/// A namespaced symbolic name, `name` or `lib:name`.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Symbol;
///
/// let sym = Symbol::new("ph.equips:ahu").unwrap();
/// assert_eq!(sym.lib(), Some("ph.equips"));
/// assert_eq!(sym.name(), "ahu");
/// assert_eq!(sym.to_string(), "^ph.equips:ahu");
/// assert!(Symbol::new("Ahu").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    val: String,
}

impl Symbol {
    pub fn new(val: impl Into<String>) -> Result<Self> {
        let val = val.into();
        let valid = match val.split_once(':') {
            Some((lib, name)) => Self::is_segment(lib) && Self::is_segment(name),
            None => Self::is_segment(&val),
        };
        if !valid {
            return Err(Error::invalid("symbol", format!("invalid symbol '{}'", val)));
        }
        Ok(Symbol { val })
    }

    fn is_segment(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => chars.all(Self::is_symbol_char),
            _ => false,
        }
    }

    /// Characters allowed after the first letter of a segment.
    #[inline]
    #[must_use]
    pub fn is_symbol_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~')
    }

    /// The full text, including any library prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.val
    }

    #[must_use]
    pub fn lib(&self) -> Option<&str> {
        self.val.split_once(':').map(|(lib, _)| lib)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.val.split_once(':').map_or(&self.val, |(_, name)| name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{}", self.val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ref_identity_ignores_dis() {
        let a = Ref::with_dis("a", "Alpha").unwrap();
        let b = Ref::with_dis("a", "Other").unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&Ref::new("a").unwrap()));
    }

    #[test]
    fn test_ref_charset() {
        assert!(Ref::new("a-b_c:d.e~f").is_ok());
        assert!(Ref::new("").is_err());
        assert!(Ref::new("a/b").is_err());
        assert!(Ref::new("a b").is_err());
    }

    #[test]
    fn test_ref_display() {
        assert_eq!(Ref::new("x").unwrap().to_string(), "@x");
        assert_eq!(
            Ref::with_dis("x", "say \"hi\"").unwrap().to_string(),
            "@x \"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_coord_bounds() {
        assert!(Coord::new(90.0, 180.0).is_ok());
        assert!(Coord::new(-90.0, -180.0).is_ok());
        assert!(Coord::new(-90.1, 0.0).is_err());
        assert!(Coord::new(0.0, 180.1).is_err());
        assert!(Coord::new(f64::NAN, 0.0).is_err());
        assert!(Coord::from_micro(90_000_001, 0).is_err());
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(Coord::new(0.0, 0.0).unwrap().to_string(), "C(0.0,0.0)");
        assert_eq!(
            Coord::new(-0.5, 123.000001).unwrap().to_string(),
            "C(-0.5,123.000001)"
        );
        assert_eq!(
            Coord::new(12.0, -180.0).unwrap().to_string(),
            "C(12.0,-180.0)"
        );
    }

    #[test]
    fn test_bin_validation() {
        assert!(Bin::new("image/png").is_ok());
        assert!(Bin::new("").is_err());
        assert!(Bin::new("text/\nplain").is_err());
    }

    #[test]
    fn test_symbol_validation() {
        assert!(Symbol::new("site").is_ok());
        assert!(Symbol::new("lib:name").is_ok());
        assert!(Symbol::new(":name").is_err());
        assert!(Symbol::new("lib:").is_err());
        assert!(Symbol::new("a:b:c").is_err());
        assert!(Symbol::new("has space").is_err());
        assert_eq!(Symbol::new("site").unwrap().lib(), None);
    }

    #[test]
    fn test_xstr_type_name() {
        assert!(XStr::is_type_name("Span"));
        assert!(XStr::is_type_name("A_1"));
        assert!(!XStr::is_type_name("_A"));
        assert!(!XStr::is_type_name(""));
    }

    #[test]
    fn test_xstr_rejects_bin() {
        let err = XStr::new("Bin", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { kind: "xstr", .. }));
        assert!(XStr::new("Binary", "x").is_ok());
    }
}
