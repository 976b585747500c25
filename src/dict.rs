//! Immutable tag dictionaries.
//!
//! This module provides [`Dict`], a shared, immutable map from tag name to
//! [`Value`], and [`DictBuilder`], the mutable accumulator that produces it.
//!
//! A `Dict` keeps insertion order so that written output is stable, but
//! order does not take part in equality or hashing: two dicts holding the
//! same tags are equal whatever order the tags were added in.
//!
//! ## Examples
//!
//! ```rust
//! use haystack_zinc::{Dict, DictBuilder, Value};
//!
//! let mut b = DictBuilder::new();
//! b.add_marker("site").add_str("dis", "Headquarters").add("area", 1200);
//! let site = b.build();
//!
//! assert!(site.has("site"));
//! assert_eq!(site.get_str("dis"), Some("Headquarters"));
//! assert_eq!(site.keys().collect::<Vec<_>>(), vec!["site", "dis", "area"]);
//! assert!(site.get_checked("geoCity").is_err());
//! ```

use crate::{Error, Ref, Result, Value};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

lazy_static! {
    static ref EMPTY: Dict = Dict(Arc::new(IndexMap::new()));
}

/// An immutable map of tag names to values.
///
/// Cloning a `Dict` is cheap: clones share the same storage.
#[derive(Debug, Clone)]
pub struct Dict(Arc<IndexMap<String, Value>>);

impl Dict {
    /// Returns the shared empty dict.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{Dict, DictBuilder};
    ///
    /// let a = Dict::empty();
    /// let b = DictBuilder::new().build();
    /// assert!(Dict::ptr_eq(&a, &b));
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Returns `true` if both dicts share the same storage.
    #[must_use]
    pub fn ptr_eq(a: &Dict, b: &Dict) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Looks up a tag, failing with [`Error::UnknownName`] if it is missing.
    pub fn get_checked(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::unknown_name(name))
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn missing(&self, name: &str) -> bool {
        !self.has(name)
    }

    /// Returns the `id` tag if it holds a ref.
    #[must_use]
    pub fn id(&self) -> Option<&Ref> {
        self.get("id").and_then(Value::as_ref)
    }

    /// Display text for this dict: the `dis` tag, else the display string
    /// of the `id` ref, else the id itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{DictBuilder, Ref};
    ///
    /// let mut b = DictBuilder::new();
    /// b.add("id", Ref::with_dis("a-1", "Alpha").unwrap());
    /// assert_eq!(b.build().dis(), Some("Alpha"));
    /// ```
    #[must_use]
    pub fn dis(&self) -> Option<&str> {
        if let Some(dis) = self.get_str("dis") {
            return Some(dis);
        }
        self.id().map(|id| id.dis().unwrap_or_else(|| id.id()))
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_ref(&self, name: &str) -> Option<&Ref> {
        self.get(name).and_then(Value::as_ref)
    }

    /// Iterates over tags in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns `true` if `s` is a valid tag name: a lowercase ASCII letter
    /// followed by ASCII letters, digits or `_`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::Dict;
    ///
    /// assert!(Dict::is_tag_name("siteRef"));
    /// assert!(!Dict::is_tag_name("SiteRef"));
    /// assert!(!Dict::is_tag_name("site-ref"));
    /// ```
    #[must_use]
    pub fn is_tag_name(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        Dict::ptr_eq(self, other) || *self.0 == *other.0
    }
}

impl Eq for Dict {}

impl Hash for Dict {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // order-independent combination of per-entry hashes
        let mut acc: u64 = 0;
        for (k, v) in self.0.iter() {
            let mut h = DefaultHasher::new();
            k.hash(&mut h);
            v.hash(&mut h);
            acc = acc.wrapping_add(h.finish());
        }
        self.0.len().hash(state);
        acc.hash(state);
    }
}

impl PartialOrd for Dict {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dict {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted_entries().cmp(&other.sorted_entries())
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut b = DictBuilder::new();
        for (k, v) in iter {
            b.add(k, v);
        }
        b.build()
    }
}

/// Mutable accumulator for a [`Dict`].
///
/// Adding a name that is already present replaces its value and keeps its
/// original position.
#[derive(Debug, Clone, Default)]
pub struct DictBuilder {
    map: IndexMap<String, Value>,
}

impl DictBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.map.insert(name.into(), value.into());
        self
    }

    pub fn add_marker(&mut self, name: impl Into<String>) -> &mut Self {
        self.add(name, Value::Marker)
    }

    pub fn add_bool(&mut self, name: impl Into<String>, val: bool) -> &mut Self {
        self.add(name, Value::Bool(val))
    }

    pub fn add_str(&mut self, name: impl Into<String>, val: impl Into<String>) -> &mut Self {
        self.add(name, Value::Str(val.into()))
    }

    /// Adds a number, validating its unit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::DictBuilder;
    ///
    /// let mut b = DictBuilder::new();
    /// b.add_num("temp", 72.5, Some("°F")).unwrap();
    /// assert!(b.add_num("bad", 1.0, Some("not a unit")).is_err());
    /// assert_eq!(b.len(), 1);
    /// ```
    pub fn add_num(&mut self, name: impl Into<String>, val: f64, unit: Option<&str>) -> Result<&mut Self> {
        let num = match unit {
            Some(unit) => crate::Number::with_unit(val, unit)?,
            None => crate::Number::new(val),
        };
        Ok(self.add(name, num))
    }

    /// Copies every tag of `dict` into this builder.
    pub fn add_all(&mut self, dict: &Dict) -> &mut Self {
        for (k, v) in dict.iter() {
            self.map.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.map.shift_remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Freezes the builder. An empty builder yields [`Dict::empty`].
    #[must_use]
    pub fn build(self) -> Dict {
        if self.map.is_empty() {
            return Dict::empty();
        }
        Dict(Arc::new(self.map))
    }
}
