//! Serde support using the Haystack JSON encoding.
//!
//! Scalars without a natural JSON form become strings with a one-letter
//! type prefix; booleans, lists and dicts map to their JSON counterparts.
//!
//! | Value    | JSON                               |
//! |----------|------------------------------------|
//! | Marker   | `"m:"`                             |
//! | Remove   | `"-:"`                             |
//! | NA       | `"z:"`                             |
//! | Bool     | `true` / `false`                   |
//! | Number   | `"n:12.5 kW"`, `"n:NaN"`           |
//! | Str      | `"text"`, or `"s:a:b"` when the second char is `:` |
//! | Uri      | `"u:http://..."`                   |
//! | Ref      | `"r:id"`, `"r:id Display"`         |
//! | Date     | `"d:2011-06-07"`                   |
//! | Time     | `"h:09:51:27"`                     |
//! | DateTime | `"t:2011-06-07T09:51:27Z UTC"`     |
//! | Coord    | `"c:37.55,-77.45"`                 |
//! | Bin      | `"b:text/plain"`                   |
//! | XStr     | `"x:Span:today"`                   |
//! | Symbol   | `"y:elec-meter"`                   |
//!
//! A grid is an object with `meta` (which carries `ver`), `cols` (each an
//! object with `name` plus the column meta) and `rows` (one object per row,
//! absent cells omitted).
//!
//! ## Examples
//!
//! ```rust
//! use haystack_zinc::{dict, Dict, Value};
//!
//! let site = dict! { "site", "dis": "HQ", "area": 1200 };
//! let json = serde_json::to_string(&site).unwrap();
//! assert_eq!(json, r#"{"site":"m:","dis":"HQ","area":"n:1200"}"#);
//!
//! let back: Dict = serde_json::from_str(&json).unwrap();
//! assert_eq!(back, site);
//! ```

use crate::{
    Bin, Coord, Date, DateTime, Dict, DictBuilder, Grid, GridBuilder, List, Number, Ref, Symbol,
    Time, Value, XStr,
};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Marker => serializer.serialize_str("m:"),
            Value::Remove => serializer.serialize_str("-:"),
            Value::Na => serializer.serialize_str("z:"),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Num(n) => serializer.serialize_str(&encode_number(n)),
            Value::Str(s) => {
                if s.chars().nth(1) == Some(':') {
                    serializer.serialize_str(&format!("s:{}", s))
                } else {
                    serializer.serialize_str(s)
                }
            }
            Value::Uri(s) => serializer.serialize_str(&format!("u:{}", s)),
            Value::Ref(r) => match r.dis() {
                Some(dis) => serializer.serialize_str(&format!("r:{} {}", r.id(), dis)),
                None => serializer.serialize_str(&format!("r:{}", r.id())),
            },
            Value::Date(d) => serializer.serialize_str(&format!("d:{}", d)),
            Value::Time(t) => serializer.serialize_str(&format!("h:{}", t)),
            Value::DateTime(ts) => serializer.serialize_str(&format!("t:{}", ts)),
            Value::Coord(c) => {
                let zinc = c.to_string();
                let inner = zinc.trim_start_matches("C(").trim_end_matches(')');
                serializer.serialize_str(&format!("c:{}", inner))
            }
            Value::Bin(b) => serializer.serialize_str(&format!("b:{}", b.mime())),
            Value::XStr(x) => {
                serializer.serialize_str(&format!("x:{}:{}", x.type_name(), x.val()))
            }
            Value::Symbol(s) => serializer.serialize_str(&format!("y:{}", s.as_str())),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(d) => d.serialize(serializer),
            Value::Grid(g) => g.serialize(serializer),
        }
    }
}

fn encode_number(n: &Number) -> String {
    if !n.is_finite() {
        return format!("n:{}", n);
    }
    match n.unit() {
        Some(unit) => format!("n:{} {}", Number::new(n.val()), unit),
        None => format!("n:{}", n),
    }
}

impl Serialize for Dict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct GridMeta<'a>(&'a Grid);

impl Serialize for GridMeta<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let meta = self.0.meta();
        let mut map = serializer.serialize_map(Some(meta.len() + 1))?;
        map.serialize_entry("ver", "3.0")?;
        for (k, v) in meta.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct GridCols<'a>(&'a Grid);

impl Serialize for GridCols<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let cols = self.0.cols();
        let mut seq = serializer.serialize_seq(Some(cols.len()))?;
        for col in cols {
            let mut b = DictBuilder::new();
            b.add_str("name", col.name()).add_all(col.meta());
            seq.serialize_element(&b.build())?;
        }
        seq.end()
    }
}

struct GridRows<'a>(&'a Grid);

impl Serialize for GridRows<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.num_rows()))?;
        for row in self.0.rows() {
            seq.serialize_element(&row.to_dict())?;
        }
        seq.end()
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("meta", &GridMeta(self))?;
        map.serialize_entry("cols", &GridCols(self))?;
        map.serialize_entry("rows", &GridRows(self))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a Haystack JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
        Ok(Value::from(value as f64))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Value, E>
    where
        E: de::Error,
    {
        decode_str(value).map_err(E::custom)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(List::new(items)))
    }

    fn visit_map<A>(self, map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let dict = collect_dict(map)?;
        match grid_from_dict(&dict) {
            Some(grid) => grid.map(Value::Grid).map_err(de::Error::custom),
            None => Ok(Value::Dict(dict)),
        }
    }
}

// JSON nulls inside objects mean "no tag"
fn collect_dict<'de, A>(mut map: A) -> Result<Dict, A::Error>
where
    A: MapAccess<'de>,
{
    let mut b = DictBuilder::new();
    while let Some((k, v)) = map.next_entry::<String, Option<Value>>()? {
        if let Some(v) = v {
            b.add(k, v);
        }
    }
    Ok(b.build())
}

fn decode_str(s: &str) -> crate::Result<Value> {
    let mut chars = s.chars();
    let (kind, rest) = match (chars.next(), chars.next()) {
        (Some(kind), Some(':')) => (kind, &s[kind.len_utf8() + 1..]),
        _ => return Ok(Value::Str(s.to_string())),
    };
    let val = match kind {
        'm' => Value::Marker,
        '-' => Value::Remove,
        'z' => Value::Na,
        'n' => Value::Num(decode_number(rest)?),
        's' => Value::Str(rest.to_string()),
        'u' => Value::Uri(rest.to_string()),
        'r' => match rest.split_once(' ') {
            Some((id, dis)) => Value::Ref(Ref::with_dis(id, dis)?),
            None => Value::Ref(Ref::new(rest)?),
        },
        'd' => Value::Date(rest.parse::<Date>()?),
        'h' => Value::Time(rest.parse::<Time>()?),
        't' => Value::DateTime(rest.parse::<DateTime>()?),
        'c' => {
            let (lat, lng) = rest
                .split_once(',')
                .ok_or_else(|| crate::Error::invalid("coord", format!("invalid coord '{}'", rest)))?;
            let parse = |s: &str| {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| crate::Error::invalid("coord", format!("invalid coord '{}'", rest)))
            };
            Value::Coord(Coord::new(parse(lat)?, parse(lng)?)?)
        }
        'b' => Value::Bin(Bin::new(rest)?),
        'x' => {
            let (type_name, val) = rest
                .split_once(':')
                .ok_or_else(|| crate::Error::invalid("xstr", format!("invalid xstr '{}'", rest)))?;
            Value::XStr(XStr::new(type_name, val)?)
        }
        'y' => Value::Symbol(Symbol::new(rest)?),
        _ => Value::Str(s.to_string()),
    };
    Ok(val)
}

fn decode_number(s: &str) -> crate::Result<Number> {
    let (val, unit) = match s.split_once(' ') {
        Some((val, unit)) => (val, Some(unit)),
        None => (s, None),
    };
    let val = match val {
        "NaN" => f64::NAN,
        "INF" => f64::INFINITY,
        "-INF" => f64::NEG_INFINITY,
        other => other
            .parse()
            .map_err(|_| crate::Error::invalid("number", format!("invalid number '{}'", s)))?,
    };
    match unit {
        Some(unit) => Number::with_unit(val, unit),
        None => Ok(Number::new(val)),
    }
}

// An object with exactly `meta` (holding `ver`), `cols` and `rows` is a grid.
fn grid_from_dict(dict: &Dict) -> Option<crate::Result<Grid>> {
    if dict.len() != 3 {
        return None;
    }
    let meta = dict.get("meta")?.as_dict()?;
    let cols = dict.get("cols")?.as_list()?;
    let rows = dict.get("rows")?.as_list()?;
    if !meta.has("ver") {
        return None;
    }
    Some(build_grid(meta, cols, rows))
}

fn build_grid(meta: &Dict, cols: &List, rows: &List) -> crate::Result<Grid> {
    let mut b = GridBuilder::new();
    for (k, v) in meta.iter().filter(|(k, _)| k.as_str() != "ver") {
        b.meta().add(k.clone(), v.clone());
    }
    for col in cols.iter() {
        let col = col
            .as_dict()
            .ok_or_else(|| crate::Error::invalid("grid", "column is not an object"))?;
        let name = col
            .get_str("name")
            .ok_or_else(|| crate::Error::invalid("grid", "column without a name"))?;
        let col_meta = b.add_col(name)?;
        for (k, v) in col.iter().filter(|(k, _)| k.as_str() != "name") {
            col_meta.add(k.clone(), v.clone());
        }
    }
    for row in rows.iter() {
        let row = row
            .as_dict()
            .ok_or_else(|| crate::Error::invalid("grid", "row is not an object"))?;
        b.add_dict_row(row)?;
    }
    b.build()
}

impl<'de> Deserialize<'de> for Dict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DictVisitor;

        impl<'de> Visitor<'de> for DictVisitor {
            type Value = Dict;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a Haystack JSON object")
            }

            fn visit_map<A>(self, map: A) -> Result<Dict, A::Error>
            where
                A: MapAccess<'de>,
            {
                collect_dict(map)
            }
        }

        deserializer.deserialize_map(DictVisitor)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dict = Dict::deserialize(deserializer)?;
        match grid_from_dict(&dict) {
            Some(grid) => grid.map_err(de::Error::custom),
            None => Err(de::Error::custom(
                "expected an object with meta, cols and rows",
            )),
        }
    }
}
