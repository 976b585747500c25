use haystack_zinc::{
    dict, read_grid, Bin, Coord, Date, DateTime, Dict, Grid, GridBuilder, Number, Ref, Symbol,
    Time, Value, XStr,
};
use serde_json::json;

#[test]
fn test_scalar_encodings() {
    let ts = DateTime::new(
        Date::new(2011, 6, 7).unwrap(),
        Time::new(9, 51, 27, 0).unwrap(),
        "New_York",
        -4 * 3600,
    )
    .unwrap();
    let cases = vec![
        (Value::MARKER, json!("m:")),
        (Value::REMOVE, json!("-:")),
        (Value::NA, json!("z:")),
        (Value::TRUE, json!(true)),
        (Value::from(Number::with_unit(12.5, "kW").unwrap()), json!("n:12.5 kW")),
        (Value::from(42), json!("n:42")),
        (Value::Num(Number::NAN), json!("n:NaN")),
        (Value::Num(Number::NEG_INF), json!("n:-INF")),
        (Value::from("hello"), json!("hello")),
        (Value::from("a:b"), json!("s:a:b")),
        (Value::uri("http://a/b"), json!("u:http://a/b")),
        (Value::from(Ref::new("a-1").unwrap()), json!("r:a-1")),
        (Value::from(Ref::with_dis("a-1", "Main Site").unwrap()), json!("r:a-1 Main Site")),
        (Value::from(Date::new(2011, 6, 7).unwrap()), json!("d:2011-06-07")),
        (Value::from(Time::new(9, 51, 27, 0).unwrap()), json!("h:09:51:27")),
        (Value::from(ts), json!("t:2011-06-07T09:51:27-04:00 New_York")),
        (Value::from(Coord::new(37.55, -77.45).unwrap()), json!("c:37.55,-77.45")),
        (Value::from(Bin::new("text/plain").unwrap()), json!("b:text/plain")),
        (Value::from(XStr::new("Span", "today").unwrap()), json!("x:Span:today")),
        (Value::from(Symbol::new("elec-meter").unwrap()), json!("y:elec-meter")),
    ];

    for (value, expected) in cases {
        assert_eq!(serde_json::to_value(&value).unwrap(), expected, "{:?}", value);
        let back: Value = serde_json::from_value(expected).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn test_collections() {
    let value = Value::from(vec![
        Value::from(1),
        Value::from(dict! { "site", "dis": "HQ" }),
        Value::from(Vec::<Value>::new()),
    ]);
    let encoded = serde_json::to_value(&value).unwrap();
    assert_eq!(encoded, json!(["n:1", {"site": "m:", "dis": "HQ"}, []]));

    let back: Value = serde_json::from_value(encoded).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_plain_json_numbers_decode() {
    let v: Value = serde_json::from_str("[1, -2, 2.5]").unwrap();
    assert_eq!(
        v,
        Value::from(vec![Value::from(1), Value::from(-2), Value::from(2.5)])
    );
}

#[test]
fn test_null_tags_are_dropped() {
    let d: Dict = serde_json::from_str(r#"{"site":"m:","area":null}"#).unwrap();
    assert_eq!(d, dict! { "site" });
}

#[test]
fn test_grid_encoding() {
    let grid = read_grid("ver:\"3.0\" dis:\"Sites\"\nid,area unit:\"ft²\"\n@a,1200\n@b,\n").unwrap();
    let encoded = serde_json::to_value(&grid).unwrap();
    assert_eq!(
        encoded,
        json!({
            "meta": {"ver": "3.0", "dis": "Sites"},
            "cols": [{"name": "id"}, {"name": "area", "unit": "ft²"}],
            "rows": [{"id": "r:a", "area": "n:1200"}, {"id": "r:b"}]
        })
    );

    let back: Grid = serde_json::from_value(encoded.clone()).unwrap();
    assert_eq!(back, grid);

    let as_value: Value = serde_json::from_value(encoded).unwrap();
    assert_eq!(as_value, Value::from(grid));
}

#[test]
fn test_grid_json_text_roundtrip() {
    let mut b = GridBuilder::new();
    b.meta().add_marker("navId");
    b.add_col("ts").unwrap();
    b.add_col("val").unwrap();
    b.add_row(vec![
        Some(Value::from(DateTime::utc(Date::new(2020, 1, 1).unwrap(), Time::MIDNIGHT))),
        Some(Value::from(Number::with_unit(3.5, "kW").unwrap())),
    ])
    .unwrap();
    let grid = b.build().unwrap();

    let text = serde_json::to_string(&grid).unwrap();
    let back: Grid = serde_json::from_str(&text).unwrap();
    assert_eq!(back, grid);
}

#[test]
fn test_invalid_json_values() {
    assert!(serde_json::from_str::<Value>(r#""d:2011-13-01""#).is_err());
    assert!(serde_json::from_str::<Value>(r#""n:abc""#).is_err());
    assert!(serde_json::from_str::<Value>(r#""c:1""#).is_err());
    assert!(serde_json::from_str::<Grid>(r#"{"site":"m:"}"#).is_err());
    assert!(serde_json::from_str::<Dict>("[1]").is_err());
}
