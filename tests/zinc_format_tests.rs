//! Byte-level checks of the Zinc grammar: literal forms, escapes, the null
//! cell convention and version handling.

use haystack_zinc::{
    read_grid, read_value, to_string, Coord, Date, DateTime, Error, GridBuilder, Number, Ref,
    Time, Value, Version, ZincReader,
};

fn read(s: &str) -> Value {
    read_value(s).unwrap().unwrap()
}

fn write(v: &Value) -> String {
    to_string(v).unwrap()
}

#[test]
fn test_number_with_unit() {
    let v = Value::from(Number::with_unit(123.4, "m/s").unwrap());
    assert_eq!(write(&v), "123.4m/s");
    assert_eq!(read("123.4m/s"), v);
}

#[test]
fn test_exponent_with_unit() {
    assert_eq!(
        read("2.4e-3fl_oz"),
        Value::from(Number::with_unit(0.0024, "fl_oz").unwrap())
    );
    assert_eq!(read("1E-2"), Value::from(0.01));
    assert_eq!(read("5e+3"), Value::from(5000.0));
}

#[test]
fn test_date() {
    let v = Value::from(Date::new(2011, 6, 7).unwrap());
    assert_eq!(write(&v), "2011-06-07");
    assert_eq!(read("2011-06-07"), v);
}

#[test]
fn test_grid_with_missing_cell() {
    let mut b = GridBuilder::new();
    b.add_col("id").unwrap();
    b.add_col("dis").unwrap();
    b.add_col("area").unwrap();
    b.add_row(vec![
        Some(Value::from(Ref::new("a").unwrap())),
        Some(Value::from("Alpha")),
        Some(Value::from(1200)),
    ])
    .unwrap();
    b.add_row(vec![
        Some(Value::from(Ref::new("b").unwrap())),
        Some(Value::from("Beta")),
        None,
    ])
    .unwrap();
    let grid = b.build().unwrap();

    let zinc = haystack_zinc::grid_to_string(&grid).unwrap();
    assert_eq!(zinc, "ver:\"3.0\"\nid,dis,area\n@a,\"Alpha\",1200\n@b,\"Beta\",\n");

    let back = read_grid(&zinc).unwrap();
    assert_eq!(back, grid);
    let row = back.row(1).unwrap();
    assert_eq!(row.get("area"), None);
    assert!(matches!(row.get_checked("area"), Err(Error::UnknownName(_))));
}

#[test]
fn test_unicode_escapes() {
    let expected = Value::from("[\u{ABCD} \u{1234}]");
    assert_eq!(read(r#""[\uABCD \u1234]""#), expected);
    assert_eq!(read(r#""[\uabcd \u1234]""#), expected);
}

#[test]
fn test_unsupported_version() {
    let err = read_grid("ver:\"4.0\"\na\n1\n").unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion { ref version, .. } if version == "4.0"));
    assert!(err.is_parse());
}

#[test]
fn test_leading_null_cell() {
    let mut b = GridBuilder::new();
    b.add_col("a").unwrap();
    b.add_col("b").unwrap();
    b.add_row(vec![None, Some(Value::from(1))]).unwrap();
    b.add_row(vec![None, None]).unwrap();
    b.add_row(vec![Some(Value::from(2)), None]).unwrap();
    let grid = b.build().unwrap();

    let zinc = haystack_zinc::grid_to_string(&grid).unwrap();
    assert_eq!(zinc, "ver:\"3.0\"\na,b\nN,1\nN,\n2,\n");
    assert_eq!(read_grid(&zinc).unwrap(), grid);

    // an explicit N in any position reads as absent
    let grid = read_grid("ver:\"3.0\"\na,b\n1,N\n").unwrap();
    assert_eq!(grid.row(0).unwrap().get("b"), None);
}

#[test]
fn test_number_formats() {
    assert_eq!(write(&Value::from(1.0)), "1");
    assert_eq!(write(&Value::from(-0.5)), "-0.5");
    assert_eq!(write(&Value::from(1e16)), "1e16");
    assert_eq!(write(&Value::from(1.5e-7)), "1.5e-7");
    assert_eq!(write(&Value::from(123456789.0)), "123456789");
    assert_eq!(write(&Value::Num(Number::NEG_INF)), "-INF");
    assert_eq!(write(&Value::from(Number::with_unit(f64::INFINITY, "kW").unwrap())), "INF");

    assert_eq!(read("0x1F"), Value::from(31));
    assert_eq!(read("1_000"), Value::from(1000));
    assert_eq!(read("1e16"), Value::from(1e16));
}

#[test]
fn test_non_finite_number_with_unit_reads_back() {
    for val in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let v = Value::from(Number::with_unit(val, "m").unwrap());
        assert_eq!(read(&write(&v)), v);
    }
}

#[test]
fn test_zero_with_x_unit_is_not_hex() {
    let v = Value::from(Number::with_unit(0.0, "xy").unwrap());
    assert_eq!(write(&v), "0.0xy");
    assert_eq!(read("0xy"), v);
    assert_eq!(read(&write(&v)), v);

    let v = Value::from(Number::with_unit(0.0, "xff").unwrap());
    assert_eq!(read(&write(&v)), v);
    assert_eq!(read("0xff"), Value::from(255));
}

#[test]
fn test_times() {
    assert_eq!(read("8:30"), Value::from(Time::new(8, 30, 0, 0).unwrap()));
    assert_eq!(read("08:30:15"), Value::from(Time::new(8, 30, 15, 0).unwrap()));
    assert_eq!(read("08:30:15.1"), Value::from(Time::new(8, 30, 15, 100).unwrap()));
    assert_eq!(read("08:30:15.123456"), Value::from(Time::new(8, 30, 15, 123).unwrap()));
    assert_eq!(write(&Value::from(Time::new(8, 30, 15, 7).unwrap())), "08:30:15.007");
    assert!(read_value("24:00:00").is_err());
}

#[test]
fn test_datetimes() {
    let v = read("2011-06-07T09:51:27.354-04:00 New_York");
    let ts = v.as_datetime().unwrap();
    assert_eq!(ts.date(), Date::new(2011, 6, 7).unwrap());
    assert_eq!(ts.time(), Time::new(9, 51, 27, 354).unwrap());
    assert_eq!(ts.tz(), "New_York");
    assert_eq!(write(&v), "2011-06-07T09:51:27.354-04:00 New_York");

    let utc = read("2011-06-07T13:51:27.354Z");
    assert_eq!(write(&utc), "2011-06-07T13:51:27.354Z UTC");
    assert_eq!(utc.as_datetime().unwrap().millis(), ts.millis());
    assert_ne!(utc, v);

    let gmt = read("2011-06-07T09:51:27+03:00 GMT-3");
    assert_eq!(gmt.as_datetime().unwrap().tz(), "GMT-3");

    assert_eq!(
        DateTime::utc(Date::new(1970, 1, 1).unwrap(), Time::MIDNIGHT).millis(),
        0
    );
}

#[test]
fn test_date_boundaries() {
    assert!(read_value("2011-13-01").is_err());
    assert!(read_value("2011-00-01").is_err());
    assert!(read_value("2011-01-32").is_err());
    assert!(read_value("1899-12-31").is_err());
    assert!(Date::new(2011, 0, 1).is_err());
    assert!(Date::new(2011, 1, 0).is_err());
}

#[test]
fn test_coord_boundaries() {
    assert_eq!(read("C(90,-180)"), Value::from(Coord::new(90.0, -180.0).unwrap()));
    assert!(read_value("C(90.5,0)").is_err());
    assert!(read_value("C(0,181)").is_err());
    assert_eq!(write(&Value::from(Coord::new(1.0, -0.000001).unwrap())), "C(1.0,-0.000001)");
}

#[test]
fn test_strings() {
    assert_eq!(write(&Value::EMPTY_STR), "\"\"");
    assert_eq!(write(&Value::from("tab\there")), "\"tab\\there\"");
    assert_eq!(write(&Value::from("$var")), "\"\\$var\"");
    assert_eq!(read(r#""\b\f\n\r\t\"\\\$""#), Value::from("\u{8}\u{c}\n\r\t\"\\$"));
    assert_eq!(read(r#""\uD83D\uDE00""#), Value::from("😀"));
    assert!(read_value("\"no end").is_err());
    assert!(read_value("\"bad \\q escape\"").is_err());
}

#[test]
fn test_uris() {
    assert_eq!(write(&Value::EMPTY_URI), "``");
    assert_eq!(read("`http://a/b?c=d`"), Value::uri("http://a/b?c=d"));
    assert_eq!(read(r"`a\`b`"), Value::uri("a`b"));
    assert!(to_string(&Value::uri("bad\u{7}")).is_err());
}

#[test]
fn test_ref_display_is_optional() {
    let plain = read("@p:demo:r:2");
    let with_dis = read("@p:demo:r:2 \"Demo Site\"");
    assert_eq!(plain, with_dis);
    assert_eq!(write(&with_dis), "@p:demo:r:2 \"Demo Site\"");
    assert_eq!(write(&plain), "@p:demo:r:2");
}

#[test]
fn test_column_meta_and_grid_meta() {
    let zinc = "ver:\"3.0\" hisStart:2012-01-01 dis:\"Meters\"\nid dis:\"Id\",val unit:\"kW\" precision:2\n@m1,1.5kW\n";
    let grid = read_grid(zinc).unwrap();
    assert_eq!(grid.meta().get("hisStart"), Some(&Value::from(Date::new(2012, 1, 1).unwrap())));
    assert_eq!(grid.col("id").unwrap().dis(), "Id");
    assert_eq!(grid.col("val").unwrap().dis(), "val");
    assert_eq!(grid.col("val").unwrap().meta().get_f64("precision"), Some(2.0));
    assert_eq!(haystack_zinc::grid_to_string(&grid).unwrap(), zinc);
}

#[test]
fn test_grid_errors_carry_lines() {
    let err = read_grid("ver:\"3.0\"\na,b\n1,2\n\"open\n").unwrap_err();
    assert_eq!(err.line(), Some(4));

    let err = read_grid("ver:\"3.0\"\n\n").unwrap_err();
    assert_eq!(err.line(), Some(2));

    let err = read_grid("ver:\"3.0\"\na,a\n").unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));

    let err = read_grid("ver:\"3.0\"\nBad\n").unwrap_err();
    assert!(err.is_parse());

    assert!(read_grid("ver:3.0\na\n").is_err());
    assert!(read_grid("id\n@a\n").is_err());
}

#[test]
fn test_reader_tracks_version() {
    let mut r = ZincReader::from_str("ver:\"2.0\"\na\n1\n");
    r.read_grid().unwrap();
    assert_eq!(r.version(), Version::V2);
}

#[test]
fn test_empty_list_and_dict() {
    assert_eq!(read("[]"), Value::from(Vec::<Value>::new()));
    assert_eq!(read("{}"), Value::from(haystack_zinc::Dict::empty()));
    assert_eq!(write(&read("[ 1 , 2 ]")), "[1,2]");
}
