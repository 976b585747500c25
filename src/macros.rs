/// Builds a [`Dict`](crate::Dict) from tag literals.
///
/// A name on its own is a marker tag; `name: expr` converts the expression
/// with `Value::from`.
///
/// ```rust
/// use haystack_zinc::{dict, Value};
///
/// let site = dict! { "site", "dis": "HQ", "area": 1200 };
/// assert!(site.get("site").unwrap().is_marker());
/// assert_eq!(site.get_str("dis"), Some("HQ"));
/// assert_eq!(dict! {}, haystack_zinc::Dict::empty());
/// ```
#[macro_export]
macro_rules! dict {
    (@value) => {
        $crate::Value::Marker
    };

    (@value $value:expr) => {
        $crate::Value::from($value)
    };

    () => {
        $crate::Dict::empty()
    };

    ($($name:literal $(: $value:expr)?),+ $(,)?) => {{
        let mut builder = $crate::DictBuilder::new();
        $(
            builder.add($name, $crate::dict!(@value $($value)?));
        )+
        builder.build()
    }};
}
