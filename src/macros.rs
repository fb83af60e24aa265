/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Maps use `{ "key": value }`, sequences `[a, b]`, and named records
/// `record "Type" { "field": value }`. Anything else goes through
/// [`to_value`](crate::to_value), falling back to `null` if it fails.
///
/// ```rust
/// use serde_uon::{to_string, uon};
///
/// let v = uon!({ "name": "Alice", "tags": ["a", "b"], "boss": null });
/// assert_eq!(to_string(&v).unwrap(), "(name=Alice,tags=@(a,b),boss=null)");
/// ```
#[macro_export]
macro_rules! uon {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::from(true)
    };

    (false) => {
        $crate::Value::from(false)
    };

    ([]) => {
        $crate::Value::Sequence(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Sequence(vec![$($crate::uon!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($key.to_string(), $crate::uon!($value));
        )*
        $crate::Value::Map(map)
    }};

    (record $name:literal { $($key:literal : $value:tt),* $(,)? }) => {{
        let mut record = $crate::Record::new($name);
        $(
            record.insert($key.to_string(), $crate::uon!($value));
        )*
        $crate::Value::Record(record)
    }};

    ($s:expr) => {{
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    }};
}
