/// Builds a positional record (`Vec<Value>`) from expressions.
///
/// `null` stands for [`Value::Null`](crate::Value::Null); anything else goes
/// through `Value::from`.
///
/// ```rust
/// use row_format::{row, Value};
///
/// let record = row![123, "hi", null, 2.5];
/// assert_eq!(record[0], Value::Integer(123));
/// assert_eq!(record[2], Value::Null);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };

    ($($elem:tt),+ $(,)?) => {
        vec![$($crate::row!(@value $elem)),+]
    };

    (@value null) => {
        $crate::Value::Null
    };

    (@value $elem:expr) => {
        $crate::Value::from($elem)
    };
}

/// Builds a name-keyed record ([`RowMap`](crate::RowMap)).
///
/// ```rust
/// use row_format::{record, Value};
///
/// let city = record! { "city" => "Niterói", "area" => 133.9, "zip" => null };
/// assert_eq!(city["area"], Value::Float(133.9));
/// assert!(city["zip"].is_null());
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::RowMap::new()
    };

    ($($key:literal => $value:tt),+ $(,)?) => {{
        let mut record = $crate::RowMap::new();
        $(
            record.insert($key.to_string(), $crate::row!(@value $value));
        )+
        record
    }};
}
