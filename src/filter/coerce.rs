//! Conversion of raw request values for ordered and range operators.
//!
//! Candidates are tried in a fixed order: integer, float, date
//! (`YYYY-MM-DD`), time (`HH:MM:SS`). The first that parses wins, so `"5"`
//! is always an integer and never anything else.

use crate::core::value::{DATE_FORMAT, TIME_FORMAT};
use crate::core::{DataType, Value};
use chrono::{NaiveDate, NaiveTime};

type Coercion = fn(&str) -> Option<Value>;

const COERCIONS: [(&str, Coercion); 4] = [
    ("integer", |raw| raw.trim().parse().ok().map(Value::Integer)),
    ("float", |raw| raw.trim().parse().ok().map(Value::Float)),
    ("date", |raw| {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(Value::Date)
    }),
    ("time", |raw| {
        NaiveTime::parse_from_str(raw, TIME_FORMAT).ok().map(Value::Time)
    }),
];

/// Names of the accepted kinds, in trial order.
pub fn accepted_kinds() -> impl Iterator<Item = &'static str> {
    COERCIONS.iter().map(|(kind, _)| *kind)
}

/// First successful conversion of `raw`, or `None` if every candidate fails.
pub fn coerce(raw: &str) -> Option<Value> {
    COERCIONS.iter().find_map(|(_, convert)| convert(raw))
}

/// Adapt a coerced value to the attribute it is compared against.
///
/// Returns `None` when the two cannot be ordered against each other.
pub fn align_to_column(value: Value, data_type: DataType) -> Option<Value> {
    match (value, data_type) {
        (Value::Integer(i), DataType::Float) => Some(Value::Float(i as f64)),
        (v @ Value::Integer(_), DataType::Integer) => Some(v),
        (v @ Value::Float(_), DataType::Integer | DataType::Float) => Some(v),
        (v @ Value::Date(_), DataType::Date) => Some(v),
        (Value::Date(d), DataType::Timestamp) => Some(Value::Timestamp(d.and_time(NaiveTime::MIN))),
        (v @ Value::Time(_), DataType::Time) => Some(v),
        _ => None,
    }
}
