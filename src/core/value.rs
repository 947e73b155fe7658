use crate::core::{DbError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Binary(Vec<u8>),
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    // NaN sorts after every other float and equal to itself
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn midnight(date: &NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

impl Value {
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            // ========================================
            // NULL handling: NULL is "greater" than all values (NULL LAST)
            // ========================================
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Null, _) => Ok(Ordering::Greater),
            (_, Value::Null) => Ok(Ordering::Less),

            // ========================================
            // Same type comparisons
            // ========================================
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(compare_f64(*a, *b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Ok(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Ok(a.cmp(b)),
            (Value::Binary(a), Value::Binary(b)) => Ok(a.cmp(b)),

            // ========================================
            // Implicit promotions
            // ========================================
            (Value::Integer(a), Value::Float(b)) => Ok(compare_f64(*a as f64, *b)),
            (Value::Float(a), Value::Integer(b)) => Ok(compare_f64(*a, *b as f64)),
            (Value::Date(a), Value::Timestamp(b)) => Ok(midnight(a).cmp(b)),
            (Value::Timestamp(a), Value::Date(b)) => Ok(a.cmp(&midnight(b))),

            _ => Err(DbError::TypeMismatch(format!(
                "Cannot compare incompatible types: {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::Date(_) => "DATE",
            Self::Time(_) => "TIME",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Uuid(_) => "UUID",
            Self::Binary(_) => "BINARY",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Integer(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Binary(bytes) => JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect()),
            other => JsonValue::String(other.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            // floats compare exactly; NaN equals NaN
            _ => matches!(self.compare(other), Ok(Ordering::Equal)),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => {
                if fl.is_nan() {
                    write!(f, "NaN")
                } else if fl.is_infinite() {
                    if *fl > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{}", fl)
                }
            }
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Self::Uuid(u) => write!(f, "{}", u),
            Self::Binary(bytes) => {
                write!(f, "\\x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Binary(bytes) => serializer.collect_seq(bytes.iter()),
            other => serializer.collect_str(other),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    Time,
    Timestamp,
    Uuid,
    Binary,
}

impl DataType {
    pub fn is_compatible(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Integer, Value::Integer(_))
                | (Self::Float, Value::Float(_) | Value::Integer(_))
                | (Self::Text, Value::Text(_))
                | (Self::Boolean, Value::Boolean(_))
                | (Self::Date, Value::Date(_))
                | (Self::Time, Value::Time(_))
                | (Self::Timestamp, Value::Timestamp(_))
                | (Self::Uuid, Value::Uuid(_))
                | (Self::Binary, Value::Binary(_))
        )
    }

    /// Types that support `<`, `>`, and `BETWEEN`.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Date | Self::Time | Self::Timestamp
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Parse a raw request literal into a value of this type.
    pub fn parse_literal(&self, raw: &str) -> Option<Value> {
        let trimmed = raw.trim();
        match self {
            Self::Text => Some(Value::Text(raw.to_string())),
            Self::Integer => trimmed.parse().ok().map(Value::Integer),
            Self::Float => trimmed.parse().ok().map(Value::Float),
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" | "y" => Some(Value::Boolean(true)),
                "false" | "f" | "0" | "no" | "n" => Some(Value::Boolean(false)),
                _ => None,
            },
            Self::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            Self::Time => NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
                .ok()
                .map(Value::Time),
            Self::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
            Self::Uuid => Uuid::parse_str(trimmed).ok().map(Value::Uuid),
            Self::Binary => match raw.strip_prefix("\\x") {
                Some(hex) => decode_hex(hex).map(Value::Binary),
                None => Some(Value::Binary(raw.as_bytes().to_vec())),
            },
        }
    }

    /// Convert a JSON scalar into a value of this type.
    pub fn from_json(&self, json: &JsonValue) -> Option<Value> {
        match (json, self) {
            (JsonValue::Null, _) => Some(Value::Null),
            (JsonValue::String(s), _) => self.parse_literal(s),
            (JsonValue::Bool(b), Self::Boolean) => Some(Value::Boolean(*b)),
            (JsonValue::Number(n), Self::Integer) => n.as_i64().map(Value::Integer),
            (JsonValue::Number(n), Self::Float) => n.as_f64().map(Value::Float),
            (JsonValue::Number(n), Self::Boolean) => match n.as_i64() {
                Some(0) => Some(Value::Boolean(false)),
                Some(1) => Some(Value::Boolean(true)),
                _ => None,
            },
            (other, Self::Text) => Some(Value::Text(other.to_string())),
            _ => None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Uuid => write!(f, "UUID"),
            Self::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Integer(42), Value::Integer(42));
        assert_eq!(Value::Float(3.14), Value::Float(3.14));
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_ne!(Value::Integer(1), Value::Integer(2));
        assert_ne!(Value::Null, Value::Integer(0));
        assert_ne!(Value::Text("1".into()), Value::Integer(1));
    }

    #[test]
    fn test_float_equality_is_exact() {
        assert_ne!(Value::Float(0.0), Value::Float(1e-20));
        assert_ne!(Value::Integer(0), Value::Float(1e-20));
        assert_ne!(Value::Float(1e-20), Value::Integer(0));
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(f64::NAN), Value::Integer(0));
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Integer(1) < Value::Integer(2));
        assert!(Value::Text("a".into()) < Value::Text("b".into()));
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let later = day.and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            Value::Date(day).compare(&Value::Timestamp(later)).unwrap(),
            Ordering::Less
        );
        assert!(Value::Date(day).compare(&Value::Integer(5)).is_err());
    }

    #[test]
    fn test_type_compatibility() {
        let int_type = DataType::Integer;
        assert!(int_type.is_compatible(&Value::Integer(42)));
        assert!(int_type.is_compatible(&Value::Null));
        assert!(!int_type.is_compatible(&Value::Text("hello".into())));
        assert!(DataType::Float.is_compatible(&Value::Integer(1)));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(DataType::Integer.parse_literal(" 7 "), Some(Value::Integer(7)));
        assert_eq!(DataType::Integer.parse_literal("7.5"), None);
        assert_eq!(DataType::Boolean.parse_literal("False"), Some(Value::Boolean(false)));
        assert_eq!(
            DataType::Binary.parse_literal("\\x0aff"),
            Some(Value::Binary(vec![0x0a, 0xff]))
        );
        assert_eq!(DataType::Binary.parse_literal("\\xf"), None);
        let ts = DataType::Timestamp.parse_literal("2024-01-02T03:04:05").unwrap();
        assert_eq!(ts.to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(
            DataType::Integer.from_json(&serde_json::json!(10)),
            Some(Value::Integer(10))
        );
        assert_eq!(
            DataType::Integer.from_json(&serde_json::json!("10")),
            Some(Value::Integer(10))
        );
        assert_eq!(DataType::Integer.from_json(&serde_json::json!(true)), None);
        assert_eq!(
            DataType::Text.from_json(&serde_json::json!(3)),
            Some(Value::Text("3".into()))
        );
    }

    #[test]
    fn test_serialize() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-05-06\"");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Binary(vec![1, 2])).unwrap(), "[1,2]");
    }
}
