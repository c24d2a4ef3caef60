//! Scalar values and field types
//!
//! Values are strictly typed. No coercion happens during comparison:
//! an `Int` never equals a `Text`, and ordering is only defined between
//! values of the same variant.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// A single column value held by a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Both Integer and Long columns are stored as i64
    Int(i64),
    Text(String),
    Instant(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values of the same variant.
    ///
    /// Returns None for nulls and for mismatched variants.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Instant(a), Value::Instant(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::Instant(_) => "instant",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Instant(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Instant(t) => write!(f, "'{}'", t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Instant(v)
    }
}

/// Declared type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// 64-bit integer (identifiers, counters)
    Long,
    /// 32-bit integer, stored widened
    Integer,
    Text,
    Boolean,
    /// UTC timestamp
    Instant,
    /// Closed set of upper-case names, stored as text
    Enumeration(&'static [&'static str]),
}

impl ScalarType {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Long => "long",
            ScalarType::Integer => "integer",
            ScalarType::Text => "text",
            ScalarType::Boolean => "boolean",
            ScalarType::Instant => "instant",
            ScalarType::Enumeration(_) => "enumeration",
        }
    }

    /// The filter kind that may be applied to a field of this type
    pub fn filter_kind(&self) -> FilterKind {
        match self {
            ScalarType::Long => FilterKind::Long,
            ScalarType::Integer => FilterKind::Integer,
            ScalarType::Text => FilterKind::Text,
            ScalarType::Boolean => FilterKind::Boolean,
            ScalarType::Instant => FilterKind::Instant,
            ScalarType::Enumeration(_) => FilterKind::Enumeration,
        }
    }

    pub fn accepts(&self, kind: FilterKind) -> bool {
        self.filter_kind() == kind
    }

    /// Converts a JSON document value into a typed column value.
    pub fn from_json(&self, json: &serde_json::Value) -> Result<Value, String> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        match self {
            ScalarType::Long => json
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| format!("expected long, got {}", json)),
            ScalarType::Integer => json
                .as_i64()
                .filter(|v| i32::try_from(*v).is_ok())
                .map(Value::Int)
                .ok_or_else(|| format!("expected integer, got {}", json)),
            ScalarType::Text => json
                .as_str()
                .map(Value::from)
                .ok_or_else(|| format!("expected text, got {}", json)),
            ScalarType::Boolean => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| format!("expected boolean, got {}", json)),
            ScalarType::Instant => {
                let raw = json
                    .as_str()
                    .ok_or_else(|| format!("expected instant, got {}", json))?;
                DateTime::<Utc>::parse_param(raw).map(Value::Instant)
            }
            ScalarType::Enumeration(variants) => {
                let raw = json
                    .as_str()
                    .ok_or_else(|| format!("expected enumeration, got {}", json))?;
                if variants.contains(&raw) {
                    Ok(Value::from(raw))
                } else {
                    Err(format!("'{}' is not one of {}", raw, variants.join(", ")))
                }
            }
        }
    }
}

/// Filter families, one per scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Long,
    Integer,
    Instant,
    Text,
    Enumeration,
    Boolean,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Long => "long",
            FilterKind::Integer => "integer",
            FilterKind::Instant => "instant",
            FilterKind::Text => "text",
            FilterKind::Enumeration => "enumeration",
            FilterKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Rust type that can be used as a filter operand
pub trait Scalar: Clone + fmt::Debug + PartialEq {
    fn to_value(&self) -> Value;

    /// Parses a request parameter value
    fn parse_param(raw: &str) -> Result<Self, String>;
}

impl Scalar for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid long", raw))
    }
}

impl Scalar for i32 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid integer", raw))
    }
}

impl Scalar for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("'{}' is not a valid boolean", raw)),
        }
    }
}

impl Scalar for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl Scalar for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Instant(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("'{}' is not a valid RFC 3339 instant: {}", raw, e))
    }
}

/// A Rust enum stored as an enumeration column
pub trait EnumScalar: Copy + fmt::Debug + PartialEq {
    const VARIANTS: &'static [&'static str];

    fn name(&self) -> &'static str;
}
