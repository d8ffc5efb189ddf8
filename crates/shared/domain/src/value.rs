use crate::domain::Domain;
use crate::error::ValueError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A preference value.
///
/// Serialized with serde's default external tagging so binary formats without
/// self-description (postcard) can read it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Data(Vec<u8>),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Data(_) => "data",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
        }
    }

    /// Permissive boolean view.
    ///
    /// Numbers are `true` when non-zero. Strings are `true` when they start with
    /// `Y`, `y`, `T` or `t`, or hold a non-zero number, and `false` otherwise.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            Self::Real(f) => Some(*f != 0.0),
            Self::String(s) => {
                let s = s.trim();
                let affirmative = s.starts_with(['Y', 'y', 'T', 't']);
                Some(affirmative || parse_real(s).is_some_and(|f| f != 0.0))
            },
            _ => None,
        }
    }

    /// Permissive integer view. Reals truncate toward zero and saturate at the `i64` bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Integer(i) => Some(*i),
            Self::Real(f) if f.is_nan() => None,
            Self::Real(f) => Some(f.trunc() as i64),
            Self::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| parse_real(s).map(|f| f.trunc() as i64))
            },
            _ => None,
        }
    }

    /// Permissive floating-point view.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::String(s) => parse_real(s.trim()),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|f| f as f32)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Textual view: strings as-is, numbers in their decimal form, booleans as `1`/`0`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(f) => Some(f.to_string()),
            Self::Bool(b) => Some(u8::from(*b).to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(at) => Some(*at),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_dictionary(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Dictionary(map) => Some(map),
            _ => None,
        }
    }
}

fn parse_real(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| !f.is_nan())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", u8::from(*b)),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::String(s) => f.write_str(s),
            Self::Data(bytes) => {
                f.write_str("<")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str(">")
            },
            Self::Date(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Array(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            },
            Self::Dictionary(map) => {
                f.write_str("{")?;
                for (key, value) in map {
                    write!(f, " {key} = {value};")?;
                }
                f.write_str(" }")
            },
        }
    }
}

// --- From ---

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Data(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(v: BTreeMap<String, Self>) -> Self {
        Self::Dictionary(v)
    }
}

impl From<Domain> for Value {
    fn from(v: Domain) -> Self {
        Self::Dictionary(v.into_inner())
    }
}

// --- TryFrom (strict) ---

impl TryFrom<&Value> for bool {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(ValueError::mismatch("bool", other.kind_name())),
        }
    }
}

impl TryFrom<&Value> for i64 {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(i) => Ok(*i),
            other => Err(ValueError::mismatch("integer", other.kind_name())),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = ValueError;

    #[allow(clippy::cast_precision_loss)]
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as Self),
            other => Err(ValueError::mismatch("real", other.kind_name())),
        }
    }
}

impl TryFrom<&Value> for String {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValueError::mismatch("string", other.kind_name())),
        }
    }
}

impl TryFrom<&Value> for Vec<u8> {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Data(bytes) => Ok(bytes.clone()),
            other => Err(ValueError::mismatch("data", other.kind_name())),
        }
    }
}

impl TryFrom<&Value> for DateTime<Utc> {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Date(at) => Ok(*at),
            other => Err(ValueError::mismatch("date", other.kind_name())),
        }
    }
}
