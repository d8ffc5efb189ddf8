//! Property-list files: defaults shipped next to an application as JSON or TOML.

use crate::error::{DefaultsError, DefaultsErrorExt};
use std::collections::BTreeMap;
use std::path::Path;
use strata_domain::{Domain, Value};

/// Reads `path` and decodes it into a [`Domain`] according to its extension.
///
/// # Errors
/// * [`DefaultsError::UnsupportedFormat`] for extensions other than `.json` and `.toml`.
/// * [`DefaultsError::Io`] if the file cannot be read.
/// * [`DefaultsError::Decode`] if the contents are not a table of values.
pub fn read_domain(path: &Path) -> Result<Domain, DefaultsError> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let decode: fn(&str) -> Result<Domain, DefaultsError> = match extension.as_deref() {
        Some("json") => decode_json,
        Some("toml") => decode_toml,
        _ => {
            return Err(DefaultsError::UnsupportedFormat {
                message: path.display().to_string().into(),
                context: Some("Expected a .json or .toml file".into()),
            });
        },
    };

    let text = std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
    decode(&text).context(path.display().to_string())
}

/// Decodes a JSON object. `null` entries are skipped.
pub fn decode_json(text: &str) -> Result<Domain, DefaultsError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| decode_error(&e))?;
    match value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(k, v)| from_json(v).map(|v| (k, v)))
            .collect()),
        other => Err(DefaultsError::Decode {
            message: format!("expected an object, found {}", json_kind(&other)).into(),
            context: None,
        }),
    }
}

/// Decodes a TOML document.
pub fn decode_toml(text: &str) -> Result<Domain, DefaultsError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| decode_error(&e))?;
    Ok(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
}

fn decode_error(err: &impl std::fmt::Display) -> DefaultsError {
    DefaultsError::Decode { message: err.to_string().into(), context: None }
}

fn from_json(value: serde_json::Value) -> Option<Value> {
    Some(match value {
        serde_json::Value::Null => return None,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().filter_map(from_json).collect())
        },
        serde_json::Value::Object(map) => Value::Dictionary(
            map.into_iter().filter_map(|(k, v)| from_json(v).map(|v| (k, v))).collect(),
        ),
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Real(f),
        toml::Value::String(s) => Value::String(s),
        // TOML datetimes may lack a zone or a date; keep their text form.
        toml::Value::Datetime(at) => Value::String(at.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Dictionary(
            table.into_iter().map(|(k, v)| (k, from_toml(v))).collect::<BTreeMap<_, _>>(),
        ),
    }
}
