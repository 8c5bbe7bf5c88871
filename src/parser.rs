//! File parsing for JSON, YAML, and TOML formats.
//!
//! This module parses structured data files into [`Value`] graphs. The format
//! is detected by file extension, falling back to trying JSON then YAML when
//! the extension is unknown.
//!
//! # Examples
//!
//! ```no_run
//! use ddiff_rs::parser::parse_file;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let value = parse_file(Path::new("data.json"))?;
//! let value = parse_file(Path::new("config.yaml"))?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use chrono::DateTime;
use tracing::debug;

use crate::error::ParseError;
use crate::tree::Value;

/// Parses a file into a Value graph.
///
/// The format is detected by file extension (.json, .yaml, .yml, .toml). If
/// the extension is unknown or missing, this function will attempt to parse
/// as JSON first, then YAML if JSON fails.
///
/// # Errors
///
/// This function will return an error if:
/// - The file does not exist (`ParseError::FileNotFound`)
/// - The file cannot be read (`ParseError::ReadError`)
/// - The file contains invalid JSON, YAML or TOML
/// - The file format cannot be determined (`ParseError::UnknownFormat`)
pub fn parse_file(path: &Path) -> Result<Value, ParseError> {
    let shown = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(ParseError::file_not_found(shown));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(shown.clone(), e))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase());
    debug!(path = %shown, format = extension.as_deref().unwrap_or("unknown"), "parsing file");

    match extension.as_deref() {
        Some("json") => parse_json(&content).map_err(|e| ParseError::json_error(shown, e)),
        Some("yaml") | Some("yml") => parse_yaml(&content).map_err(|e| ParseError::yaml_error(shown, e)),
        Some("toml") => parse_toml(&content).map_err(|e| ParseError::toml_error(shown, e)),
        _ => parse_json(&content)
            .map_err(|_| ())
            .or_else(|_| parse_yaml(&content).map_err(|_| ()))
            .map_err(|_| ParseError::unknown_format(shown)),
    }
}

/// Parses a JSON string into a Value.
///
/// # Examples
///
/// ```
/// use ddiff_rs::parser::parse_json;
///
/// let value = parse_json(r#"{"name": "Alice", "age": 30}"#).unwrap();
/// assert_eq!(value.type_name(), "object");
/// ```
pub fn parse_json(content: &str) -> Result<Value, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(Value::from(value))
}

/// Parses a YAML string into a Value.
///
/// Tags are evaluated away and non-string mapping keys become their text.
pub fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_value(value))
}

/// Parses a TOML document into a Value. Datetimes become dates when they
/// carry a full offset, otherwise strings.
pub fn parse_toml(content: &str) -> Result<Value, toml::de::Error> {
    let table: toml::Table = toml::from_str(content)?;
    Ok(toml_to_value(toml::Value::Table(table)))
}

fn yaml_to_value(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Boolean(b),
        serde_yaml::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Value::Number(f)
            } else if let Some(i) = n.as_i64() {
                Value::Number(i as f64)
            } else if let Some(u) = n.as_u64() {
                Value::Number(u as f64)
            } else {
                Value::Number(f64::NAN)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::array(seq.into_iter().map(yaml_to_value)),
        serde_yaml::Value::Mapping(map) => Value::object(map.into_iter().map(|(k, v)| {
            let key = match k {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => "null".to_string(),
                other => format!("{:?}", other),
            };
            (key, yaml_to_value(v))
        })),
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i as f64),
        toml::Value::Float(f) => Value::Number(f),
        toml::Value::Boolean(b) => Value::Boolean(b),
        toml::Value::Datetime(datetime) => {
            let text = datetime.to_string();
            match DateTime::parse_from_rfc3339(&text) {
                Ok(instant) => Value::date(instant.timestamp_millis() as f64),
                Err(_) => Value::String(text),
            }
        }
        toml::Value::Array(items) => Value::array(items.into_iter().map(toml_to_value)),
        toml::Value::Table(table) => Value::object(table.into_iter().map(|(k, v)| (k, toml_to_value(v)))),
    }
}
