//! YAML, JSON and TOML parsing.
//!
//! # Design Decisions
//! - Grammar work is delegated to `serde_yaml`, `serde_json` and `toml`
//! - Grammar errors are re-wrapped as `MalformedInput`, keeping the underlying message
//! - The resulting structure is passed through untouched, except for TOML
//!   datetimes, which become their RFC 3339 string form
//! - YAML merge keys (`<<: *anchor`) are expanded before conversion; keys
//!   written explicitly in the mapping win over merged ones

use std::path::Path;

use serde_json::{Map, Number, Value};

use super::Format;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ParsedConfig;

fn into_config(format: Format, path: &Path, value: Value) -> ConfigResult<ParsedConfig> {
    ParsedConfig::from_value(value).map_err(|root| {
        ConfigError::malformed(
            format,
            path,
            format!("top-level value must be a mapping, found {}", kind_of(&root)),
        )
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Parse a YAML document. An empty document is an empty mapping.
pub fn parse_yaml(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    if source.trim().is_empty() {
        return Ok(ParsedConfig::new());
    }

    let yaml_error = |e: serde_yaml::Error| {
        ConfigError::malformed(Format::Yaml, path, format!("YAML parsing error: {}", e))
    };

    let mut document: serde_yaml::Value = serde_yaml::from_str(source).map_err(yaml_error)?;
    document.apply_merge().map_err(yaml_error)?;
    let value: Value = serde_yaml::from_value(document).map_err(yaml_error)?;

    match value {
        Value::Null => Ok(ParsedConfig::new()),
        other => into_config(Format::Yaml, path, other),
    }
}

/// Parse a JSON document.
pub fn parse_json(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    let value: Value = serde_json::from_str(source).map_err(|e| {
        ConfigError::malformed(Format::Json, path, format!("JSON parsing error: {}", e))
    })?;

    into_config(Format::Json, path, value)
}

/// Parse a TOML document.
pub fn parse_toml(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    let table: toml::Table = toml::from_str(source).map_err(|e| {
        ConfigError::malformed(Format::Toml, path, format!("TOML parsing error: {}", e))
    })?;

    Ok(ParsedConfig::from(table_to_map(table)))
}

fn table_to_map(table: toml::Table) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        // NaN and infinities have no JSON number form.
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(table_to_map(table)),
    }
}
