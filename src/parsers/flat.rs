//! Line grammar for `.env` and `.ini` files.
//!
//! # Grammar
//! ```text
//! blank line / "# comment"   → skipped
//! "[section]"                → opens section (.ini only)
//! "[x=1"                     → an entry; only a closed bracket opens a section
//! "key = value"              → split on the first '=', both sides trimmed
//! anything else              → MalformedInput carrying the line text
//! ```
//!
//! # Design Decisions
//! - Values stay strings; no boolean or number inference
//! - `.ini` entries before any header go to the section named `""`
//! - A repeated section header starts that section over

use std::path::Path;

use serde_json::{Map, Value};

use super::Format;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ParsedConfig;

/// A meaningful line of a flat file.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Section(&'a str),
    Entry(&'a str, &'a str),
}

/// Iterate over the non-blank, non-comment lines of `source`, trimmed.
fn significant_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn split_entry(line: &str) -> Option<Line<'_>> {
    let (key, value) = line.split_once('=')?;
    Some(Line::Entry(key.trim(), value.trim()))
}

fn malformed(format: Format, path: &Path, line: &str) -> ConfigError {
    ConfigError::malformed(
        format,
        path,
        format!("Malformed line in {} file: {}", format, line),
    )
}

/// Parse a `.env` file body into a flat `key → value` mapping.
pub fn parse_env(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    let mut config = ParsedConfig::new();

    for line in significant_lines(source) {
        match split_entry(line) {
            Some(Line::Entry(key, value)) => {
                config.insert(key, Value::String(value.to_string()));
            }
            _ => return Err(malformed(Format::Env, path, line)),
        }
    }

    Ok(config)
}

fn parse_ini_line(line: &str) -> Option<Line<'_>> {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|name| Line::Section(name.trim()))
        .or_else(|| split_entry(line))
}

/// Parse an `.ini` file body into `section → key → value`.
pub fn parse_ini(path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
    let mut config = ParsedConfig::new();
    let mut current: Option<(String, Map<String, Value>)> = None;

    for line in significant_lines(source) {
        match parse_ini_line(line) {
            Some(Line::Section(name)) => {
                if let Some((section, entries)) = current.take() {
                    config.insert(section, Value::Object(entries));
                }
                current = Some((name.to_string(), Map::new()));
            }
            Some(Line::Entry(key, value)) => {
                let (_, entries) = current.get_or_insert_with(|| (String::new(), Map::new()));
                entries.insert(key.to_string(), Value::String(value.to_string()));
            }
            None => return Err(malformed(Format::Ini, path, line)),
        }
    }

    if let Some((section, entries)) = current {
        config.insert(section, Value::Object(entries));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use serde_json::json;

    fn env(source: &str) -> ConfigResult<ParsedConfig> {
        parse_env(Path::new(".env"), source)
    }

    fn ini(source: &str) -> ConfigResult<ParsedConfig> {
        parse_ini(Path::new("a.ini"), source)
    }

    #[test]
    fn test_env_basic() {
        let config = env("KEY=value\n# comment\n\n  OTHER = spaced out  \n").unwrap();
        assert_eq!(config, json!({"KEY": "value", "OTHER": "spaced out"}));
    }

    #[test]
    fn test_env_splits_on_first_equals() {
        let config = env("URL=postgres://u:p@h/db?sslmode=require").unwrap();
        assert_eq!(config.get("URL"), Some(&json!("postgres://u:p@h/db?sslmode=require")));
    }

    #[test]
    fn test_env_no_type_coercion() {
        let config = env("DEBUG=true\nPORT=8080").unwrap();
        assert_eq!(config.get("DEBUG"), Some(&json!("true")));
        assert_eq!(config.get("PORT"), Some(&json!("8080")));
    }

    #[test]
    fn test_env_malformed_line() {
        let err = env("GOOD=1\nthis line is bad\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("this line is bad"));
    }

    #[test]
    fn test_ini_sections() {
        let config = ini("[db]\nuser=admin\npass = secret\n\n[cache]\n# ttl\nttl=30\n").unwrap();
        assert_eq!(
            config,
            json!({"db": {"user": "admin", "pass": "secret"}, "cache": {"ttl": "30"}})
        );
    }

    #[test]
    fn test_ini_implicit_section() {
        let config = ini("name=root\n[a]\nx=1\n").unwrap();
        assert_eq!(config, json!({"": {"name": "root"}, "a": {"x": "1"}}));
    }

    #[test]
    fn test_ini_empty_section_kept() {
        let config = ini("[empty]\n[a]\nx=1\n").unwrap();
        assert_eq!(config, json!({"empty": {}, "a": {"x": "1"}}));
    }

    #[test]
    fn test_ini_repeated_section_restarts() {
        let config = ini("[a]\nx=1\n[b]\ny=2\n[a]\nz=3\n").unwrap();
        assert_eq!(config, json!({"a": {"z": "3"}, "b": {"y": "2"}}));
        let keys: Vec<_> = config.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_ini_section_name_trimmed() {
        let config = ini("[ server ]\nport=80").unwrap();
        assert_eq!(config.get_path(&["server", "port"]), Some(&json!("80")));
    }

    #[test]
    fn test_ini_malformed_lines() {
        let err = ini("[a]\nnovalue\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("Malformed line in INI file: novalue"));

        let err = ini("[unterminated\nx=1\n").unwrap_err();
        assert!(err.to_string().contains("[unterminated"));
    }

    #[test]
    fn test_ini_unclosed_bracket_with_equals_is_entry() {
        let config = ini("[x=1\n[db]\nuser=admin\n").unwrap();
        assert_eq!(config, json!({"": {"[x": "1"}, "db": {"user": "admin"}}));
    }
}
