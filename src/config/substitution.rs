//! Environment variable substitution.
//!
//! # Responsibilities
//! - Replace `${NAME}` placeholders with the value of variable `NAME`
//! - Recurse through mappings and sequences, visiting every leaf once
//!
//! # Design Decisions
//! - The pattern is anchored at the start of the string only; the whole
//!   string is replaced, so text after the closing brace is dropped
//! - All-or-nothing: one unresolved placeholder fails the whole pass
//! - The environment is only read, never written

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ParsedConfig;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{(\w+)\}").expect("placeholder pattern is valid"));

/// Source of variable values for substitution.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. `None` means unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Return the variable name if `s` starts with a placeholder.
pub fn placeholder_name(s: &str) -> Option<&str> {
    PLACEHOLDER
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Substitute placeholders using the process environment.
pub fn substitute(config: ParsedConfig) -> ConfigResult<ParsedConfig> {
    substitute_with(config, &ProcessEnv)
}

/// Substitute placeholders using `env`.
pub fn substitute_with(mut config: ParsedConfig, env: &dyn EnvSource) -> ConfigResult<ParsedConfig> {
    for value in config.as_map_mut().values_mut() {
        substitute_value(value, env)?;
    }
    Ok(config)
}

fn substitute_value(value: &mut Value, env: &dyn EnvSource) -> ConfigResult<()> {
    match value {
        Value::String(s) => {
            if let Some(name) = placeholder_name(s) {
                let resolved = resolve(name, env)?;
                *s = resolved;
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute_value(item, env)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute_value(item, env)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

fn resolve(name: &str, env: &dyn EnvSource) -> ConfigResult<String> {
    match env.var(name) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvironmentVariable {
            name: name.to_string(),
        }),
    }
}
