//! Schema validation of raw parsed values.
//!
//! # Responsibilities
//! - Define the validator capability used by the loader
//! - Provide a JSON-Schema implementation
//!
//! # Design Decisions
//! - Returns all violations, not just the first
//! - Validation is a pure function: (instance, schema) → violations
//! - Runs on the raw value, before environment substitution

use std::fmt;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::config::error::{ConfigError, ConfigResult};

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value; empty for the root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Checks a value against a structural schema.
pub trait SchemaValidator: Send + Sync {
    /// Returns every violation found; an empty list means the value is valid.
    /// Fails only when the schema itself is unusable.
    fn validate(&self, instance: &Value, schema: &Value) -> ConfigResult<Vec<Violation>>;
}

/// JSON-Schema validator (draft auto-detected from `$schema`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, instance: &Value, schema: &Value) -> ConfigResult<Vec<Violation>> {
        let compiled = JSONSchema::compile(schema).map_err(|e| ConfigError::InvalidSchema {
            message: e.to_string(),
        })?;

        let violations = match compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| Violation {
                    path: e.instance_path.to_string(),
                    message: e.to_string(),
                })
                .collect(),
        };
        Ok(violations)
    }
}

/// Run `validator` and turn violations into [`ConfigError::SchemaValidation`].
pub fn check(validator: &dyn SchemaValidator, instance: &Value, schema: &Value) -> ConfigResult<()> {
    let violations = validator.validate(instance, schema)?;
    if violations.is_empty() {
        return Ok(());
    }

    let message = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(ConfigError::SchemaValidation { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "host": {"type": "string"},
                "port": {"type": "integer"}
            },
            "required": ["host"]
        })
    }

    #[test]
    fn test_valid_instance() {
        let violations = JsonSchemaValidator
            .validate(&json!({"host": "h", "port": 1}), &schema())
            .unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_collects_all_violations() {
        let violations = JsonSchemaValidator
            .validate(&json!({"port": "not a number"}), &schema())
            .unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.path == "/port"));
    }

    #[test]
    fn test_check_reports_schema_error() {
        let err = check(&JsonSchemaValidator, &json!({"port": 1}), &schema()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_invalid_schema() {
        let err = JsonSchemaValidator
            .validate(&json!({}), &json!({"type": 12}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSchema);
    }
}
