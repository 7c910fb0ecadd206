//! Configuration loading from disk.
//!
//! # Pipeline
//! ```text
//! Format::detect → Format::parse → (schema check, YAML/JSON only)
//!     → substitution → optional env export → ParsedConfig
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::error::ConfigResult;
use crate::config::substitution::{substitute_with, EnvSource, ProcessEnv};
use crate::config::validation::{check, JsonSchemaValidator, SchemaValidator};
use crate::config::value::ParsedConfig;
use crate::parsers::Format;

/// Load a configuration file, dispatching on its name and extension.
///
/// When `schema` is given and the format is YAML or JSON, the raw value is
/// validated before placeholders are substituted.
pub fn load_config(path: impl AsRef<Path>, schema: Option<&Value>) -> ConfigResult<ParsedConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(schema) = schema {
        loader = loader.schema(schema.clone());
    }
    loader.load(path)
}

/// Configurable loading pipeline.
#[derive(Clone)]
pub struct ConfigLoader {
    format: Option<Format>,
    schema: Option<Value>,
    validator: Arc<dyn SchemaValidator>,
    env: Arc<dyn EnvSource>,
    export_to_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("format", &self.format)
            .field("schema", &self.schema.is_some())
            .field("export_to_env", &self.export_to_env)
            .finish()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            format: None,
            schema: None,
            validator: Arc::new(JsonSchemaValidator),
            env: Arc::new(ProcessEnv),
            export_to_env: false,
        }
    }

    /// Force a format instead of detecting it from the path.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the source of placeholder values (defaults to the process environment).
    pub fn env_source(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    /// Opt in to exporting top-level string entries into the process
    /// environment after a successful load. Variables that are already set
    /// are left alone.
    pub fn export_to_env(mut self, enabled: bool) -> Self {
        self.export_to_env = enabled;
        self
    }

    /// The format this loader would use for `path`.
    pub fn resolve_format(&self, path: &Path) -> ConfigResult<Format> {
        match self.format {
            Some(format) => Ok(format),
            None => Format::detect(path),
        }
    }

    /// Run the full pipeline on `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<ParsedConfig> {
        let path = path.as_ref();
        let result = self.try_load(path);
        if let Err(e) = &result {
            tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
        }
        result
    }

    /// The pipeline without the failure log, for callers that report
    /// failures in their own terms.
    pub(crate) fn try_load(&self, path: &Path) -> ConfigResult<ParsedConfig> {
        let format = self.resolve_format(path)?;
        let raw = format.parse(path)?;

        if let Some(schema) = &self.schema {
            if format.supports_schema() {
                check(self.validator.as_ref(), &raw.to_value(), schema)?;
            } else {
                tracing::debug!(%format, "Schema ignored for format without schema support");
            }
        }

        let config = substitute_with(raw, self.env.as_ref())?;

        if self.export_to_env {
            export(&config);
        }

        tracing::debug!(path = %path.display(), %format, entries = config.len(), "Configuration loaded");
        Ok(config)
    }
}

fn export(config: &ParsedConfig) {
    for (key, value) in config.iter() {
        let Value::String(s) = value else { continue };
        if key.is_empty() || key.contains('=') || key.contains('\0') || s.contains('\0') {
            continue;
        }
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use crate::config::validation::Violation;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingValidator(AtomicUsize);

    impl SchemaValidator for CountingValidator {
        fn validate(&self, _: &Value, _: &Value) -> ConfigResult<Vec<Violation>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Violation {
                path: String::new(),
                message: "always wrong".into(),
            }])
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn vars(pairs: &[(&str, &str)]) -> Arc<dyn EnvSource> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(map)
    }

    #[test]
    fn test_validation_only_for_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        let validator = Arc::new(CountingValidator(AtomicUsize::new(0)));
        let loader = ConfigLoader::new()
            .schema(json!({"type": "object"}))
            .validator(validator.clone());

        let toml = write(&dir, "a.toml", "x = 1\n");
        assert!(loader.load(&toml).is_ok());
        let ini = write(&dir, "a.ini", "[a]\nx=1\n");
        assert!(loader.load(&ini).is_ok());
        assert_eq!(validator.0.load(Ordering::SeqCst), 0);

        let yaml = write(&dir, "a.yaml", "x: 1\n");
        let err = loader.load(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
        assert_eq!(validator.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validation_runs_before_substitution() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.json", r#"{"port": "${PORT}"}"#);
        // The raw placeholder is a string, so an integer schema rejects it
        // even though the variable would resolve to digits.
        let loader = ConfigLoader::new()
            .schema(json!({"properties": {"port": {"type": "integer"}}}))
            .env_source(vars(&[("PORT", "8080")]));

        let err = loader.load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    }

    #[test]
    fn test_schema_failure_skips_substitution() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.yaml", "host: ${UNSET_FOR_THIS_TEST}\n");
        let loader = ConfigLoader::new()
            .schema(json!({"required": ["port"]}))
            .env_source(vars(&[]));

        let err = loader.load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    }

    #[test]
    fn test_forced_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "settings.cfg", "[main]\nmode=fast\n");
        let config = ConfigLoader::new().format(Format::Ini).load(&path).unwrap();
        assert_eq!(config, json!({"main": {"mode": "fast"}}));
    }

    #[test]
    fn test_custom_env_source() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.toml", "host = \"${SERVICE_HOST}\"\n");
        let config = ConfigLoader::new()
            .env_source(vars(&[("SERVICE_HOST", "10.0.0.1")]))
            .load(&path)
            .unwrap();
        assert_eq!(config.get("host"), Some(&json!("10.0.0.1")));
    }
}
