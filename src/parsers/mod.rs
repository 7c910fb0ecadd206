//! Format parsers.
//!
//! # Data Flow
//! ```text
//! path
//!     → Format::detect (file name / extension)
//!     → read_source (I/O errors classified)
//!     → flat.rs       (.env, .ini line grammar)
//!     → structured.rs (YAML, JSON, TOML grammar crates)
//!     → xml.rs        (shallow root-children projection)
//!     → ParsedConfig (raw, before validation and substitution)
//! ```
//!
//! # Design Decisions
//! - Closed set of formats; dispatch is one exhaustive match
//! - Parsers only produce raw values; substitution runs separately

pub mod flat;
pub mod structured;
pub mod xml;

use std::fmt;
use std::path::Path;

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ParsedConfig;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Env,
    Ini,
    Yaml,
    Json,
    Toml,
    Xml,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Env,
        Format::Ini,
        Format::Yaml,
        Format::Json,
        Format::Toml,
        Format::Xml,
    ];

    /// Select the format for a path.
    ///
    /// A base name of exactly `.env` always selects [`Format::Env`];
    /// otherwise the lower-cased extension decides.
    pub fn detect(path: &Path) -> ConfigResult<Format> {
        if path.file_name().is_some_and(|name| name == ".env") {
            return Ok(Format::Env);
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Format::from_extension(&extension).ok_or_else(|| ConfigError::UnsupportedFileType {
            extension: if extension.is_empty() {
                String::new()
            } else {
                format!(".{}", extension)
            },
        })
    }

    /// Map a lower-case extension (without the dot) to a format.
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension {
            "env" => Some(Format::Env),
            "ini" => Some(Format::Ini),
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Format::Env => ".env",
            Format::Ini => "INI",
            Format::Yaml => "YAML",
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Xml => "XML",
        }
    }

    /// Only YAML and JSON documents are checked against a schema.
    pub fn supports_schema(self) -> bool {
        matches!(self, Format::Yaml | Format::Json)
    }

    /// Parse `path` into a raw configuration.
    pub fn parse(self, path: &Path) -> ConfigResult<ParsedConfig> {
        let source = read_source(self, path)?;
        self.parse_str(path, &source)
    }

    /// Parse already-read content. `path` is only used in error messages.
    pub fn parse_str(self, path: &Path, source: &str) -> ConfigResult<ParsedConfig> {
        match self {
            Format::Env => flat::parse_env(path, source),
            Format::Ini => flat::parse_ini(path, source),
            Format::Yaml => structured::parse_yaml(path, source),
            Format::Json => structured::parse_json(path, source),
            Format::Toml => structured::parse_toml(path, source),
            Format::Xml => xml::parse_xml(path, source),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read a whole file, classifying I/O failures.
pub(crate) fn read_source(format: Format, path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::from_io(format, path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(Format::detect(Path::new("a.ini")).unwrap(), Format::Ini);
        assert_eq!(Format::detect(Path::new("a.YAML")).unwrap(), Format::Yaml);
        assert_eq!(Format::detect(Path::new("a.yml")).unwrap(), Format::Yaml);
        assert_eq!(Format::detect(Path::new("conf/a.Json")).unwrap(), Format::Json);
        assert_eq!(Format::detect(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(Format::detect(Path::new("a.xml")).unwrap(), Format::Xml);
        assert_eq!(Format::detect(Path::new("prod.env")).unwrap(), Format::Env);
    }

    #[test]
    fn test_detect_dotenv_base_name() {
        assert_eq!(Format::detect(Path::new(".env")).unwrap(), Format::Env);
        assert_eq!(Format::detect(Path::new("/srv/app/.env")).unwrap(), Format::Env);
    }

    #[test]
    fn test_detect_unsupported() {
        let err = Format::detect(Path::new("settings.cfg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFileType);
        assert_eq!(err.to_string(), "Unsupported file type: .cfg");

        let err = Format::detect(Path::new("Makefile")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFileType);
    }

    #[test]
    fn test_schema_support() {
        let supported: Vec<_> = Format::ALL
            .into_iter()
            .filter(|f| f.supports_schema())
            .collect();
        assert_eq!(supported, vec![Format::Yaml, Format::Json]);
    }
}
