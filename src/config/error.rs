//! Error taxonomy for configuration loading.
//!
//! # Responsibilities
//! - One error family for every failure a load can produce
//! - Carry the path, offending line or variable name for diagnostics
//!
//! # Design Decisions
//! - Parsers never swallow errors; they propagate unchanged to the caller
//! - `kind()` gives a fieldless discriminant for matching in callers and tests

use std::path::PathBuf;
use thiserror::Error;

use crate::parsers::Format;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The target file does not exist.
    #[error("{format} file not found: {}", path.display())]
    NotFound { format: Format, path: PathBuf },

    /// The file exists but cannot be read.
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Content violates the grammar of its format.
    #[error("Error parsing {format} file {}: {message}", path.display())]
    MalformedInput {
        format: Format,
        path: PathBuf,
        message: String,
    },

    /// The file name or extension is not one of the recognized formats.
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    /// The raw parsed value violates the supplied schema.
    #[error("Schema validation error: {message}")]
    SchemaValidation { message: String },

    /// The supplied schema could not be compiled.
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    /// A `${NAME}` placeholder referenced an unset or empty variable.
    #[error("Environment variable {name} not found.")]
    MissingEnvironmentVariable { name: String },

    /// Subscribing to filesystem events failed.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Fieldless discriminant of [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    MalformedInput,
    UnsupportedFileType,
    SchemaValidation,
    InvalidSchema,
    MissingEnvironmentVariable,
    Watch,
}

impl ConfigError {
    /// Classify this error without inspecting its fields.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::NotFound { .. } => ErrorKind::NotFound,
            ConfigError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ConfigError::MalformedInput { .. } => ErrorKind::MalformedInput,
            ConfigError::UnsupportedFileType { .. } => ErrorKind::UnsupportedFileType,
            ConfigError::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            ConfigError::InvalidSchema { .. } => ErrorKind::InvalidSchema,
            ConfigError::MissingEnvironmentVariable { .. } => {
                ErrorKind::MissingEnvironmentVariable
            }
            ConfigError::Watch(_) => ErrorKind::Watch,
        }
    }

    pub(crate) fn malformed(format: Format, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::MalformedInput {
            format,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map an I/O failure on `path` to the matching subkind.
    pub(crate) fn from_io(format: Format, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound { format, path },
            std::io::ErrorKind::PermissionDenied => ConfigError::PermissionDenied { path },
            _ => ConfigError::MalformedInput {
                format,
                path,
                message: err.to_string(),
            },
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let err = ConfigError::from_io(
            Format::Yaml,
            "app.yaml",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "YAML file not found: app.yaml");

        let err = ConfigError::from_io(
            Format::Ini,
            "a.ini",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("a.ini"));

        let err = ConfigError::from_io(
            Format::Toml,
            "a.toml",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        );
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingEnvironmentVariable { name: "HOST".into() };
        assert_eq!(err.to_string(), "Environment variable HOST not found.");

        let err = ConfigError::UnsupportedFileType { extension: ".cfg".into() };
        assert_eq!(err.to_string(), "Unsupported file type: .cfg");
    }
}
