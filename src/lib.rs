//! Multi-format configuration loader.
//!
//! Loads `.env`, `.ini`, YAML, JSON, TOML and XML files into one generic
//! mapping, optionally checks them against a JSON schema, substitutes
//! `${NAME}` environment placeholders and can keep the result in sync with
//! the file on disk.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod parsers;

pub use config::{
    load_config, ConfigError, ConfigLoader, ConfigWatcher, ErrorKind, ParsedConfig,
};
pub use parsers::Format;
