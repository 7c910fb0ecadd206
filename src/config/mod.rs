//! Configuration loading subsystem.
//!
//! # Data Flow
//! ```text
//! config file (.env / .ini / YAML / JSON / TOML / XML)
//!     → parsers (format dispatch & raw parse)
//!     → validation.rs (schema check, YAML/JSON only)
//!     → substitution.rs (${NAME} placeholders)
//!     → ParsedConfig (fully owned)
//!
//! On modification event:
//!     watcher.rs detects change
//!     → loader.rs reruns the pipeline
//!     → atomic swap of Arc<ParsedConfig>, or keep the old one on failure
//! ```
//!
//! # Design Decisions
//! - The top level of a loaded config is always a mapping
//! - Substitution is all-or-nothing
//! - Loads are synchronous; only the watcher introduces another thread

pub mod error;
pub mod loader;
pub mod substitution;
pub mod validation;
pub mod value;
pub mod watcher;

pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use loader::{load_config, ConfigLoader};
pub use substitution::{substitute, substitute_with, EnvSource, ProcessEnv};
pub use validation::{JsonSchemaValidator, SchemaValidator, Violation};
pub use value::{ConfigValue, ParsedConfig};
pub use watcher::{
    ConfigHandle, ConfigWatcher, EventCallback, EventSource, ManualEventSource,
    NotifyEventSource, Subscription, WatcherState,
};
