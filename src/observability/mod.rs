//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader / watcher
//!     → tracing events (structured fields: path, format, error)
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```

pub mod logging;
