//! Lifecycle management for long-running watch sessions.
//!
//! # Data Flow
//! ```text
//! SIGTERM/SIGINT → end the watch session (watcher stopped, process exits)
//! SIGHUP         → manual reload of the watched file
//! ```

pub mod signals;
