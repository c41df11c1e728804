//! funcbridge-core — process-wide settings.
//!
//! [`Settings`] is built once at process start (from an optional
//! `funcbridge.toml` plus the process environment) and then handed to the
//! adapter and to any handler that needs it. Nothing in funcbridge reads
//! the environment after startup.

pub mod config;

pub use config::{ConfigError, Settings};
