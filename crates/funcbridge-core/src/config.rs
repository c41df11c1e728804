//! funcbridge.toml configuration parser and environment overlay.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Port variable the functions host sets for custom handlers.
pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const HTTP_BINDING_VAR: &str = "FUNCBRIDGE_HTTP_BINDING";
pub const QUEUE_BINDING_VAR: &str = "FUNCBRIDGE_QUEUE_BINDING";
pub const BODY_DUMP_VAR: &str = "FUNCBRIDGE_BODY_DUMP";
pub const LOG_VAR: &str = "FUNCBRIDGE_LOG";

/// Errors raised while loading or reading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no {0} specified")]
    Missing(String),

    #[error("invalid {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Read-only settings for one process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Binding name of the HTTP trigger inside the envelope's `Data`.
    #[serde(default = "default_http_binding")]
    pub http_binding: String,
    /// Binding name of the queue trigger consumed by non-HTTP functions.
    #[serde(default = "default_queue_binding")]
    pub queue_binding: String,
    #[serde(default)]
    pub body_dump: bool,
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Free-form values handlers look up by name (app ids, secrets, ...).
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_port() -> u16 {
    8080
}

fn default_http_binding() -> String {
    "req".to_string()
}

fn default_queue_binding() -> String {
    "msg".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            http_binding: default_http_binding(),
            queue_binding: default_queue_binding(),
            body_dump: false,
            log_filter: None,
            env: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings the way the binary does at startup: the optional file
    /// first, then the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_vars(utf8_vars(std::env::vars_os()))
    }

    /// Overlay environment variables onto these settings.
    ///
    /// Well-known variables override the typed fields; every variable is
    /// also made visible through [`Settings::var`], replacing file entries
    /// with the same name.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                PORT_VAR => self.port = parse_value(&key, &value)?,
                HTTP_BINDING_VAR => self.http_binding = value.clone(),
                QUEUE_BINDING_VAR => self.queue_binding = value.clone(),
                BODY_DUMP_VAR => self.body_dump = parse_flag(&key, &value)?,
                LOG_VAR => self.log_filter = Some(value.clone()),
                _ => {}
            }
            self.env.insert(key, value);
        }
        Ok(self)
    }

    /// Look up a free-form setting.
    pub fn var(&self, key: &str) -> Result<&str, ConfigError> {
        self.env
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Look up a free-form setting and parse it.
    pub fn parse_var<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, self.var(key)?)
    }
}

/// Keep the variables whose name and value are both UTF-8; others cannot
/// be looked up by name and are skipped.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
