//! Configuration snapshot resolved from the environment.
//!
//! The snapshot is built exactly once at process start and never mutated
//! afterwards, so it can be shared freely without synchronization.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::{Value, json};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::logger::LogLevel;

pub const KEY_APP_NAME: &str = "app.name";
pub const KEY_APP_ENV: &str = "app.env";
pub const KEY_APP_PORT: &str = "app.port";
pub const KEY_LOG_LEVEL: &str = "log.level";
pub const KEY_HEARTBEAT_SECS: &str = "heartbeat.secs";

const DEFAULT_APP_NAME: &str = "armature";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Keys that must be present for the application to start.
const REQUIRED_KEYS: &[&str] = &[KEY_APP_NAME, KEY_APP_ENV, KEY_APP_PORT, KEY_LOG_LEVEL];

/// Key fragments whose values are masked in [`ConfigSnapshot::describe`].
const SENSITIVE_MARKERS: &[&str] = &["secret", "token", "password", "credential", "apikey"];

/// Errors raised by configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required settings are absent. Fatal during initialization.
    #[error("missing required configuration: {}", keys.join(", "))]
    MissingKeys {
        /// Every required key that was unset, in declaration order
        keys: Vec<String>,
    },
}

/// The operating mode of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn is_test(self) -> bool {
        self == Environment::Test
    }
}

/// A single scalar configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ConfigValue::String(s) => json!(s),
            ConfigValue::Integer(n) => json!(n),
            ConfigValue::Boolean(b) => json!(b),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "{s}"),
            ConfigValue::Integer(n) => write!(f, "{n}"),
            ConfigValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

/// Immutable key/value view of the process configuration
///
/// Resolved once at startup from the environment (see
/// [`ConfigSnapshot::from_env`]) or assembled explicitly for embedding and
/// tests (see [`ConfigSnapshot::with_values`]). Values never change for the
/// lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    values: HashMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    /// Resolve the snapshot from the process environment.
    ///
    /// Recognized variables: `APP_ENV` (development/production/test),
    /// `PORT`, `APP_NAME`, `LOG_LEVEL` (error/warn/info/debug) and
    /// `HEARTBEAT_SECS`. Missing or unparseable values fall back to their
    /// defaults; an unrecognized `LOG_LEVEL` falls back to `info`.
    pub fn from_env() -> Self {
        Self::resolve(env::vars())
    }

    /// Build a snapshot from explicit key/value pairs.
    ///
    /// Unlike [`ConfigSnapshot::from_env`] no defaults are applied, so
    /// [`ConfigSnapshot::validate`] can actually fail for snapshots built
    /// this way.
    pub fn with_values<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn resolve(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let environment = vars
            .get("APP_ENV")
            .map(|raw| Environment::from_str(raw).unwrap_or_default())
            .unwrap_or_default();
        let port = vars
            .get("PORT")
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let app_name = vars
            .get("APP_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let log_level = vars
            .get("LOG_LEVEL")
            .map(|raw| LogLevel::from_str(raw).unwrap_or(LogLevel::Info))
            .unwrap_or(LogLevel::Info);
        let heartbeat_secs = vars
            .get("HEARTBEAT_SECS")
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);

        Self::with_values([
            (KEY_APP_ENV, ConfigValue::from(environment.to_string())),
            (KEY_APP_PORT, ConfigValue::from(i64::from(port))),
            (KEY_APP_NAME, ConfigValue::from(app_name)),
            (KEY_LOG_LEVEL, ConfigValue::from(log_level.to_string())),
            (KEY_HEARTBEAT_SECS, ConfigValue::from(heartbeat_secs as i64)),
        ])
    }

    /// Get a value by key, or the supplied default if the key is absent.
    /// Never errors.
    pub fn get(&self, key: &str, default: ConfigValue) -> ConfigValue {
        self.values.get(key).cloned().unwrap_or(default)
    }

    /// Check that every required key is present.
    ///
    /// Collects *all* missing keys into a single [`ConfigError::MissingKeys`]
    /// rather than failing on the first, so an operator can fix the whole
    /// environment in one pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !self.values.contains_key(**key))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys { keys: missing })
        }
    }

    /// Redacted view of the configuration, safe for logging.
    ///
    /// Values under credential-like keys are masked, never copied verbatim.
    pub fn describe(&self) -> Value {
        let entries: BTreeMap<&str, Value> = self
            .values
            .iter()
            .map(|(key, value)| {
                let rendered = if is_sensitive(key) {
                    json!("<redacted>")
                } else {
                    value.to_json()
                };
                (key.as_str(), rendered)
            })
            .collect();
        json!(entries)
    }

    pub fn env(&self) -> Environment {
        self.str_value(KEY_APP_ENV)
            .and_then(|raw| Environment::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn app_name(&self) -> String {
        self.str_value(KEY_APP_NAME)
            .unwrap_or(DEFAULT_APP_NAME)
            .to_string()
    }

    pub fn port(&self) -> u16 {
        self.int_value(KEY_APP_PORT)
            .and_then(|n| u16::try_from(n).ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn log_level(&self) -> LogLevel {
        self.str_value(KEY_LOG_LEVEL)
            .and_then(|raw| LogLevel::from_str(raw).ok())
            .unwrap_or(LogLevel::Info)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        let secs = self
            .int_value(KEY_HEARTBEAT_SECS)
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);
        Duration::from_secs(secs)
    }

    fn str_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(ConfigValue::as_str)
    }

    fn int_value(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(ConfigValue::as_i64)
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase().replace(['_', '-', '.'], "");
    SENSITIVE_MARKERS.iter().any(|marker| key.contains(marker))
}
