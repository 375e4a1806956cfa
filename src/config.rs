//! Configuration for the column-store session backend
//!
//! Configuration can come from defaults, a configuration file
//! (TOML, JSON, YAML) or `SESSION`-prefixed environment variables.

use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the session store and its maintenance jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Column store host
    #[serde(default = "default_host")]
    pub host: String,

    /// Column store native-protocol port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username; auth is enabled only when a password is also set
    #[serde(default)]
    pub username: Option<String>,

    /// Password; auth is enabled only when a username is also set
    #[serde(default)]
    pub password: Option<String>,

    /// Connection-establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Read/write timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Reuse one connection across requests where the client supports it
    #[serde(default)]
    pub persistent_connection: bool,

    /// Keyspace holding the session tables
    #[serde(default = "default_db")]
    pub db: String,

    /// Lock value at which a contended lock is forcibly reclaimed
    #[serde(default = "default_break_after")]
    pub break_after: i64,

    /// Denied acquisition attempts before a read gives up with empty content
    #[serde(default = "default_fail_after")]
    pub fail_after: u32,

    /// Session TTL in seconds, attached to every session-row write
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime: u32,

    /// Delay between lock acquisition attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Directory containing the `nodetool` executable; resolved from PATH if unset
    #[serde(default)]
    pub nodetool_path: Option<PathBuf>,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9042
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_db() -> String {
    "sessions".to_string()
}

fn default_break_after() -> i64 {
    30
}

fn default_fail_after() -> u32 {
    15
}

fn default_session_lifetime() -> u32 {
    86400
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            connect_timeout: default_connect_timeout(),
            timeout: default_timeout(),
            persistent_connection: false,
            db: default_db(),
            break_after: default_break_after(),
            fail_after: default_fail_after(),
            session_lifetime: default_session_lifetime(),
            retry_delay_ms: default_retry_delay_ms(),
            nodetool_path: None,
        }
    }
}

impl StoreConfig {
    /// Credentials for the column store, present only when both
    /// username and password are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user, pass))
            }
            _ => None,
        }
    }

    /// Delay between lock acquisition attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Session TTL as a duration
    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(u64::from(self.session_lifetime))
    }
}

/// Load configuration from a file, overlaid with `SESSION`-prefixed
/// environment variables.
///
/// Supports TOML, JSON, and YAML formats based on file extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SessionError::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("SESSION").separator("__"))
        .build()?;

    let config: StoreConfig = settings.try_deserialize()?;

    tracing::info!("Configuration loaded from {}", path.display());

    Ok(config)
}

/// Load configuration with defaults if the file doesn't exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> StoreConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            StoreConfig::default()
        }
    }
}
