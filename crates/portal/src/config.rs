//! Configuration management for the Gridview portal.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/gridview/config.toml`.

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid::UserType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("bind must be a socket address like 127.0.0.1:8080, got {0}")]
    InvalidBind(String),

    #[error("zone must be a non-empty name without '/', got {0:?}")]
    InvalidZone(String),

    #[error("idle_timeout_secs must be between 60 and 86400 seconds, got {0}")]
    InvalidIdleTimeout(u64),

    #[error("user_header must be a non-empty header name, got {0:?}")]
    InvalidUserHeader(String),

    #[error("user {0} is configured more than once")]
    DuplicateUser(String),

    #[error("default_user {0} is not a configured user")]
    UnknownDefaultUser(String),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default zone name.
pub const DEFAULT_ZONE: &str = "tempZone";

/// Main configuration structure for the Gridview portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Grid backend configuration.
    pub grid: GridConfig,

    /// Principal extraction.
    pub auth: AuthConfig,

    /// Session lifetime.
    pub session: SessionConfig,

    /// Presentation settings.
    pub ui: UiConfig,

    /// Known grid accounts.
    pub users: Vec<UserEntry>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Directory for daily rolling log files. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

/// Grid backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Zone name, the first segment of every namespace path.
    pub zone: String,

    /// Local directory holding the zone's namespace.
    pub root: PathBuf,

    /// Storage resources offered in the UI.
    pub resources: Vec<ResourceEntry>,
}

/// A configured storage resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceEntry {
    /// Resource name.
    pub name: String,

    /// Resource type.
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Host serving the resource.
    #[serde(default = "default_resource_host")]
    pub host: String,
}

/// Principal extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Header set by the authenticating reverse proxy.
    pub user_header: String,

    /// Principal used when the header is missing. No fallback when unset.
    pub default_user: Option<String>,
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session and its navigation state are dropped.
    pub idle_timeout_secs: u64,
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct UiConfig {
    /// Banner text shown above every page.
    pub header: String,
}

/// A configured grid account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEntry {
    /// Account name.
    pub username: String,

    /// Account role.
    #[serde(default)]
    pub user_type: UserType,

    /// Whether uploads always overwrite existing data objects.
    #[serde(default)]
    pub force_file_overwriting: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE.to_string(),
            root: default_grid_root(),
            resources: vec![ResourceEntry {
                name: "demoResc".to_string(),
                resource_type: default_resource_type(),
                host: default_resource_host(),
            }],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: "x-remote-user".to_string(),
            default_user: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800, // 30 minutes
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridview")
        .join("config.toml")
}

/// Returns the default local grid root.
fn default_grid_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridview")
        .join("grid")
}

fn default_resource_type() -> String {
    "unixfilesystem".to_string()
}

fn default_resource_host() -> String {
    "localhost".to_string()
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - GRIDVIEW_BIND: Override the listen address
    /// - GRIDVIEW_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    /// - GRIDVIEW_GRID_ROOT: Override the local grid root directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("GRIDVIEW_BIND") {
            if !bind.is_empty() {
                tracing::info!("Overriding bind from environment: {}", bind);
                self.server.bind = bind;
            }
        }

        if let Ok(level) = std::env::var("GRIDVIEW_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.server.log_level = level;
            }
        }

        if let Ok(root) = std::env::var("GRIDVIEW_GRID_ROOT") {
            if !root.is_empty() {
                tracing::info!("Overriding grid root from environment: {}", root);
                self.grid.root = PathBuf::from(root);
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidBind(self.server.bind.clone()));
        }

        let zone = &self.grid.zone;
        if zone.is_empty() || zone.contains('/') {
            return Err(ConfigError::InvalidZone(zone.clone()));
        }

        let timeout = self.session.idle_timeout_secs;
        if !(60..=86_400).contains(&timeout) {
            return Err(ConfigError::InvalidIdleTimeout(timeout));
        }

        if self.auth.user_header.trim().is_empty() {
            return Err(ConfigError::InvalidUserHeader(self.auth.user_header.clone()));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::DuplicateUser(user.username.clone()));
            }
        }

        if let Some(default_user) = &self.auth.default_user {
            if !seen.contains(default_user.as_str()) {
                return Err(ConfigError::UnknownDefaultUser(default_user.clone()));
            }
        }

        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Parsed listen address. Call [`Config::validate`] first.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
