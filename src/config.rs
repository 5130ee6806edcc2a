//! Server configuration module.
//!
//! Handles loading and validating `config.toml`. The loaded
//! [`ServerConfig`] is passed explicitly into the web layer at startup; there
//! is no process-wide configuration state.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "127.0.0.1:5000"       # Listen address
//! max_upload_bytes = 16777216   # Request body limit (16 MiB)
//!
//! [storage]
//! upload_dir = "uploads"        # Raw uploads, served at /uploads/
//! result_dir = "static"         # Processed images, served at /static/
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Command-line flags are
//! applied on top of the file with [`ServerConfig::apply_overrides`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener settings.
    pub server: ListenConfig,
    /// Upload and result directories.
    pub storage: StorageConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    /// Socket address to bind.
    pub bind: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Filesystem layout for uploads and results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding raw uploads.
    pub upload_dir: PathBuf,
    /// Directory holding processed images.
    pub result_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            result_dir: PathBuf::from("static"),
        }
    }
}

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub upload_dir: Option<PathBuf>,
    pub result_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be greater than 0".into(),
            ));
        }
        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.upload_dir must not be empty".into(),
            ));
        }
        if self.storage.result_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.result_dir must not be empty".into(),
            ));
        }
        if self.storage.upload_dir == self.storage.result_dir {
            return Err(ConfigError::Validation(
                "storage.upload_dir and storage.result_dir must differ".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides, then re-validate.
    pub fn apply_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(dir) = overrides.upload_dir {
            self.storage.upload_dir = dir;
        }
        if let Some(dir) = overrides.result_dir {
            self.storage.result_dir = dir;
        }
        self.validate()?;
        Ok(self)
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Load the config file at `path`.
///
/// Every section and key is `#[serde(default)]`, so a sparse file only
/// replaces the values it names. Unknown keys are rejected and the result is
/// validated. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let config = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ServerConfig::default(),
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-converter configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Command-line flags (--bind, --upload-dir, --result-dir) override
# the values in this file.

# ---------------------------------------------------------------------------
# HTTP listener
# ---------------------------------------------------------------------------
[server]
# Address and port to listen on.
bind = "127.0.0.1:5000"

# Largest accepted request body in bytes (uploads included).
max_upload_bytes = 16777216

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Raw uploads, stored under a content hash and served at /uploads/<name>.
upload_dir = "uploads"

# Processed images, served at /static/<name>. Files accumulate; nothing
# is cleaned up automatically.
result_dir = "static"
"##
}
