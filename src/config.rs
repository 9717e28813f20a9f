//! Application configuration.
//!
//! Handles loading, validating and merging `config.toml`. Stock defaults are
//! serialised to a TOML table; a user file (if any) is merged on top, then the
//! result is deserialised and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "127.0.0.1:5000"       # Address the web form listens on
//! max_upload_bytes = 16777216   # Largest accepted request body
//!
//! [store]
//! upload_dir = "uploads"        # Flat directory for original_/filtered_ PNGs
//! max_assets = 10               # Retention cap; oldest files are swept first
//!
//! [canvas]
//! width = 800                   # Every upload is resized to this canvas
//! height = 600
//!
//! [filters]
//! default_intensity = 15        # Blur kernel when the form leaves it blank
//! max_intensity = 101           # Largest intensity a request may ask for
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::KernelSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub canvas: CanvasConfig,
    pub filters: FiltersConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be non-zero".into(),
            ));
        }
        // One request writes an original and a filtered asset.
        if self.store.max_assets < 2 {
            return Err(ConfigError::Validation(
                "store.max_assets must be at least 2".into(),
            ));
        }
        if self.filters.default_intensity == 0 {
            return Err(ConfigError::Validation(
                "filters.default_intensity must be at least 1".into(),
            ));
        }
        if self.filters.max_intensity > KernelSize::MAX.value() {
            return Err(ConfigError::Validation(format!(
                "filters.max_intensity must be at most {}",
                KernelSize::MAX.value()
            )));
        }
        if self.filters.default_intensity > self.filters.max_intensity {
            return Err(ConfigError::Validation(
                "filters.default_intensity must not exceed filters.max_intensity".into(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address for the HTTP listener.
    pub bind: String,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Upload store settings, passed to [`UploadStore::open`](crate::store::UploadStore::open).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub upload_dir: PathBuf,
    /// Number of files kept after each retention sweep.
    pub max_assets: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_assets: 10,
        }
    }
}

/// Fixed canvas every upload is resized to before filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Intensity used when the form omits one.
    pub default_intensity: u32,
    /// Requests above this are rejected before any work starts.
    pub max_intensity: u32,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            default_intensity: 15,
            max_intensity: 101,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load config from a TOML file, merged over stock defaults.
///
/// A missing file is not an error: the stock defaults are returned.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = if path.exists() {
        let content = fs::read_to_string(path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        merge_toml(base, overlay)
    } else {
        base
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# snapfilter configuration
# ========================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Address the upload form listens on.
bind = "127.0.0.1:5000"

# Largest accepted upload request, in bytes.
max_upload_bytes = 16777216

# ---------------------------------------------------------------------------
# Upload store
# ---------------------------------------------------------------------------
[store]
# Flat directory holding original_<name>.png and filtered_<name>.png.
upload_dir = "uploads"

# Files kept after each upload; the oldest are deleted first.
max_assets = 10

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[canvas]
# Every upload is resized to exactly this size before filtering.
width = 800
height = 600

# ---------------------------------------------------------------------------
# Filters
# ---------------------------------------------------------------------------
[filters]
# Blur kernel size used when the form leaves intensity empty.
# Even values are rounded up to the next odd number.
default_intensity = 15

# Largest blur intensity a request may ask for. Larger values are rejected.
max_intensity = 101
"##
}
