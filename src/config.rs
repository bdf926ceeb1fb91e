//! Configuration loading and validation.
//!
//! Configuration lives in an optional `font-manifest.toml`. Stock defaults
//! are overridden by whatever the file sets, and command-line flags are
//! applied on top of the result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [fonts]
//! formats = ["woff2", "woff"]   # Preferred formats, best first
//! data_uris = false             # Include fonts embedded as data: URIs
//!
//! [assets]
//! extensions = [".css"]         # Files treated as stylesheets
//! only = []                     # Only process assets whose name contains one of these
//! output = "font-manifest.json" # Manifest file name inside the build directory
//! pretty = false                # Pretty-print the manifest JSON
//!
//! [groups]                      # Named output groups (e.g. one per entry point)
//! # main = ["css/app.css", "css/vendor.css"]
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [fonts]
//! formats = ["woff2"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. `dataUris` is accepted as
//! an alias of `data_uris`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no config is given.
pub const CONFIG_FILE_NAME: &str = "font-manifest.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Font selection settings used by the extraction itself.
    pub fonts: FontConfig,
    /// Stylesheet discovery and manifest output settings.
    pub assets: AssetsConfig,
    /// Named output groups: group name → asset names.
    pub groups: BTreeMap<String, Vec<String>>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fonts.validate()?;
        if self.assets.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "assets.extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self.assets.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::Validation(format!(
                "assets.extensions entries must start with '.', got {ext:?}"
            )));
        }
        if self.assets.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets.output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Font selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Accepted formats in order of preference. When a `@font-face` offers
    /// several, the one listed first here wins.
    pub formats: Vec<String>,
    /// Whether fonts embedded as `data:` URIs are included in the manifest.
    #[serde(alias = "dataUris")]
    pub data_uris: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            formats: vec!["woff2".to_string(), "woff".to_string()],
            data_uris: false,
        }
    }
}

impl FontConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formats.is_empty() {
            return Err(ConfigError::Validation(
                "fonts.formats must not be empty".into(),
            ));
        }
        if self.formats.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "fonts.formats must not contain empty entries".into(),
            ));
        }
        Ok(())
    }

    /// Position of `format` in the preference list, if accepted.
    pub fn rank(&self, format: &str) -> Option<usize> {
        self.formats.iter().position(|f| f == format)
    }
}

/// Stylesheet discovery and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Extensions (with leading dot) of files treated as stylesheets.
    pub extensions: Vec<String>,
    /// When non-empty, only assets whose name contains one of these are processed.
    pub only: Vec<String>,
    /// Manifest file name, written inside the build directory.
    pub output: String,
    /// Pretty-print the manifest JSON.
    pub pretty: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            extensions: crate::naming::STYLESHEET_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            only: Vec::new(),
            output: "font-manifest.json".to_string(),
            pretty: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel extraction workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Rename `fonts.dataUris` to `fonts.data_uris`.
///
/// The stock defaults spell out `data_uris`, so an aliased key would otherwise
/// survive the merge next to it and be rejected as a duplicate field.
fn normalize_aliases(mut value: toml::Value) -> toml::Value {
    if let Some(fonts) = value.get_mut("fonts").and_then(toml::Value::as_table_mut) {
        if let Some(data_uris) = fonts.remove("dataUris") {
            fonts.insert("data_uris".to_string(), data_uris);
        }
    }
    value
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, normalize_aliases(ov)),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `font-manifest.toml` from a directory, falling back to defaults
/// when it does not exist.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(&dir.join(CONFIG_FILE_NAME))?)
}

/// Load an explicitly named config file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    match load_raw_config(path)? {
        Some(value) => resolve_config(Some(value)),
        None => Err(ConfigError::NotFound(path.to_path_buf())),
    }
}

/// Returns a fully-commented stock `font-manifest.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# font-manifest configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Font selection
# ---------------------------------------------------------------------------
[fonts]
# Accepted font formats, most preferred first. A @font-face source whose
# format() is not listed here is never chosen.
formats = ["woff2", "woff"]

# Include fonts embedded as data: URIs. They are already inlined in the
# stylesheet, so there is usually nothing to preload.
data_uris = false

# ---------------------------------------------------------------------------
# Stylesheet discovery and output
# ---------------------------------------------------------------------------
[assets]
# Files with these extensions (query strings ignored) are scanned.
extensions = [".css"]

# Only process stylesheets whose path contains one of these substrings.
# Takes precedence over --group.
only = []

# Manifest file written into the build directory.
output = "font-manifest.json"

# Pretty-print the manifest JSON.
pretty = false

# ---------------------------------------------------------------------------
# Output groups
# ---------------------------------------------------------------------------
# Named sets of stylesheets, selected with `build --group NAME`.
[groups]
# main = ["css/app.css", "css/vendor.css"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
