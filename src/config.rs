//! Site configuration module.
//!
//! Handles loading, validating, and merging `statue.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is deep-merged on top, and the
//! result is deserialized and validated. Every function that reads content
//! takes the resulting [`SiteConfig`] explicitly; nothing reads ambient
//! global state.
//!
//! ## Config File Location
//!
//! `statue.toml` lives in the project directory, next to the content root:
//!
//! ```text
//! my-site/
//! ├── statue.toml
//! └── content/
//!     ├── blog/
//!     └── docs/
//! ```
//!
//! A relative `content_root` is resolved against the directory holding
//! `statue.toml`. The CLI `--source` flag (or `STATUE_CONTENT_ROOT`)
//! overrides it.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"
//! ignore = ["node_modules"]   # Exact names skipped besides ./_ prefixes
//! count_items = true          # Attach itemCount to sections
//! include_drafts = false      # Publish `draft: true` content
//! latest_count = 6            # Items listed on the home page
//!
//! [preferences]
//! path = ".statue/preferences.json"
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside the project directory.
pub const CONFIG_FILENAME: &str = "statue.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `statue.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the site's sections and content.
    pub content_root: PathBuf,
    /// Exact file or directory names to skip, in addition to names that
    /// start with `.` or `_`.
    pub ignore: Vec<String>,
    /// Whether sections report how many content items they hold.
    pub count_items: bool,
    /// Whether `draft: true` content is published.
    pub include_drafts: bool,
    /// Number of items on the home page's latest-content list.
    pub latest_count: usize,
    /// Where reader preferences are persisted.
    pub preferences: PreferencesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("content"),
            ignore: vec!["node_modules".to_string()],
            count_items: true,
            include_drafts: false,
            latest_count: 6,
            preferences: PreferencesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Config for a content root with every other setting at its default.
    pub fn for_root(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            ..Self::default()
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "content_root must not be empty".into(),
            ));
        }
        if self.ignore.iter().any(|name| name.is_empty()) {
            return Err(ConfigError::Validation(
                "ignore entries must not be empty".into(),
            ));
        }
        if self.preferences.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "preferences.path must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Anchor relative paths at `base` (the directory holding `statue.toml`).
    pub fn rebase(mut self, base: &Path) -> Self {
        if self.content_root.is_relative() {
            self.content_root = base.join(&self.content_root);
        }
        if self.preferences.path.is_relative() {
            self.preferences.path = base.join(&self.preferences.path);
        }
        self
    }
}

/// Reader preference persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreferencesConfig {
    /// JSON file holding the preference key-value store.
    pub path: PathBuf,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".statue/preferences.json"),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel scanning workers.
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
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
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
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `statue.toml` path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// validates the result, and anchors relative paths at the file's directory.
/// A missing file yields the stock defaults.
pub fn load_config(config_path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(config_path)?;
    let config = resolve_config(base, overlay)?;
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(config.rebase(dir))
}

/// Returns a fully-commented stock `statue.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Statue Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Relative paths are resolved against the directory holding this file.

# Directory holding the site's sections (first-level folders) and content
# (markdown files). Overridden by --source or STATUE_CONTENT_ROOT.
content_root = "content"

# Names skipped anywhere in the content tree. Names starting with "." or "_"
# are always skipped.
ignore = ["node_modules"]

# Attach the number of content items to each section (itemCount).
count_items = true

# Publish content whose front matter says `draft: true`.
include_drafts = false

# Number of items on the home page's latest-content list.
latest_count = 6

# ---------------------------------------------------------------------------
# Reader preferences
# ---------------------------------------------------------------------------
[preferences]
# JSON file holding persisted preferences such as the font scale.
path = ".statue/preferences.json"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel scanning workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
