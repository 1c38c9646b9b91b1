//! Reader preferences persisted in a key-value store.
//!
//! The only preference today is the font scale: a multiplier the rendering
//! layer applies through the `--font-scale` CSS custom property. It is stored
//! under [`FONT_SCALE_KEY`] as a decimal string.
//!
//! # Storage
//!
//! [`PreferenceStore`] is the seam between the preference logic and where
//! values live. [`FileStore`] keeps one flat JSON object on disk:
//!
//! ```json
//! { "statue:fontScale": "1.2" }
//! ```
//!
//! Every read goes to disk, so two processes sharing the file see each
//! other's writes. Each write goes to a temp file unique to the writing
//! process, is synced, and is renamed over the original, so a crash never
//! leaves half a file behind. Keys this crate does not know, and values that
//! are not strings, survive writes. A file that is not a JSON object is
//! treated as empty and replaced on the next write.
//!
//! # Font scale rules
//!
//! - Bounds `0.5..=1.5`, step `0.1`, default `1.0`.
//! - A missing, unparsable or non-finite stored value loads as the default;
//!   anything else is clamped into bounds.
//! - Every new value is rounded to two decimals, so stepping up and back
//!   down lands on the same number.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

pub const FONT_SCALE_KEY: &str = "statue:fontScale";
pub const FONT_SCALE_MIN: f64 = 0.5;
pub const FONT_SCALE_MAX: f64 = 1.5;
pub const FONT_SCALE_STEP: f64 = 0.1;
pub const FONT_SCALE_DEFAULT: f64 = 1.0;

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where preference values live.
pub trait PreferenceStore {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PreferenceError>;
}

/// In-memory store, for tests and embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.values.remove(key);
        Ok(())
    }
}

/// On-disk layout of a [`FileStore`]. Values this crate did not write (numbers,
/// nested objects) are kept as they are.
type StoredValues = Map<String, Value>;

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. A missing file, or one that is not a JSON object, reads
    /// as empty.
    fn load(&self) -> Result<StoredValues, PreferenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredValues::new());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(values)) => Ok(values),
            Ok(_) => {
                warn!(path = %self.path.display(), "ignoring preferences that are not a JSON object");
                Ok(StoredValues::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable preferences");
                Ok(StoredValues::new())
            }
        }
    }

    /// Write through a temp file unique to this process, then rename it over
    /// the store.
    fn save(&self, values: &StoredValues) -> Result<(), PreferenceError> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let json = serde_json::to_string_pretty(values)?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{}.{}.{}.tmp", file_name, std::process::id(), nanos));

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    /// String values come back as they are; any other JSON value comes back
    /// as its JSON text.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load()?.remove(key).map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Clamp into bounds and round to two decimals. Non-finite input yields the default.
pub fn normalize_scale(scale: f64) -> f64 {
    if !scale.is_finite() {
        return FONT_SCALE_DEFAULT;
    }
    let rounded = (scale * 100.0).round() / 100.0;
    rounded.clamp(FONT_SCALE_MIN, FONT_SCALE_MAX)
}

/// Interpret a stored value.
pub fn parse_stored_scale(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(normalize_scale)
        .unwrap_or(FONT_SCALE_DEFAULT)
}

/// Shortest decimal form: `1`, `1.1`, `0.5`.
pub fn format_scale(scale: f64) -> String {
    format!("{scale}")
}

/// CSS declaration the rendering layer puts on the document root.
pub fn css_declaration(scale: f64) -> String {
    format!("--font-scale: {}", format_scale(scale))
}

/// The reader's font scale, backed by a preference store.
#[derive(Debug)]
pub struct FontScale<S: PreferenceStore> {
    store: S,
    value: f64,
}

impl<S: PreferenceStore> FontScale<S> {
    /// Read the stored scale, falling back to the default.
    pub fn load(store: S) -> Result<Self, PreferenceError> {
        let raw = store.get(FONT_SCALE_KEY)?;
        let value = parse_stored_scale(raw.as_deref());
        Ok(Self { store, value })
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    /// Clamp, persist and return the new scale.
    pub fn set(&mut self, scale: f64) -> Result<f64, PreferenceError> {
        let next = normalize_scale(scale);
        self.store.set(FONT_SCALE_KEY, &format_scale(next))?;
        self.value = next;
        Ok(next)
    }

    pub fn increase(&mut self) -> Result<f64, PreferenceError> {
        self.set(self.value + FONT_SCALE_STEP)
    }

    pub fn decrease(&mut self) -> Result<f64, PreferenceError> {
        self.set(self.value - FONT_SCALE_STEP)
    }

    pub fn reset(&mut self) -> Result<f64, PreferenceError> {
        self.set(FONT_SCALE_DEFAULT)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
