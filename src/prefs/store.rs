use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// Key of the persisted mute flag.
pub const MUTED_KEY: &str = "muted";

/// Sound is off until the user turns it on.
pub const DEFAULT_MUTED: bool = true;

/// Small key/value store that persists across sessions.
pub trait PreferenceStore {
    /// Raw value stored under `key`.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: serde_json::Value) -> SuperzoomResult<()>;

    /// Boolean under `key`, or `default` when absent or not a boolean.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Store a boolean under `key`.
    fn set_bool(&mut self, key: &str, value: bool) -> SuperzoomResult<()> {
        self.set(key, serde_json::Value::Bool(value))
    }
}

/// Current mute flag.
pub fn is_muted(store: &dyn PreferenceStore) -> bool {
    store.get_bool(MUTED_KEY, DEFAULT_MUTED)
}

/// Persist the mute flag.
pub fn set_muted(store: &mut dyn PreferenceStore, muted: bool) -> SuperzoomResult<()> {
    store.set_bool(MUTED_KEY, muted)
}

/// Non-persistent store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, serde_json::Value>,
}

impl MemoryPreferences {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> SuperzoomResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept in a JSON object file, rewritten on every `set`.
#[derive(Clone, Debug)]
pub struct JsonPreferences {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl JsonPreferences {
    /// `<config dir>/superzoom/preferences.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("superzoom").join("preferences.json"))
    }

    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is logged and replaced
    /// by an empty store on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&bytes) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read preferences file");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    /// Open the store at [`default_path`](Self::default_path).
    pub fn open_default() -> SuperzoomResult<Self> {
        let path = Self::default_path()
            .ok_or_else(|| SuperzoomError::validation("no config directory on this platform"))?;
        Ok(Self::open(path))
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> SuperzoomResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create preferences dir '{}'", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(&self.values)
            .map_err(|e| SuperzoomError::serde(format!("serialize preferences: {e}")))?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write preferences '{}'", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> SuperzoomResult<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prefs/store.rs"]
mod tests;
