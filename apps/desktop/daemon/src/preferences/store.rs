//! Typed settings store persisted as a flat JSON file.
//!
//! Only values that differ from the schema default are written. Saving goes through a
//! temp file and a rename so a crash never leaves a truncated file behind.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::keys::{SettingSchema, ValueKind, schema};
use crate::ignore_poison::IgnorePoison;

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnknownKey(String),
    NotWritable(String),
    TypeMismatch { key: String, expected: &'static str },
    InvalidChoice { key: String, value: String },
    Io { path: String, message: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "Unknown setting: {}", key),
            Self::NotWritable(key) => write!(f, "Setting is not writable: {}", key),
            Self::TypeMismatch { key, expected } => write!(f, "Setting {} expects a {}", key, expected),
            Self::InvalidChoice { key, value } => write!(f, "'{}' is not a valid value for {}", value, key),
            Self::Io { path, message } => write!(f, "Settings file error at {}: {}", path, message),
        }
    }
}

impl std::error::Error for SettingsError {}

/// What changed about a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    Value(String),
    Writable(String),
}

impl SettingsChange {
    pub fn key(&self) -> &str {
        match self {
            Self::Value(key) | Self::Writable(key) => key,
        }
    }
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    schema: HashMap<&'static str, SettingSchema>,
    values: Mutex<Map<String, Value>>,
    locked: Mutex<HashSet<String>>,
    changes: broadcast::Sender<SettingsChange>,
}

impl SettingsStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::with_values(None, Map::new())
    }

    /// Loads settings from `path`. A missing file means all defaults. A file that can't
    /// be parsed is logged and ignored, so a broken file never blocks startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("Settings file {} is not a JSON object, using defaults", path.display());
                    Map::new()
                }
                Err(e) => {
                    log::warn!("Couldn't parse settings file {}: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("Couldn't read settings file {}: {}", path.display(), e);
                Map::new()
            }
        };
        Self::with_values(Some(path), values)
    }

    fn with_values(path: Option<PathBuf>, raw: Map<String, Value>) -> Self {
        let schema: HashMap<&'static str, SettingSchema> = schema().into_iter().map(|s| (s.key, s)).collect();

        // Drop unknown keys and values of the wrong type rather than failing on them later
        let values = raw
            .into_iter()
            .filter(|(key, value)| match schema.get(key.as_str()) {
                Some(entry) if validate(entry, value).is_ok() => true,
                _ => {
                    log::debug!("Ignoring stored setting {}={}", key, value);
                    false
                }
            })
            .collect();

        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            path,
            schema,
            values: Mutex::new(values),
            locked: Mutex::new(HashSet::new()),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The effective value: the stored one, else the schema default.
    pub fn get(&self, key: &str) -> Result<Value, SettingsError> {
        let entry = self.entry(key)?;
        Ok(self
            .values
            .lock_ignore_poison()
            .get(key)
            .cloned()
            .unwrap_or_else(|| entry.default.clone()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, SettingsError> {
        let value = self.get(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, ValueKind::Bool))
    }

    pub fn get_string(&self, key: &str) -> Result<String, SettingsError> {
        let value = self.get(key)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(key, ValueKind::String))
    }

    pub fn get_u64(&self, key: &str) -> Result<u64, SettingsError> {
        let value = self.get(key)?;
        value.as_u64().ok_or_else(|| mismatch(key, ValueKind::Uint64))
    }

    pub fn get_strv(&self, key: &str) -> Result<Vec<String>, SettingsError> {
        let value = self.get(key)?;
        value
            .as_array()
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .ok_or_else(|| mismatch(key, ValueKind::StringList))
    }

    /// Stores `value`, persists and notifies. Setting the current value is a no-op.
    pub fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let entry = self.entry(key)?;
        if !self.is_writable(key) {
            return Err(SettingsError::NotWritable(key.to_string()));
        }
        validate(entry, &value)?;

        {
            let mut values = self.values.lock_ignore_poison();
            let current = values.get(key).unwrap_or(&entry.default);
            if *current == value {
                return Ok(());
            }
            if value == entry.default {
                values.remove(key);
            } else {
                values.insert(key.to_string(), value);
            }
            self.save(&values)?;
        }

        log::debug!("Setting {} changed", key);
        let _ = self.changes.send(SettingsChange::Value(key.to_string()));
        Ok(())
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set(key, Value::Bool(value))
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set(key, Value::String(value.to_string()))
    }

    pub fn set_u64(&self, key: &str, value: u64) -> Result<(), SettingsError> {
        self.set(key, Value::from(value))
    }

    pub fn set_strv(&self, key: &str, value: &[String]) -> Result<(), SettingsError> {
        self.set(key, Value::from(value.to_vec()))
    }

    /// Returns the key to its schema default.
    pub fn reset(&self, key: &str) -> Result<(), SettingsError> {
        self.entry(key)?;
        if !self.is_writable(key) {
            return Err(SettingsError::NotWritable(key.to_string()));
        }

        {
            let mut values = self.values.lock_ignore_poison();
            if values.remove(key).is_none() {
                return Ok(());
            }
            self.save(&values)?;
        }

        log::debug!("Setting {} reset", key);
        let _ = self.changes.send(SettingsChange::Value(key.to_string()));
        Ok(())
    }

    pub fn is_writable(&self, key: &str) -> bool {
        self.schema.contains_key(key) && !self.locked.lock_ignore_poison().contains(key)
    }

    /// Locks or unlocks a key, as an administrator lockdown would.
    pub fn set_writable(&self, key: &str, writable: bool) -> Result<(), SettingsError> {
        self.entry(key)?;
        let changed = {
            let mut locked = self.locked.lock_ignore_poison();
            if writable {
                locked.remove(key)
            } else {
                locked.insert(key.to_string())
            }
        };
        if changed {
            let _ = self.changes.send(SettingsChange::Writable(key.to_string()));
        }
        Ok(())
    }

    fn entry(&self, key: &str) -> Result<&SettingSchema, SettingsError> {
        self.schema
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))
    }

    fn save(&self, values: &Map<String, Value>) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |e: std::io::Error| SettingsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(values).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, contents).map_err(io_err)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }
        Ok(())
    }
}

fn mismatch(key: &str, kind: ValueKind) -> SettingsError {
    SettingsError::TypeMismatch {
        key: key.to_string(),
        expected: kind.name(),
    }
}

fn validate(entry: &SettingSchema, value: &Value) -> Result<(), SettingsError> {
    if !entry.kind.matches(value) {
        return Err(mismatch(entry.key, entry.kind));
    }
    if let Some(text) = value.as_str()
        && !entry.choices.is_empty()
        && !entry.choices.contains(&text)
    {
        return Err(SettingsError::InvalidChoice {
            key: entry.key.to_string(),
            value: text.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::keys::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_keys_read_their_default() {
        let store = SettingsStore::in_memory();
        assert!(store.get_bool(CONFIRM_TRASH).unwrap());
        assert_eq!(store.get_string(CLICK_POLICY).unwrap(), "double");
        assert_eq!(store.get_u64(FILE_THUMBNAIL_LIMIT).unwrap(), 10_485_760);
        assert_eq!(store.get_strv(ICON_VIEW_CAPTIONS).unwrap(), vec!["none", "none", "none"]);
    }

    #[test]
    fn rejects_unknown_keys_wrong_types_and_bad_choices() {
        let store = SettingsStore::in_memory();
        assert_eq!(
            store.set("preferences.nope", json!(true)),
            Err(SettingsError::UnknownKey("preferences.nope".to_string()))
        );
        assert!(matches!(
            store.set(CONFIRM_TRASH, json!("yes")),
            Err(SettingsError::TypeMismatch { .. })
        ));
        assert!(matches!(
            store.set_string(CLICK_POLICY, "triple"),
            Err(SettingsError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn notifies_only_on_real_change() {
        let store = SettingsStore::in_memory();
        let mut changes = store.subscribe();

        store.set_bool(CONFIRM_TRASH, true).unwrap();
        assert!(changes.try_recv().is_err());

        store.set_bool(CONFIRM_TRASH, false).unwrap();
        assert_eq!(
            changes.try_recv().unwrap(),
            SettingsChange::Value(CONFIRM_TRASH.to_string())
        );
    }

    #[test]
    fn locked_keys_refuse_writes() {
        let store = SettingsStore::in_memory();
        let mut changes = store.subscribe();

        store.set_writable(ICON_VIEW_CAPTIONS, false).unwrap();
        assert!(!store.is_writable(ICON_VIEW_CAPTIONS));
        assert_eq!(
            store.set_strv(ICON_VIEW_CAPTIONS, &["size".to_string()]),
            Err(SettingsError::NotWritable(ICON_VIEW_CAPTIONS.to_string()))
        );
        assert_eq!(
            changes.try_recv().unwrap(),
            SettingsChange::Writable(ICON_VIEW_CAPTIONS.to_string())
        );
    }

    #[test]
    fn reset_restores_default() {
        let store = SettingsStore::in_memory();
        store.set_string(CLICK_POLICY, "single").unwrap();
        store.reset(CLICK_POLICY).unwrap();
        assert_eq!(store.get_string(CLICK_POLICY).unwrap(), "double");
    }

    #[test]
    fn persists_only_non_defaults_with_dotted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nautilus/settings.json");

        let store = SettingsStore::open(&path);
        store.set_bool(SORT_DIRECTORIES_FIRST, true).unwrap();
        store.set_bool(CONFIRM_TRASH, true).unwrap();
        store.set_u64(FILE_THUMBNAIL_LIMIT, 1_048_576).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            saved,
            json!({
                "preferences.sort-directories-first": true,
                "preferences.thumbnail-limit": 1_048_576u64,
            })
        );
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = SettingsStore::open(&path);
        assert!(reopened.get_bool(SORT_DIRECTORIES_FIRST).unwrap());
        assert_eq!(reopened.get_u64(FILE_THUMBNAIL_LIMIT).unwrap(), 1_048_576);
    }

    #[test]
    fn broken_or_stale_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(SettingsStore::open(&path).get_bool(CONFIRM_TRASH).unwrap());

        fs::write(
            &path,
            r#"{"preferences.confirm-trash": "maybe", "preferences.gone": 1, "list-view.use-tree-view": true}"#,
        )
        .unwrap();
        let store = SettingsStore::open(&path);
        assert!(store.get_bool(CONFIRM_TRASH).unwrap());
        assert!(store.get_bool(LIST_VIEW_USE_TREE).unwrap());
    }
}
