//! Transient key/value stores
//!
//! The controller persists the latest session blob under a single
//! configurable key. [`KeyValueStore`] abstracts where that blob lives:
//! [`MemoryStore`] keeps it for the process lifetime (the default, and what
//! tests use), [`FileStore`] maps the whole store onto one JSON file so the
//! blob survives restarts.

use crate::error::{MocapError, Result, ResultExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// String key/value storage for small blobs
pub trait KeyValueStore: Send {
    /// The stored value, or `None` when the key is absent
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Process-lifetime store backed by a plain map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object in a file.
///
/// The full map is cached in memory; every mutation rewrites the file. A
/// missing file is an empty store, and an unreadable one is logged and
/// treated as empty rather than blocking startup.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "store file is malformed, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(MocapError::from(err))
                    .with_context(|| format!("reading store file {}", path.display()))
            }
        };
        Ok(Self { path, entries })
    }

    /// Open the store at the platform data directory, under `app_name`
    pub fn at_default_location(app_name: &str) -> Result<Self> {
        let dir = dirs_next::data_dir()
            .ok_or_else(|| MocapError::Store("no platform data directory".to_string()))?;
        Self::open(dir.join(app_name).join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating store directory {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing store file {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}
