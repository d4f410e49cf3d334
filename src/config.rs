//! Configuration for the avatar controller
//!
//! This module holds the recognized controller options, their defaults, and
//! loading helpers for TOML and JSON config files.
//!
//! # Options
//!
//! | Option | Default | Meaning |
//! |---|---|---|
//! | `auto_record` | `false` | Reserved; consulted by no transition today |
//! | `auto_play` | `true` | Replay after a stop, and shortly after activation |
//! | `spectator_play` | `false` | Replay from a fixed external vantage point |
//! | `spectator_position` | `(0, 1.6, 0)` | Spectator camera position |
//! | `local_storage` | `true` | Persist sessions to the transient key-value store |
//! | `save_file` | `true` | Export sessions as downloadable files |
//! | `loop` | `true` | Replay loops instead of stopping at the end |
//! | `binary_format` | `false` | Export with a binary MIME type instead of JSON |
//!
//! Timing constants are fixed rather than configurable: discovery polls every
//! [`POLL_INTERVAL`], activation defers an auto-replay by [`AUTOPLAY_DELAY`],
//! and a staged file export is finished [`EXPORT_TRIGGER_DELAY`] later.

use crate::error::{MocapError, Result};
use crate::types::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Store key sessions are persisted under unless overridden
pub const DEFAULT_STORAGE_KEY: &str = "avatar-recording";

/// Fixed interval between discovery polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Delay before the activation-time auto-replay, letting the scene settle
pub const AUTOPLAY_DELAY: Duration = Duration::from_millis(500);

/// Delay before a staged file export is finished (next-tick semantics)
pub const EXPORT_TRIGGER_DELAY: Duration = Duration::from_millis(1);

/// Default spectator camera position (standing eye height at the origin)
pub const DEFAULT_SPECTATOR_POSITION: Vec3 = Vec3::new(0.0, 1.6, 0.0);

fn default_true() -> bool {
    true
}

fn default_spectator_position() -> Vec3 {
    DEFAULT_SPECTATOR_POSITION
}

/// Recognized controller options.
///
/// Every field has a serde default so partial config files only need to name
/// the options they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Reserved: declared for forward compatibility, consulted by nothing
    #[serde(default)]
    pub auto_record: bool,

    /// Replay immediately after a recording stops, and on activation
    #[serde(default = "default_true")]
    pub auto_play: bool,

    /// Replay in spectator mode (external vantage point)
    #[serde(default)]
    pub spectator_play: bool,

    /// Where the spectator camera is placed
    #[serde(default = "default_spectator_position")]
    pub spectator_position: Vec3,

    /// Persist completed sessions to the transient key-value store
    #[serde(default = "default_true")]
    pub local_storage: bool,

    /// Export completed sessions as downloadable files
    #[serde(default = "default_true")]
    pub save_file: bool,

    /// Whether replay loops
    #[serde(default = "default_true", rename = "loop")]
    pub loop_replay: bool,

    /// Export with a generic binary MIME type instead of JSON
    #[serde(default)]
    pub binary_format: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_record: false,
            auto_play: true,
            spectator_play: false,
            spectator_position: DEFAULT_SPECTATOR_POSITION,
            local_storage: true,
            save_file: true,
            loop_replay: true,
            binary_format: false,
        }
    }
}

impl ControllerConfig {
    /// Parse a config from a TOML string
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MocapError::Config(format!("Invalid TOML config: {}", e)))
    }

    /// Parse a config from a JSON string
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| MocapError::Config(format!("Invalid JSON config: {}", e)))
    }

    /// Load a config file, dispatching on the `.toml`/`.json` extension
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MocapError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(MocapError::Config(format!(
                "Unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// Where the persistence manager writes the transient blob.
///
/// Carried explicitly instead of a shared global key constant so embedders
/// can namespace multiple controllers against one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Store key for the serialized session
    pub key: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Create a config with a custom store key
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}
