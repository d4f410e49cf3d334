//! Core data types for mocap-rs
//!
//! This module contains the fundamental data structures shared across the
//! controller, registry, and persistence layers.
//!
//! # Main Types
//!
//! - [`Vec3`] - A simple 3-vector used for the spectator vantage point
//! - [`CapturePayload`] - The opaque motion data exported by one device recorder
//! - [`ReplaySource`] - Which backend fed the currently running replay
//! - [`LifecyclePhase`] - Controller lifecycle (commands are live only in `Live`)
//! - [`ControllerStats`] - Running counters for discovery and session activity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 3-component vector.
///
/// Only used to position the spectator camera during replay, so it stays a
/// plain value type with no math beyond construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The serialized motion data exported by a single device's recorder.
///
/// The controller never interprets the payload; sampling and interpolation
/// belong to the recorder capability. The payload is carried as raw JSON so
/// any recorder implementation can round-trip its own format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturePayload(serde_json::Value);

impl CapturePayload {
    /// An empty payload (JSON null)
    pub const fn null() -> Self {
        Self(serde_json::Value::Null)
    }

    /// Wrap an arbitrary JSON value
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// True when the payload carries no captured samples.
    ///
    /// Null, an empty array, and an empty object all count as empty; anything
    /// else is assumed to hold data.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl Default for CapturePayload {
    fn default() -> Self {
        Self::null()
    }
}

impl From<serde_json::Value> for CapturePayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Which backend supplied the session for the active replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplaySource {
    /// Deserialized from the transient key-value store
    Persisted,
    /// The in-memory session retained from the current run
    Memory,
}

impl ReplaySource {
    /// Display name for the source
    pub fn display_name(&self) -> &'static str {
        match self {
            ReplaySource::Persisted => "persisted",
            ReplaySource::Memory => "in-memory",
        }
    }
}

/// Lifecycle phase of the controller.
///
/// The keyboard command surface is active only while `Live`; deactivating the
/// controller drops the key bindings and cancels all scheduled tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    /// Constructed but not yet activated
    #[default]
    Initialized,
    /// Activated; polling and key commands are live
    Live,
    /// Deactivated; events are ignored until reactivated
    Paused,
}

impl LifecyclePhase {
    /// Check if the controller is live
    pub fn is_live(&self) -> bool {
        matches!(self, LifecyclePhase::Live)
    }
}

/// Running counters for controller activity.
///
/// Snapshot-style statistics in the spirit of a collection-stats readout;
/// serializable so hosts can expose them directly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerStats {
    /// Number of completed discovery polls
    pub polls_completed: u64,
    /// Number of devices added to the registry over the controller lifetime
    pub devices_discovered: u64,
    /// Number of recording sessions completed
    pub sessions_recorded: u64,
    /// Number of replays started (from either source)
    pub replays_started: u64,
    /// When the most recent session was finalized
    pub last_session_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vec3_display() {
        let v = Vec3::new(0.0, 1.6, 0.0);
        assert_eq!(v.to_string(), "(0, 1.6, 0)");
    }

    #[test]
    fn test_payload_emptiness() {
        assert!(CapturePayload::null().is_empty());
        assert!(CapturePayload::from_value(json!([])).is_empty());
        assert!(CapturePayload::from_value(json!({})).is_empty());
        assert!(!CapturePayload::from_value(json!([{ "t": 0 }])).is_empty());
        assert!(!CapturePayload::from_value(json!(1.0)).is_empty());
    }

    #[test]
    fn test_payload_transparent_serde() {
        let payload = CapturePayload::from_value(json!([{ "t": 16, "x": 0.5 }]));
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(text, r#"[{"t":16,"x":0.5}]"#);
        let back: CapturePayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_lifecycle_phase() {
        assert!(!LifecyclePhase::Initialized.is_live());
        assert!(LifecyclePhase::Live.is_live());
        assert!(!LifecyclePhase::Paused.is_live());
    }
}
