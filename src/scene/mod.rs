//! Scene abstraction
//!
//! The controller never talks to a rendering or tracking runtime directly.
//! Everything it needs from the outside world goes through the [`Scene`]
//! trait: enumerating currently tracked devices, binding recorders to them,
//! and obtaining the replayer that plays a finished session back. Production
//! embedders implement [`Scene`] over their engine; tests and the bundled
//! demo use [`mock::MockScene`].

use crate::session::RecordingSession;
use crate::types::{CapturePayload, Vec3};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "mock-scene"))]
pub mod mock;

/// A device reported by a scene scan.
///
/// `id` is `None` when the device is tracked but not yet identifiable; such
/// devices are skipped and picked up again on a later scan once the scene
/// can name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub id: Option<String>,
}

impl DiscoveredDevice {
    pub fn identified(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }

    pub fn unidentified() -> Self {
        Self { id: None }
    }
}

/// Captures one device's motion over a record cycle.
///
/// A recorder handed out by the scene must come back idle: capture begins
/// only on [`start`](DeviceRecorder::start), and the recorder draws no
/// visualization of its own while bound. [`export`](DeviceRecorder::export)
/// may be called after [`stop`](DeviceRecorder::stop) and returns whatever
/// was captured since the last `start`.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceRecorder: Send {
    /// Begin capturing motion samples
    fn start(&mut self);

    /// Stop capturing
    fn stop(&mut self);

    /// The payload captured during the last record cycle
    fn export(&mut self) -> CapturePayload;
}

/// Options applied when a replay starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Restart the session from the beginning when it ends
    pub loop_replay: bool,
    /// Detach the viewpoint from the replayed head and observe from a fixed
    /// vantage instead
    pub spectator_mode: bool,
    /// Where the spectator viewpoint stands
    pub spectator_position: Vec3,
}

/// Plays a finished session back through the scene
pub trait SessionReplayer: Send {
    /// Begin replaying `session` with the given settings. Starting while a
    /// replay is already running restarts it with the new session.
    fn start_replaying(&mut self, session: &RecordingSession, settings: &ReplaySettings);

    /// Stop the running replay, if any
    fn stop_replaying(&mut self);

    /// Toggle the detached spectator viewpoint
    fn set_spectator_mode(&mut self, active: bool);
}

/// The embedder-facing surface of the tracking runtime
pub trait Scene: Send {
    /// Enumerate every device the runtime currently tracks, including ones
    /// reported before but still present. Deduplication is the caller's job.
    fn scan_trackables(&mut self) -> Vec<DiscoveredDevice>;

    /// Bind an idle recorder to the identified device, or `None` when the
    /// device vanished between scan and bind
    fn bind_device_recorder(&mut self, id: &str) -> Option<Box<dyn DeviceRecorder>>;

    /// Bind an idle recorder to the active head device, or `None` when the
    /// scene has no head
    fn bind_head_recorder(&mut self) -> Option<Box<dyn DeviceRecorder>>;

    /// The scene's replayer. Attached lazily; the first call may install it.
    fn replayer(&mut self) -> &mut dyn SessionReplayer;

    /// Human-readable scene title, used in export file names
    fn title(&self) -> String;
}
