//! Scripted scene for tests and demos
//!
//! [`MockScene`] implements [`Scene`] over shared in-memory state. A
//! [`SceneHandle`] cloned off before the scene is boxed keeps a window into
//! that state, so a test can add devices mid-run, watch which recorders were
//! bound and started, and inspect replay activity without touching the
//! controller's internals.

use super::{DeviceRecorder, DiscoveredDevice, ReplaySettings, Scene, SessionReplayer};
use crate::session::RecordingSession;
use crate::types::CapturePayload;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct RecorderState {
    started: bool,
    start_count: u32,
    stop_count: u32,
    export_count: u32,
    samples: Vec<serde_json::Value>,
}

/// Observation window into one mock recorder
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    id: String,
    state: Arc<Mutex<RecorderState>>,
}

impl RecorderHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub fn start_count(&self) -> u32 {
        self.state.lock().unwrap().start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.state.lock().unwrap().stop_count
    }

    pub fn export_count(&self) -> u32 {
        self.state.lock().unwrap().export_count
    }
}

/// Recorder that captures one synthetic sample per start
#[derive(Debug)]
pub struct MockRecorder {
    id: String,
    state: Arc<Mutex<RecorderState>>,
}

impl MockRecorder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(RecorderState::default())),
        }
    }

    pub fn handle(&self) -> RecorderHandle {
        RecorderHandle {
            id: self.id.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl DeviceRecorder for MockRecorder {
    fn start(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.started = true;
        state.start_count += 1;
        let sample = state.start_count;
        state.samples.push(json!({ "device": self.id, "cycle": sample }));
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.started = false;
        state.stop_count += 1;
    }

    fn export(&mut self) -> CapturePayload {
        let mut state = self.state.lock().unwrap();
        state.export_count += 1;
        CapturePayload::from_value(serde_json::Value::Array(state.samples.clone()))
    }
}

#[derive(Debug, Default)]
struct ReplayState {
    replaying: bool,
    start_count: u32,
    stop_count: u32,
    spectator_active: bool,
    last_session: Option<RecordingSession>,
    last_settings: Option<ReplaySettings>,
}

/// Replayer that records what it was asked to play
#[derive(Debug, Default)]
pub struct MockReplayer {
    state: Arc<Mutex<ReplayState>>,
}

impl SessionReplayer for MockReplayer {
    fn start_replaying(&mut self, session: &RecordingSession, settings: &ReplaySettings) {
        let mut state = self.state.lock().unwrap();
        state.replaying = true;
        state.start_count += 1;
        state.last_session = Some(session.clone());
        state.last_settings = Some(settings.clone());
    }

    fn stop_replaying(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.replaying {
            state.stop_count += 1;
        }
        state.replaying = false;
    }

    fn set_spectator_mode(&mut self, active: bool) {
        self.state.lock().unwrap().spectator_active = active;
    }
}

#[derive(Debug)]
struct SceneState {
    title: String,
    head_available: bool,
    trackables: Vec<Option<String>>,
    scan_count: u32,
    bound: Vec<RecorderHandle>,
    head_binds: Vec<RecorderHandle>,
}

/// Shared control surface over a [`MockScene`], usable after the scene has
/// been handed to a controller
#[derive(Debug, Clone)]
pub struct SceneHandle {
    scene: Arc<Mutex<SceneState>>,
    replay: Arc<Mutex<ReplayState>>,
}

impl SceneHandle {
    /// Make an identified device visible to subsequent scans
    pub fn add_device(&self, id: impl Into<String>) {
        self.scene.lock().unwrap().trackables.push(Some(id.into()));
    }

    /// Make a device visible that scans cannot yet identify
    pub fn add_unidentified(&self) {
        self.scene.lock().unwrap().trackables.push(None);
    }

    /// Give the first unidentified device an id, as if the runtime resolved it
    pub fn identify_unidentified(&self, id: impl Into<String>) -> bool {
        let mut state = self.scene.lock().unwrap();
        if let Some(slot) = state.trackables.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(id.into());
            true
        } else {
            false
        }
    }

    pub fn set_head_available(&self, available: bool) {
        self.scene.lock().unwrap().head_available = available;
    }

    pub fn scan_count(&self) -> u32 {
        self.scene.lock().unwrap().scan_count
    }

    /// Handle of the recorder bound for `id`, if any was bound
    pub fn recorder(&self, id: &str) -> Option<RecorderHandle> {
        self.scene
            .lock()
            .unwrap()
            .bound
            .iter()
            .find(|handle| handle.id() == id)
            .cloned()
    }

    /// How many head recorders were bound over the scene's lifetime
    pub fn head_bind_count(&self) -> usize {
        self.scene.lock().unwrap().head_binds.len()
    }

    /// Handle of the `index`-th head recorder bound (0 = first)
    pub fn head_recorder(&self, index: usize) -> Option<RecorderHandle> {
        self.scene.lock().unwrap().head_binds.get(index).cloned()
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.lock().unwrap().replaying
    }

    pub fn replay_start_count(&self) -> u32 {
        self.replay.lock().unwrap().start_count
    }

    pub fn replay_stop_count(&self) -> u32 {
        self.replay.lock().unwrap().stop_count
    }

    pub fn spectator_active(&self) -> bool {
        self.replay.lock().unwrap().spectator_active
    }

    pub fn last_replay_settings(&self) -> Option<ReplaySettings> {
        self.replay.lock().unwrap().last_settings.clone()
    }

    pub fn last_replayed_session(&self) -> Option<RecordingSession> {
        self.replay.lock().unwrap().last_session.clone()
    }
}

/// Scene whose devices and head are scripted from the outside
#[derive(Debug)]
pub struct MockScene {
    state: Arc<Mutex<SceneState>>,
    replayer: MockReplayer,
}

impl MockScene {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState {
                title: title.into(),
                head_available: true,
                trackables: Vec::new(),
                scan_count: 0,
                bound: Vec::new(),
                head_binds: Vec::new(),
            })),
            replayer: MockReplayer::default(),
        }
    }

    /// Control surface that stays valid after the scene is boxed away
    pub fn handle(&self) -> SceneHandle {
        SceneHandle {
            scene: Arc::clone(&self.state),
            replay: Arc::clone(&self.replayer.state),
        }
    }
}

impl Scene for MockScene {
    fn scan_trackables(&mut self) -> Vec<DiscoveredDevice> {
        let mut state = self.state.lock().unwrap();
        state.scan_count += 1;
        state
            .trackables
            .iter()
            .map(|slot| match slot {
                Some(id) => DiscoveredDevice::identified(id.clone()),
                None => DiscoveredDevice::unidentified(),
            })
            .collect()
    }

    fn bind_device_recorder(&mut self, id: &str) -> Option<Box<dyn DeviceRecorder>> {
        let mut state = self.state.lock().unwrap();
        let present = state
            .trackables
            .iter()
            .any(|slot| slot.as_deref() == Some(id));
        if !present {
            return None;
        }
        let recorder = MockRecorder::new(id);
        state.bound.push(recorder.handle());
        Some(Box::new(recorder))
    }

    fn bind_head_recorder(&mut self) -> Option<Box<dyn DeviceRecorder>> {
        let mut state = self.state.lock().unwrap();
        if !state.head_available {
            return None;
        }
        let recorder = MockRecorder::new("head");
        state.head_binds.push(recorder.handle());
        Some(Box::new(recorder))
    }

    fn replayer(&mut self) -> &mut dyn SessionReplayer {
        &mut self.replayer
    }

    fn title(&self) -> String {
        self.state.lock().unwrap().title.clone()
    }
}
