//! Avatar capture controller
//!
//! [`AvatarController`] owns the whole record/replay surface: the device
//! registry fed by the discovery poller, the head recorder, both state
//! machines, the persistence manager and the deadline scheduler. Everything
//! runs on the owner's thread; timed work (discovery polls, the activation
//! auto-replay, deferred export publishing) only happens inside
//! [`AvatarController::tick_at`], so a single mutable reference is enough
//! and no state is ever observed mid-transition.

use crate::config::{
    ControllerConfig, AUTOPLAY_DELAY, EXPORT_TRIGGER_DELAY, POLL_INTERVAL,
};
use crate::persist::{ExportTicket, PersistenceManager};
use crate::registry::{Device, DeviceRegistry};
use crate::scene::{DeviceRecorder, ReplaySettings, Scene};
use crate::schedule::{Scheduler, TaskHandle};
use crate::session::{RecordingSession, HEAD_KEY};
use crate::types::{ControllerStats, LifecyclePhase, ReplaySource};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Key code that toggles recording
pub const KEY_SPACE: u32 = 32;
/// Key code that toggles replay
pub const KEY_P: u32 = 80;
/// Key code that clears the held recording
pub const KEY_C: u32 = 67;

/// User-facing commands the controller accepts while live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleRecording,
    ToggleReplay,
    ClearRecording,
}

impl Command {
    /// Map a key code to its command, if the key is bound
    pub fn for_key(code: u32) -> Option<Self> {
        match code {
            KEY_SPACE => Some(Self::ToggleRecording),
            KEY_P => Some(Self::ToggleReplay),
            KEY_C => Some(Self::ClearRecording),
            _ => None,
        }
    }
}

/// Timed work the controller schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerTask {
    PollDevices,
    AutoReplay,
    FinishExport(ExportTicket),
}

/// What one call to [`AvatarController::tick_at`] did
#[derive(Debug, Default)]
pub struct TickReport {
    /// Ids of devices registered by this tick's discovery poll
    pub discovered: Vec<String>,
    /// Set when this tick started a replay (activation auto-replay)
    pub replay_started: Option<ReplaySource>,
    /// Deferred exports published by this tick
    pub exports_finished: usize,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.discovered.is_empty() && self.replay_started.is_none() && self.exports_finished == 0
    }
}

/// Single-threaded orchestrator for avatar motion capture
pub struct AvatarController {
    config: ControllerConfig,
    scene: Box<dyn Scene>,
    persistence: PersistenceManager,
    registry: DeviceRegistry,
    head: Option<Box<dyn DeviceRecorder>>,
    in_memory: Option<RecordingSession>,
    is_recording: bool,
    is_replaying: bool,
    replay_source: Option<ReplaySource>,
    phase: LifecyclePhase,
    scheduler: Scheduler<ControllerTask>,
    poll_task: Option<TaskHandle>,
    stats: ControllerStats,
}

impl AvatarController {
    /// Build a controller over `scene`. Binds a head recorder right away
    /// when the scene has an active head device.
    pub fn new(
        config: ControllerConfig,
        mut scene: Box<dyn Scene>,
        persistence: PersistenceManager,
    ) -> Self {
        let head = scene.bind_head_recorder();
        if head.is_none() {
            debug!("scene has no head device yet");
        }
        Self {
            config,
            scene,
            persistence,
            registry: DeviceRegistry::new(),
            head,
            in_memory: None,
            is_recording: false,
            is_replaying: false,
            replay_source: None,
            phase: LifecyclePhase::Initialized,
            scheduler: Scheduler::new(),
            poll_task: None,
            stats: ControllerStats::default(),
        }
    }

    // ----- lifecycle -------------------------------------------------------

    /// Go live: start the discovery poll cadence and, when auto-replay is
    /// configured, arm the one-shot replay of whatever session is already
    /// held. Activating twice is a no-op.
    pub fn activate(&mut self, now: Instant) {
        if self.poll_task.is_some() {
            debug!("already live, ignoring activate");
            return;
        }
        self.phase = LifecyclePhase::Live;
        self.poll_task =
            Some(self.scheduler.schedule_repeating(now, POLL_INTERVAL, ControllerTask::PollDevices));
        if self.config.auto_play {
            self.scheduler.schedule_once(now, AUTOPLAY_DELAY, ControllerTask::AutoReplay);
        }
        info!(auto_play = self.config.auto_play, "controller live");
    }

    /// Leave the live phase: every scheduled task is cancelled, commands are
    /// ignored until the next [`activate`](Self::activate). Recording and
    /// replay state is left untouched.
    pub fn deactivate(&mut self) {
        self.scheduler.clear();
        self.poll_task = None;
        self.phase = LifecyclePhase::Paused;
        info!("controller paused");
    }

    /// Feed a key press. Unbound keys and any key outside the live phase are
    /// ignored. Returns the command that was dispatched, if any.
    pub fn handle_key(&mut self, now: Instant, code: u32) -> Option<Command> {
        if !self.phase.is_live() {
            debug!(code, "key ignored outside live phase");
            return None;
        }
        let command = Command::for_key(code)?;
        self.dispatch(now, command);
        Some(command)
    }

    /// Run a command directly, bypassing the key map
    pub fn dispatch(&mut self, now: Instant, command: Command) {
        debug!(?command, "dispatching command");
        match command {
            Command::ToggleRecording => self.toggle_recording(now),
            Command::ToggleReplay => self.toggle_replay(),
            Command::ClearRecording => self.clear_recording(),
        }
    }

    /// The scene switched to a different head device: rebind the head
    /// recorder, dropping the old one. During an active recording the new
    /// head starts capturing immediately, like a late-joining device.
    pub fn handle_head_changed(&mut self) {
        self.head = self.scene.bind_head_recorder();
        match self.head.as_mut() {
            Some(head) => {
                if self.is_recording {
                    head.start();
                }
                info!(recording = self.is_recording, "head recorder rebound");
            }
            None => warn!("head device went away, nothing to rebind"),
        }
    }

    // ----- recording state machine ----------------------------------------

    pub fn toggle_recording(&mut self, now: Instant) {
        if self.is_recording {
            self.stop_recording(now);
        } else {
            self.start_recording();
        }
    }

    /// Enter recording. Stops a running replay first; starting while already
    /// recording is a no-op.
    pub fn start_recording(&mut self) {
        if self.is_recording {
            debug!("already recording");
            return;
        }
        self.stop_replay();
        self.is_recording = true;
        match self.head.as_mut() {
            Some(head) => head.start(),
            None => warn!("recording without a head device, session will have no head track"),
        }
        self.registry.start_all();
        info!(devices = self.registry.len(), "recording started");
    }

    /// Leave recording: stop every recorder, assemble the session, replace
    /// the held one, run both persistence paths, and hand off to replay when
    /// auto-replay is on. Stopping while idle is a no-op.
    pub fn stop_recording(&mut self, now: Instant) {
        if !self.is_recording {
            debug!("not recording, nothing to stop");
            return;
        }
        self.is_recording = false;
        if let Some(head) = self.head.as_mut() {
            head.stop();
        }
        self.registry.stop_all();

        let mut session = RecordingSession::new();
        if let Some(head) = self.head.as_mut() {
            session.set_head(head.export());
        }
        self.registry.export_into(&mut session);

        let recorded_at = Utc::now();
        self.stats.sessions_recorded += 1;
        self.stats.last_session_at = Some(recorded_at);

        // The two persistence paths are independent; a failure on either is
        // logged and the other still runs.
        if self.config.local_storage {
            if let Err(err) = self.persistence.save_session(&session) {
                warn!(error = %err, "failed to store session, in-memory copy is still held");
            }
        }
        if self.config.save_file {
            let title = self.scene.title();
            match self
                .persistence
                .stage_export(&session, &title, self.config.binary_format, recorded_at)
            {
                Ok(ticket) => {
                    self.scheduler.schedule_once(
                        now,
                        EXPORT_TRIGGER_DELAY,
                        ControllerTask::FinishExport(ticket),
                    );
                }
                Err(err) => warn!(error = %err, "failed to stage session export"),
            }
        }

        info!(entries = session.len(), "recording stopped");
        self.in_memory = Some(session);

        if self.config.auto_play {
            self.start_replay();
        }
    }

    // ----- replay state machine -------------------------------------------

    pub fn toggle_replay(&mut self) {
        if self.is_replaying {
            self.stop_replay();
        } else {
            self.start_replay();
        }
    }

    /// Begin replaying the best available session: the stored one when the
    /// store path is enabled and holds a readable blob, otherwise the
    /// in-memory one. Refused while recording; a no-op when no session is
    /// available. Returns the source that was played.
    pub fn start_replay(&mut self) -> Option<ReplaySource> {
        if self.is_recording {
            debug!("replay refused while recording");
            return None;
        }
        let (session, source) = self.select_replay_session()?;
        let settings = ReplaySettings {
            loop_replay: self.config.loop_replay,
            spectator_mode: self.config.spectator_play,
            spectator_position: self.config.spectator_position,
        };
        let replayer = self.scene.replayer();
        replayer.set_spectator_mode(settings.spectator_mode);
        replayer.start_replaying(&session, &settings);
        self.is_replaying = true;
        self.replay_source = Some(source);
        self.stats.replays_started += 1;
        info!(source = source.display_name(), entries = session.len(), "replay started");
        Some(source)
    }

    fn select_replay_session(&self) -> Option<(RecordingSession, ReplaySource)> {
        if self.config.local_storage {
            match self.persistence.load_session() {
                Some(Ok(session)) => return Some((session, ReplaySource::Persisted)),
                Some(Err(err)) => {
                    warn!(error = %err, "stored session is malformed, trying the in-memory one")
                }
                None => {}
            }
        }
        match self.in_memory.clone() {
            Some(session) => Some((session, ReplaySource::Memory)),
            None => {
                debug!("no session available to replay");
                None
            }
        }
    }

    /// Stop a running replay and restore the normal viewpoint. A no-op when
    /// not replaying.
    pub fn stop_replay(&mut self) {
        if !self.is_replaying {
            return;
        }
        let replayer = self.scene.replayer();
        replayer.stop_replaying();
        replayer.set_spectator_mode(false);
        self.is_replaying = false;
        self.replay_source = None;
        info!("replay stopped");
    }

    // ----- held session ---------------------------------------------------

    /// Drop the held session and the stored blob. Running machines are not
    /// interrupted; a replay already playing plays on.
    pub fn clear_recording(&mut self) {
        self.in_memory = None;
        if let Err(err) = self.persistence.clear_session() {
            warn!(error = %err, "failed to clear stored session");
        }
        info!("recording cleared");
    }

    // ----- scheduling -----------------------------------------------------

    /// Run every task due at `now`. This is the only place timed work
    /// executes; owners call it from their loop with a monotonic clock.
    pub fn tick_at(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();
        for task in self.scheduler.poll(now) {
            match task {
                ControllerTask::PollDevices => {
                    report.discovered.extend(self.poll_devices());
                }
                ControllerTask::AutoReplay => {
                    if !self.is_recording && !self.is_replaying {
                        report.replay_started = self.start_replay();
                    } else {
                        debug!("activation auto-replay skipped, controller is busy");
                    }
                }
                ControllerTask::FinishExport(ticket) => {
                    match self.persistence.finish_export(ticket) {
                        Ok(()) => report.exports_finished += 1,
                        Err(err) => warn!(error = %err, "failed to publish session export"),
                    }
                }
            }
        }
        report
    }

    /// The next instant at which [`tick_at`](Self::tick_at) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    fn poll_devices(&mut self) -> Vec<String> {
        self.stats.polls_completed += 1;
        let mut registered = Vec::new();
        for found in self.scene.scan_trackables() {
            let Some(id) = found.id else {
                // Unidentified devices are reported every poll until the
                // scene can name them.
                warn!("tracked device reports no id, skipping");
                continue;
            };
            if id == HEAD_KEY {
                warn!(%id, "device id collides with the reserved head key, skipping");
                continue;
            }
            if self.registry.contains(&id) {
                continue;
            }
            let Some(mut recorder) = self.scene.bind_device_recorder(&id) else {
                warn!(%id, "device vanished before a recorder could be bound");
                continue;
            };
            if self.is_recording {
                // Late joiner folds into the cycle already in progress
                recorder.start();
            }
            self.registry.insert(Device::new(id.clone(), recorder));
            self.stats.devices_discovered += 1;
            info!(%id, "tracked device registered");
            registered.push(id);
        }
        registered
    }

    // ----- accessors ------------------------------------------------------

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The session held from the last completed record cycle
    pub fn session(&self) -> Option<&RecordingSession> {
        self.in_memory.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn is_replaying(&self) -> bool {
        self.is_replaying
    }

    /// Where the running replay came from, while one is running
    pub fn replay_source(&self) -> Option<ReplaySource> {
        self.replay_source
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn has_head(&self) -> bool {
        self.head.is_some()
    }

    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.registry.ids().map(str::to_string).collect()
    }

    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }
}

impl std::fmt::Debug for AvatarController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarController")
            .field("phase", &self.phase)
            .field("is_recording", &self.is_recording)
            .field("is_replaying", &self.is_replaying)
            .field("devices", &self.registry.len())
            .field("has_session", &self.in_memory.is_some())
            .finish()
    }
}
