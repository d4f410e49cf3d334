//! Threaded runtime harness
//!
//! Embedders that want the controller off their UI thread wrap it in a
//! [`ControllerRuntime`]: the controller moves onto a worker loop that ticks
//! it against the monotonic clock, and the embedder keeps a cheap
//! [`RuntimeHandle`] with an event sender (key presses, head changes,
//! pause/resume, shutdown) and a message receiver for state-change
//! notifications. Events and messages travel over bounded channels; the
//! loop sleeps no longer than the controller's next deadline, so timed work
//! stays on schedule while events are picked up promptly.

use crate::controller::{AvatarController, Command, TickReport};
use crate::types::ReplaySource;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const EVENT_QUEUE_DEPTH: usize = 64;
const MESSAGE_QUEUE_DEPTH: usize = 256;
/// How long the loop waits for events when nothing is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Input fed to the runtime from the embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A key press, by key code
    Key(u32),
    /// The scene switched its active head device
    HeadChanged,
    /// Leave the live phase without tearing the runtime down
    Pause,
    /// Re-enter the live phase after a pause
    Resume,
    /// Stop the worker loop
    Shutdown,
}

/// State-change notification published by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMessage {
    ControllerLive,
    RecordingStarted,
    RecordingStopped { entries: usize },
    ReplayStarted { source: ReplaySource },
    ReplayStopped,
    RecordingCleared,
    DeviceDiscovered(String),
    ExportPublished,
    ShuttingDown,
}

/// Embedder-side handle to a running [`ControllerRuntime`]
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    events: Sender<RuntimeEvent>,
    messages: Receiver<RuntimeMessage>,
}

impl RuntimeHandle {
    fn send(&self, event: RuntimeEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Forward a key press. Returns false once the runtime is gone.
    pub fn key(&self, code: u32) -> bool {
        self.send(RuntimeEvent::Key(code))
    }

    pub fn head_changed(&self) -> bool {
        self.send(RuntimeEvent::HeadChanged)
    }

    pub fn pause(&self) -> bool {
        self.send(RuntimeEvent::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(RuntimeEvent::Resume)
    }

    pub fn shutdown(&self) -> bool {
        self.send(RuntimeEvent::Shutdown)
    }

    /// The next pending message, if one is queued
    pub fn try_recv(&self) -> Option<RuntimeMessage> {
        self.messages.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeMessage> {
        self.messages.recv_timeout(timeout).ok()
    }

    /// Every message queued so far
    pub fn drain(&self) -> Vec<RuntimeMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.messages.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Worker loop that owns an [`AvatarController`]
pub struct ControllerRuntime {
    controller: AvatarController,
    events: Receiver<RuntimeEvent>,
    messages: Sender<RuntimeMessage>,
}

impl ControllerRuntime {
    /// Wrap `controller` for threaded use. The runtime does not spawn by
    /// itself; hand [`run`](Self::run) to a thread and keep the handle.
    pub fn new(controller: AvatarController) -> (Self, RuntimeHandle) {
        let (event_tx, event_rx) = bounded(EVENT_QUEUE_DEPTH);
        let (message_tx, message_rx) = bounded(MESSAGE_QUEUE_DEPTH);
        (
            Self {
                controller,
                events: event_rx,
                messages: message_tx,
            },
            RuntimeHandle {
                events: event_tx,
                messages: message_rx,
            },
        )
    }

    /// Drive the controller until shutdown or until the embedder drops its
    /// handle. Activates on entry and deactivates on the way out.
    pub fn run(mut self) {
        self.controller.activate(Instant::now());
        self.publish(RuntimeMessage::ControllerLive);
        info!("controller runtime started");

        loop {
            match self.drain_events() {
                LoopControl::Continue => {}
                LoopControl::Stop => break,
            }

            let report = self.controller.tick_at(Instant::now());
            self.publish_report(report);

            let wait = self
                .controller
                .next_deadline()
                .map(|due| due.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);
            match self.events.recv_timeout(wait) {
                Ok(event) => match self.handle_event(event) {
                    LoopControl::Continue => {}
                    LoopControl::Stop => break,
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("event channel closed, shutting down");
                    break;
                }
            }
        }

        self.controller.deactivate();
        self.publish(RuntimeMessage::ShuttingDown);
        info!("controller runtime stopped");
    }

    fn drain_events(&mut self) -> LoopControl {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.handle_event(event) == LoopControl::Stop {
                        return LoopControl::Stop;
                    }
                }
                Err(TryRecvError::Empty) => return LoopControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    debug!("event channel closed, shutting down");
                    return LoopControl::Stop;
                }
            }
        }
    }

    fn handle_event(&mut self, event: RuntimeEvent) -> LoopControl {
        let now = Instant::now();
        match event {
            RuntimeEvent::Key(code) => {
                let was_recording = self.controller.is_recording();
                let was_replaying = self.controller.is_replaying();
                if let Some(command) = self.controller.handle_key(now, code) {
                    self.publish_transitions(was_recording, was_replaying, command);
                }
            }
            RuntimeEvent::HeadChanged => self.controller.handle_head_changed(),
            RuntimeEvent::Pause => self.controller.deactivate(),
            RuntimeEvent::Resume => {
                self.controller.activate(now);
                self.publish(RuntimeMessage::ControllerLive);
            }
            RuntimeEvent::Shutdown => return LoopControl::Stop,
        }
        LoopControl::Continue
    }

    fn publish_transitions(&self, was_recording: bool, was_replaying: bool, command: Command) {
        let recording = self.controller.is_recording();
        let replaying = self.controller.is_replaying();
        if replaying != was_replaying {
            if replaying {
                self.publish(RuntimeMessage::ReplayStarted {
                    source: self.controller.replay_source().unwrap_or(ReplaySource::Memory),
                });
            } else {
                self.publish(RuntimeMessage::ReplayStopped);
            }
        }
        if recording != was_recording {
            if recording {
                self.publish(RuntimeMessage::RecordingStarted);
            } else {
                self.publish(RuntimeMessage::RecordingStopped {
                    entries: self.controller.session().map_or(0, |s| s.len()),
                });
            }
        }
        if command == Command::ClearRecording {
            self.publish(RuntimeMessage::RecordingCleared);
        }
    }

    fn publish_report(&self, report: TickReport) {
        for id in report.discovered {
            self.publish(RuntimeMessage::DeviceDiscovered(id));
        }
        if let Some(source) = report.replay_started {
            self.publish(RuntimeMessage::ReplayStarted { source });
        }
        for _ in 0..report.exports_finished {
            self.publish(RuntimeMessage::ExportPublished);
        }
    }

    fn publish(&self, message: RuntimeMessage) {
        // A slow or absent reader drops notifications rather than stalling
        // the controller loop.
        if self.messages.try_send(message).is_err() {
            debug!("message queue full or closed, notification dropped");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Stop,
}
