//! # Mocap-RS: Avatar Motion Capture Orchestration
//!
//! Records and replays full-body avatar motion. The controller watches the
//! scene for motion-tracked devices, captures the head and every tracked
//! device through per-device recorders, and turns each record cycle into a
//! session it can persist, export, and play back.
//!
//! ## Architecture
//!
//! - **Controller**: Single-threaded orchestrator owning both state machines,
//!   the device registry, and the deadline scheduler
//! - **Scene**: Trait surface the embedder implements over its tracking and
//!   rendering runtime; a scripted mock ships for tests and demos
//! - **Persistence**: Transient key/value store for the latest session plus
//!   a two-phase file export sink
//! - **Runtime**: Optional worker-thread harness speaking crossbeam channels
//!
//! ## Configuration
//!
//! [`config::ControllerConfig`] loads from TOML or JSON and defaults to the
//! hands-free flow: record on space, auto-replay after stopping, store the
//! session under `avatar-recording`, and save a
//! `player-recording-<title>-<epoch-ms>.json` file.
//!
//! ## Example
//!
//! ```ignore
//! use mocap_rs::{
//!     config::{ControllerConfig, PersistenceConfig},
//!     controller::AvatarController,
//!     persist::PersistenceManager,
//!     runtime::ControllerRuntime,
//!     scene::mock::MockScene,
//! };
//!
//! fn main() {
//!     let scene = MockScene::new("demo room");
//!     let persistence =
//!         PersistenceManager::in_memory(PersistenceConfig::default(), "recordings");
//!     let controller = AvatarController::new(
//!         ControllerConfig::default(),
//!         Box::new(scene),
//!         persistence,
//!     );
//!
//!     let (runtime, handle) = ControllerRuntime::new(controller);
//!     std::thread::spawn(move || runtime.run());
//!
//!     handle.key(mocap_rs::controller::KEY_SPACE); // start recording
//!     handle.key(mocap_rs::controller::KEY_SPACE); // stop, persist, auto-replay
//!     handle.shutdown();
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod persist;
pub mod registry;
pub mod runtime;
pub mod scene;
pub mod schedule;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{ControllerConfig, PersistenceConfig};
pub use controller::{AvatarController, Command, TickReport};
pub use error::{MocapError, Result};
pub use persist::{ExportSink, KeyValueStore, PersistenceManager};
pub use registry::{Device, DeviceRegistry};
pub use scene::{DeviceRecorder, ReplaySettings, Scene, SessionReplayer};
pub use session::{RecordingSession, HEAD_KEY};
pub use types::{CapturePayload, LifecyclePhase, ReplaySource, Vec3};
