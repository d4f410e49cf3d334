//! Helpers for wiring controllers over scripted scenes

use mocap_rs::config::{ControllerConfig, PersistenceConfig};
use mocap_rs::controller::AvatarController;
use mocap_rs::persist::export::{CollectingSink, ExportLog};
use mocap_rs::persist::{DirectorySink, KeyValueStore, MemoryStore, PersistenceManager};
use mocap_rs::runtime::{RuntimeHandle, RuntimeMessage};
use mocap_rs::scene::mock::{MockScene, SceneHandle};
use std::path::Path;
use std::time::{Duration, Instant};

/// Controller over a fresh mock scene, collecting exports in memory
pub fn controller(config: ControllerConfig) -> (AvatarController, SceneHandle, ExportLog) {
    controller_with_store(config, Box::new(MemoryStore::new()))
}

/// Controller whose transient store is supplied by the test
pub fn controller_with_store(
    config: ControllerConfig,
    store: Box<dyn KeyValueStore>,
) -> (AvatarController, SceneHandle, ExportLog) {
    let scene = MockScene::new("integration scene");
    let handle = scene.handle();
    let sink = CollectingSink::new();
    let log = sink.log();
    let persistence = PersistenceManager::new(PersistenceConfig::default(), store, Box::new(sink));
    let controller = AvatarController::new(config, Box::new(scene), persistence);
    (controller, handle, log)
}

/// Controller whose exports land as real files under `export_dir`
pub fn controller_exporting_to(
    config: ControllerConfig,
    export_dir: &Path,
) -> (AvatarController, SceneHandle) {
    let scene = MockScene::new("integration scene");
    let handle = scene.handle();
    let persistence = PersistenceManager::new(
        PersistenceConfig::default(),
        Box::new(MemoryStore::new()),
        Box::new(DirectorySink::new(export_dir)),
    );
    let controller = AvatarController::new(config, Box::new(scene), persistence);
    (controller, handle)
}

/// Wait for a runtime message matching `matches`, draining everything else
pub fn wait_for(
    handle: &RuntimeHandle,
    mut matches: impl FnMut(&RuntimeMessage) -> bool,
) -> Option<RuntimeMessage> {
    let deadline = Instant::now() + super::message_timeout();
    while Instant::now() < deadline {
        if let Some(message) = handle.recv_timeout(Duration::from_millis(50)) {
            if matches(&message) {
                return Some(message);
            }
        }
    }
    None
}
