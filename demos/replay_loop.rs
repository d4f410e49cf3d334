//! Scripted record-and-replay session over the mock scene.
//!
//! Runs the controller on a worker thread, records for half a second while
//! two tracked hands stream samples, then lets auto-replay take over and
//! prints every runtime message. Exported session files land in
//! `./recordings`.
//!
//! ```sh
//! cargo run --example replay_loop
//! ```

use anyhow::Result;
use mocap_rs::config::{ControllerConfig, PersistenceConfig};
use mocap_rs::controller::{AvatarController, KEY_C, KEY_SPACE};
use mocap_rs::persist::PersistenceManager;
use mocap_rs::runtime::{ControllerRuntime, RuntimeMessage};
use mocap_rs::scene::mock::MockScene;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scene = MockScene::new("demo room");
    let scene_control = scene.handle();
    scene_control.add_device("left-hand");
    scene_control.add_device("right-hand");

    let persistence =
        PersistenceManager::in_memory(PersistenceConfig::default(), "recordings");
    let controller =
        AvatarController::new(ControllerConfig::default(), Box::new(scene), persistence);

    let (runtime, handle) = ControllerRuntime::new(controller);
    let worker = thread::spawn(move || runtime.run());

    // Let discovery pick the hands up, then run one record cycle. With the
    // default config the stop auto-replays the fresh session.
    thread::sleep(Duration::from_millis(250));
    handle.key(KEY_SPACE);
    thread::sleep(Duration::from_millis(500));
    handle.key(KEY_SPACE);
    thread::sleep(Duration::from_millis(300));

    handle.key(KEY_C);
    handle.shutdown();
    worker.join().ok();

    for message in handle.drain() {
        match &message {
            RuntimeMessage::RecordingStopped { entries } => {
                println!("recording stopped with {entries} tracks");
            }
            RuntimeMessage::ReplayStarted { source } => {
                println!("replay started from the {} session", source.display_name());
            }
            other => println!("{other:?}"),
        }
    }

    Ok(())
}
