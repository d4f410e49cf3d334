//! Benchmarks for session serialization and the discovery poll

use criterion::{
    criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mocap_rs::config::{ControllerConfig, PersistenceConfig};
use mocap_rs::controller::AvatarController;
use mocap_rs::persist::export::CollectingSink;
use mocap_rs::persist::{MemoryStore, PersistenceManager};
use mocap_rs::scene::mock::MockScene;
use mocap_rs::types::CapturePayload;
use mocap_rs::RecordingSession;
use serde_json::json;
use std::time::{Duration, Instant};

/// A payload shaped like real capture data: one pose sample per frame
fn payload(frames: usize) -> CapturePayload {
    let samples: Vec<_> = (0..frames)
        .map(|i| {
            json!({
                "timestamp": i as u64 * 16,
                "position": [0.1 * i as f64, 1.6, -0.2],
                "rotation": [0.0, 0.707, 0.0, 0.707],
            })
        })
        .collect();
    CapturePayload::from_value(json!(samples))
}

fn session_with(devices: usize, frames: usize) -> RecordingSession {
    let mut session = RecordingSession::new();
    session.set_head(payload(frames));
    for i in 0..devices {
        session.insert_device(format!("tracker-{i}"), payload(frames));
    }
    session
}

fn bench_session_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_serialize");
    for devices in [2usize, 8, 32] {
        let session = session_with(devices, 600); // ~10s of capture at 60Hz
        let bytes = session.to_json_string().unwrap().len() as u64;
        group.throughput(Throughput::Bytes(bytes));
        group.bench_with_input(
            BenchmarkId::from_parameter(devices),
            &session,
            |b, session| b.iter(|| session.to_json_string().unwrap()),
        );
    }
    group.finish();
}

fn bench_session_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_deserialize");
    for devices in [2usize, 8, 32] {
        let text = session_with(devices, 600).to_json_string().unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(devices), &text, |b, text| {
            b.iter(|| RecordingSession::from_json_str(text).unwrap())
        });
    }
    group.finish();
}

fn bench_discovery_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery_poll");
    for devices in [4usize, 16, 64] {
        group.throughput(Throughput::Elements(devices as u64));
        group.bench_with_input(
            BenchmarkId::new("first_poll", devices),
            &devices,
            |b, &devices| {
                b.iter_batched(
                    || {
                        let scene = MockScene::new("bench scene");
                        let handle = scene.handle();
                        for i in 0..devices {
                            handle.add_device(format!("tracker-{i}"));
                        }
                        let persistence = PersistenceManager::new(
                            PersistenceConfig::default(),
                            Box::new(MemoryStore::new()),
                            Box::new(CollectingSink::new()),
                        );
                        let config = ControllerConfig {
                            auto_play: false,
                            ..ControllerConfig::default()
                        };
                        let mut controller =
                            AvatarController::new(config, Box::new(scene), persistence);
                        let t0 = Instant::now();
                        controller.activate(t0);
                        (controller, t0)
                    },
                    |(mut controller, t0)| {
                        controller.tick_at(t0 + Duration::from_millis(100))
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_session_serialize,
    bench_session_deserialize,
    bench_discovery_poll
);
criterion_main!(benches);
