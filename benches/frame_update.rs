//! Benchmarks for the CPU side of a frame.
//!
//! Run with: `cargo bench`

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;

use attractor_field::config::{DeviceClass, EngineConfig, TrailSeed, Viewport};
use attractor_field::input::InputSnapshot;
use attractor_field::lorenz::LorenzParams;
use attractor_field::session::EngineSession;
use attractor_field::trail::{FrameStep, TrailLayout, TrailSystem};

fn bench_rk4_step(c: &mut Criterion) {
    let params = LorenzParams::default();
    let p = DVec3::new(-5.0, -8.0, 22.0);
    c.bench_function("rk4_step", |b| b.iter(|| black_box(params.step(black_box(p)))));
}

fn bench_trail_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("trail_construction");
    for capacity in [4000usize, 8000] {
        let layout = TrailLayout {
            capacity,
            settle_steps: 1000,
            steps_per_sample: 2,
            scale: 1.0,
            lorenz: LorenzParams::default(),
        };
        let seed = TrailSeed {
            position: DVec3::new(0.1, 0.0, 0.0),
            base_hue: 0.65,
        };
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &layout, |b, layout| {
            b.iter(|| black_box(TrailSystem::new(0, seed, 0.0, layout)))
        });
    }
    group.finish();
}

fn bench_trail_advance(c: &mut Criterion) {
    let layout = TrailLayout {
        capacity: 8000,
        settle_steps: 1000,
        steps_per_sample: 2,
        scale: 1.0,
        lorenz: LorenzParams::default(),
    };
    let seed = TrailSeed {
        position: DVec3::new(0.1, 0.1, 0.1),
        base_hue: 0.15,
    };
    let mut trail = TrailSystem::new(1, seed, 0.0, &layout);
    let step = FrameStep {
        params: layout.lorenz,
        steps: 4,
        scale: 1.2,
        elapsed: 1.0,
    };
    c.bench_function("trail_advance", |b| b.iter(|| black_box(trail.advance(&step))));
}

fn bench_session_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_frame");
    for device in [DeviceClass::Capable, DeviceClass::Constrained] {
        let config = EngineConfig::new()
            .with_device_class(device)
            .with_rng_seed(7);
        let mut session = EngineSession::new(&config, Viewport::default()).unwrap();
        let interval = config.frame_interval();
        let mut now = Instant::now();
        group.bench_function(format!("{device:?}"), |b| {
            b.iter(|| {
                now += interval + Duration::from_micros(1);
                black_box(session.frame(now, &InputSnapshot::default()))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_rk4_step,
    bench_trail_construction,
    bench_trail_advance,
    bench_session_frame
);
criterion_main!(benches);
