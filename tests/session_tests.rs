//! Integration tests driving the engine through its public API, without a
//! window.

use std::time::{Duration, Instant};

use attractor_field::config::{ColorMode, DeviceClass, EngineConfig, TrailSeed, Viewport};
use attractor_field::input::InputSnapshot;
use attractor_field::lorenz::LorenzParams;
use attractor_field::session::EngineSession;
use attractor_field::trail::{FrameStep, TrailLayout, TrailSystem};
use glam::DVec3;

const CAPACITY: usize = 64;

fn config() -> EngineConfig {
    EngineConfig::new()
        .with_point_capacity(CAPACITY)
        .with_settle_steps(200)
        .with_rng_seed(2024)
}

/// Feed `count` frame opportunities spaced one frame interval apart.
fn run_frames(session: &mut EngineSession, start: Instant, interval: Duration, count: u32) {
    for i in 0..count {
        let now = start + interval * i;
        assert!(session.frame(now, &InputSnapshot::default()).is_some());
    }
}

#[test]
fn test_cold_start_fills_every_slot() {
    let session = EngineSession::new(&config(), Viewport::default()).unwrap();
    assert_eq!(session.trails().len(), 5);

    for trail in session.trails() {
        assert_eq!(trail.capacity(), CAPACITY);
        assert_eq!(trail.position_floats().len(), 3 * CAPACITY);
        assert_eq!(trail.color_floats().len(), 3 * CAPACITY);
        assert_eq!(trail.alphas().len(), CAPACITY);
        assert_eq!(trail.sizes().len(), CAPACITY);
        assert!(trail.position_floats().iter().all(|v| v.is_finite()));
        assert_eq!(trail.cursor(), 0);
        assert_eq!(trail.dirty_slot(), None);
    }
}

#[test]
fn test_construction_hues_are_continuous() {
    let dense = config().with_point_capacity(512);
    let session = EngineSession::new(&dense, Viewport::default()).unwrap();
    for trail in session.trails() {
        let colors = trail.colors();
        for pair in colors.windows(2) {
            let step: f32 = pair[0]
                .iter()
                .zip(pair[1].iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max);
            assert!(step < 0.05, "adjacent construction colours jump by {step}");
        }
    }
}

#[test]
fn test_ring_cursor_after_wrapping() {
    let mut session = EngineSession::new(&config(), Viewport::default()).unwrap();
    let interval = config().frame_interval();
    let frames = 2 * CAPACITY as u32 + 5;

    run_frames(&mut session, Instant::now(), interval, frames);

    for trail in session.trails() {
        assert_eq!(trail.writes(), frames as u64);
        assert_eq!(trail.cursor(), 5);
        assert_eq!(trail.dirty_slot(), Some(4));
    }
}

#[test]
fn test_throttle_bounds_frames_in_window() {
    let mut session = EngineSession::new(&config(), Viewport::default()).unwrap();
    let fps = config().target_fps() as f64;
    let start = Instant::now();
    let window = Duration::from_millis(500);

    let mut rendered = 0u64;
    let mut t = Duration::ZERO;
    while t <= window {
        if session.frame(start + t, &InputSnapshot::default()).is_some() {
            rendered += 1;
        }
        t += Duration::from_millis(1);
    }

    let bound = (window.as_secs_f64() * fps).floor() as u64 + 1;
    assert!(rendered <= bound, "{rendered} frames in {window:?}, bound {bound}");
    assert!(rendered >= bound - 1);
    assert_eq!(session.trails()[0].writes(), rendered);
}

#[test]
fn test_virtual_time_follows_frames_not_wall_clock() {
    let mut session = EngineSession::new(&config(), Viewport::default()).unwrap();
    let start = Instant::now();

    let first = session.frame(start, &InputSnapshot::default()).unwrap();
    // A long stall still advances virtual time by a single step.
    let second = session
        .frame(start + Duration::from_secs(5), &InputSnapshot::default())
        .unwrap();

    let step = DeviceClass::Capable.time_step() as f64;
    assert!((first.elapsed - step).abs() < 1e-6);
    assert!((second.elapsed - 2.0 * step).abs() < 1e-6);
    assert_eq!(second.frame, 2);
}

#[test]
fn test_formation_scale_grows_monotonically() {
    let mut session = EngineSession::new(&config(), Viewport::default()).unwrap();
    let interval = config().frame_interval();
    let start = Instant::now();

    let mut last = 0.0;
    for i in 0..200u32 {
        let frame = session
            .frame(start + interval * i, &InputSnapshot::default())
            .unwrap();
        assert!(frame.scale >= last);
        assert!((1.0..=1.5).contains(&frame.scale));
        last = frame.scale;
    }
}

#[test]
fn test_trails_stay_bounded_over_many_frames() {
    let mut session = EngineSession::new(&config(), Viewport::default()).unwrap();
    let interval = config().frame_interval();
    run_frames(&mut session, Instant::now(), interval, 2000);

    for trail in session.trails() {
        assert!(trail.state().length() <= 100.0);
        assert_eq!(trail.reseeds(), 0);
    }
}

#[test]
fn test_divergent_step_reseeds_and_recovers() {
    let layout = TrailLayout {
        capacity: 16,
        settle_steps: 100,
        steps_per_sample: 2,
        scale: 1.0,
        lorenz: LorenzParams::default(),
    };
    let seed = TrailSeed {
        position: DVec3::new(0.1, 0.0, 0.0),
        base_hue: 0.65,
    };
    let mut trail = TrailSystem::new(0, seed, 0.0, &layout);

    let unstable = FrameStep {
        params: LorenzParams {
            dt: 1.0,
            ..LorenzParams::default()
        },
        steps: 50,
        scale: 1.0,
        elapsed: 0.0,
    };

    let mut reseeded = false;
    for _ in 0..20 {
        let write = trail.advance(&unstable);
        assert!(trail.state().is_finite());
        if write.reseeded {
            reseeded = true;
            break;
        }
    }
    assert!(reseeded);
    assert!(trail.reseeds() >= 1);
    assert!(trail.position_floats().iter().all(|v| v.is_finite()));
}

#[test]
fn test_mode_toggle_builds_fresh_session() {
    let mut attractor = EngineSession::new(&config(), Viewport::new(800, 600)).unwrap();
    attractor.frame(Instant::now(), &InputSnapshot::default());
    attractor.stop();
    assert!(attractor.trails().is_empty());

    let toggled = config().with_color_mode(ColorMode::Attractor.toggled());
    let fractal = EngineSession::new(&toggled, attractor.viewport()).unwrap();
    assert_eq!(fractal.mode(), ColorMode::Fractal);
    assert!(fractal.trails().is_empty());
    assert_eq!(fractal.clock().frame(), 0);
    assert_eq!(fractal.viewport(), Viewport::new(800, 600));
}

#[test]
fn test_config_file_round_trip_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");

    let saved = config()
        .with_device_class(DeviceClass::Constrained)
        .with_trail_count(2);
    saved.save(&path).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, saved);

    let session = EngineSession::new(&loaded, Viewport::default()).unwrap();
    assert_eq!(session.trails().len(), 2);
    assert_eq!(session.clock().time_step(), DeviceClass::Constrained.time_step());
}
