//! Engine session: everything one running scene owns.
//!
//! A session is built when a scene starts and dropped, or [stopped](EngineSession::stop),
//! when it ends. Switching colour mode means building a new session rather
//! than mutating the roster of the old one.
//!
//! The per-frame entry point takes the wall-clock timestamp and an input
//! snapshot as arguments; the session never reaches out for ambient state.

use std::f32::consts::TAU;
use std::time::Instant;

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, CameraPath};
use crate::config::{ColorMode, EngineConfig, Formation, Viewport};
use crate::error::ConfigError;
use crate::fractal::FractalView;
use crate::grid::GridLines;
use crate::input::InputSnapshot;
use crate::lorenz::{LorenzParams, Modulation};
use crate::starfield::PointCloud;
use crate::time::{FrameClock, FrameTick};
use crate::trail::{FrameStep, TrailLayout, TrailSystem};

/// Star rotation per rendered frame on a capable display.
const STAR_SPIN: f32 = 0.0001;

/// Result of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Virtual time after this frame.
    pub elapsed: f64,
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Formation scale applied to this frame's trail writes.
    pub scale: f32,
    /// Camera eye position.
    pub eye: Vec3,
    /// Projection times view.
    pub view_proj: Mat4,
    /// Trails reseeded during this frame.
    pub reseeded: usize,
}

/// One active scene.
#[derive(Debug)]
pub struct EngineSession {
    mode: ColorMode,
    viewport: Viewport,
    clock: FrameClock,
    camera: Camera,
    base_params: LorenzParams,
    modulation: Modulation,
    formation: Formation,
    steps_per_frame: u32,
    trails: Vec<TrailSystem>,
    backdrop: Vec<PointCloud>,
    grid: Option<GridLines>,
    fractal: Option<FractalView>,
    active: bool,
}

impl EngineSession {
    /// Build a session for `config` on a viewport of the given size.
    pub fn new(config: &EngineConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let device = config.device_class;
        let mode = config.color_mode;

        let trails = match mode {
            ColorMode::Attractor => {
                let layout = TrailLayout {
                    capacity: config.point_capacity(),
                    settle_steps: config.settle_steps,
                    steps_per_sample: config.steps_per_sample,
                    scale: config.formation.initial_scale,
                    lorenz: config.lorenz,
                };
                config
                    .trail_seeds()
                    .into_iter()
                    .enumerate()
                    .map(|(index, seed)| {
                        let phase = rng.gen::<f32>() * TAU;
                        TrailSystem::new(index, seed, phase, &layout)
                    })
                    .collect()
            }
            ColorMode::Fractal => Vec::new(),
        };

        let mut backdrop = vec![PointCloud::stars(
            mode,
            device.star_count(),
            STAR_SPIN * device.motion_scale(),
            &mut rng,
        )];
        if mode == ColorMode::Fractal {
            backdrop.push(PointCloud::solar(device.solar_count(), &mut rng));
        }

        let fractal = (mode == ColorMode::Fractal).then(FractalView::new);

        log::info!(
            "session started: {:?} mode, {:?} display, {} trails x {} points, {} fps",
            mode,
            device,
            trails.len(),
            config.point_capacity(),
            config.target_fps()
        );

        Ok(Self {
            mode,
            viewport,
            clock: FrameClock::new(config.target_fps(), device.time_step()),
            camera: Camera::new(CameraPath::for_mode(mode, device), viewport),
            base_params: config.lorenz,
            modulation: config.modulation,
            formation: config.formation,
            steps_per_frame: config.steps_per_frame(),
            trails,
            backdrop,
            grid: Some(GridLines::floor()),
            fractal,
            active: true,
        })
    }

    /// Offer a redraw opportunity at `now`.
    ///
    /// Returns `None` when the frame is throttled or the session has been
    /// stopped. Otherwise every trail has advanced by one frame.
    pub fn frame(&mut self, now: Instant, input: &InputSnapshot) -> Option<Frame> {
        if !self.active {
            return None;
        }
        let tick = self.clock.tick(now)?;
        Some(self.advance(tick, input))
    }

    fn advance(&mut self, tick: FrameTick, input: &InputSnapshot) -> Frame {
        if let Some(view) = self.fractal.as_mut() {
            if let Some(ndc) = input.pointer_ndc {
                view.pointer_moved(ndc);
            }
            for &delta in &input.wheel {
                view.wheel(delta);
            }
        }

        let elapsed = tick.elapsed;
        let scale = self.formation.scale_at(elapsed);
        let mut reseeded = 0;

        for trail in &mut self.trails {
            let step = FrameStep {
                params: self
                    .modulation
                    .apply(&self.base_params, elapsed, trail.index()),
                steps: self.steps_per_frame,
                scale,
                elapsed,
            };
            if trail.advance(&step).reseeded {
                reseeded += 1;
            }
        }

        if reseeded > 0 {
            log::debug!("frame {}: {} trail(s) reseeded", tick.frame, reseeded);
        }

        Frame {
            elapsed,
            frame: tick.frame,
            scale,
            eye: self.camera.position(elapsed),
            view_proj: self.camera.view_proj(elapsed),
            reseeded,
        }
    }

    /// Apply a new viewport. Takes effect from the next frame.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.camera.resize(viewport);
    }

    /// Stop the session and release its buffers. Later frames do nothing.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.trails = Vec::new();
        self.backdrop = Vec::new();
        self.grid = None;
        self.fractal = None;
        log::info!("session stopped after {} frames", self.clock.frame());
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn trails(&self) -> &[TrailSystem] {
        &self.trails
    }

    /// Static background clouds, drawn before the trails.
    pub fn backdrop(&self) -> &[PointCloud] {
        &self.backdrop
    }

    /// Floor grid, present until the session is stopped.
    pub fn grid(&self) -> Option<&GridLines> {
        self.grid.as_ref()
    }

    /// Fractal view, present in [`ColorMode::Fractal`] sessions only.
    pub fn fractal(&self) -> Option<&FractalView> {
        self.fractal.as_ref()
    }
}
