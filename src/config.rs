//! Engine configuration.
//!
//! An [`EngineConfig`] can be assembled in code with the `with_*` builder
//! methods or loaded from JSON. Everything not named in the file falls back to
//! the defaults for the selected [`DeviceClass`].
//!
//! ```ignore
//! use attractor_field::{ColorMode, DeviceClass, EngineConfig};
//!
//! let config = EngineConfig::new()
//!     .with_device_class(DeviceClass::Constrained)
//!     .with_color_mode(ColorMode::Fractal);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lorenz::{LorenzParams, Modulation};

/// Seed positions and base hues of the trail roster.
const ROSTER: [([f64; 3], f32); 5] = [
    ([0.1, 0.0, 0.0], 0.65),
    ([0.1, 0.1, 0.1], 0.15),
    ([-0.1, 0.1, 0.0], 0.85),
    ([0.0, 0.1, -0.1], 0.35),
    ([0.05, -0.05, 0.05], 0.05),
];

/// Hardware class of the display.
///
/// Constrained displays get shorter trails, fewer integration steps per
/// frame, fewer systems and a lower frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    #[default]
    Capable,
    Constrained,
}

impl DeviceClass {
    /// Ring buffer capacity per trail.
    pub fn point_capacity(self) -> usize {
        match self {
            DeviceClass::Capable => 8000,
            DeviceClass::Constrained => 4000,
        }
    }

    /// Integration steps per rendered frame.
    pub fn steps_per_frame(self) -> u32 {
        match self {
            DeviceClass::Capable => 4,
            DeviceClass::Constrained => 2,
        }
    }

    /// Frame rate ceiling.
    pub fn target_fps(self) -> u32 {
        match self {
            DeviceClass::Capable => 60,
            DeviceClass::Constrained => 30,
        }
    }

    /// Virtual time added per rendered frame.
    pub fn time_step(self) -> f32 {
        match self {
            DeviceClass::Capable => 0.008,
            DeviceClass::Constrained => 0.004,
        }
    }

    /// Number of trail systems in the roster.
    pub fn trail_count(self) -> usize {
        match self {
            DeviceClass::Capable => 5,
            DeviceClass::Constrained => 3,
        }
    }

    /// Number of background stars.
    pub fn star_count(self) -> usize {
        match self {
            DeviceClass::Capable => 2000,
            DeviceClass::Constrained => 1000,
        }
    }

    /// Number of points in the fractal-mode solar shell.
    pub fn solar_count(self) -> usize {
        match self {
            DeviceClass::Capable => 800,
            DeviceClass::Constrained => 400,
        }
    }

    /// Camera speed multiplier relative to a capable display.
    pub fn motion_scale(self) -> f32 {
        match self {
            DeviceClass::Capable => 1.0,
            DeviceClass::Constrained => 0.5,
        }
    }
}

/// Gamma used for sRGB to linear conversion, matching the shaders.
const SRGB_GAMMA: f64 = 2.2;

/// Largest accepted formation scale.
pub const MAX_FORMATION_SCALE: f32 = 1000.0;

/// Which background look a session renders. Mutually exclusive per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Lorenz trails over a cool star field.
    #[default]
    Attractor,
    /// Zoomable Mandelbrot backdrop with warm particles.
    Fractal,
}

impl ColorMode {
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Attractor => ColorMode::Fractal,
            ColorMode::Fractal => ColorMode::Attractor,
        }
    }

    /// Background colour as authored, in sRGB.
    pub fn background_srgb(self) -> [f64; 3] {
        match self {
            ColorMode::Attractor => [0.0, 0.02, 0.063],
            ColorMode::Fractal => [0.949, 0.91, 0.835],
        }
    }

    /// Background clear colour in linear space, for an sRGB render target.
    pub fn clear_color(self) -> [f64; 3] {
        self.background_srgb().map(|c| c.powf(SRGB_GAMMA))
    }
}

/// Viewport size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A degenerate viewport reports 1.0.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Scale easing that makes the attractor "form" after a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formation {
    /// Scale used at construction and at `elapsed = 0`.
    pub initial_scale: f32,
    /// Scale reached once `duration` of virtual time has passed.
    pub target_scale: f32,
    /// Virtual time over which the scale eases.
    pub duration: f32,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            target_scale: 1.5,
            duration: 10.0,
        }
    }
}

impl Formation {
    /// Cubic ease-out from `initial_scale` to `target_scale`.
    pub fn scale_at(&self, elapsed: f64) -> f32 {
        let progress = (elapsed / self.duration as f64).clamp(0.0, 1.0) as f32;
        let eased = 1.0 - (1.0 - progress).powi(3);
        self.initial_scale + (self.target_scale - self.initial_scale) * eased
    }
}

/// Seed of one trail system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSeed {
    pub position: DVec3,
    pub base_hue: f32,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub device_class: DeviceClass,
    pub color_mode: ColorMode,
    pub lorenz: LorenzParams,
    pub modulation: Modulation,
    pub formation: Formation,
    /// Discarded integration steps before a trail starts recording.
    pub settle_steps: u32,
    /// Integration steps between recorded construction samples.
    pub steps_per_sample: u32,
    /// Overrides [`DeviceClass::point_capacity`].
    pub point_capacity: Option<usize>,
    /// Overrides [`DeviceClass::steps_per_frame`].
    pub steps_per_frame: Option<u32>,
    /// Overrides [`DeviceClass::target_fps`].
    pub target_fps: Option<u32>,
    /// Overrides [`DeviceClass::trail_count`]; at most 5.
    pub trail_count: Option<usize>,
    /// Seed for phases and backdrop placement. Random when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_class: DeviceClass::default(),
            color_mode: ColorMode::default(),
            lorenz: LorenzParams::default(),
            modulation: Modulation::default(),
            formation: Formation::default(),
            settle_steps: 1000,
            steps_per_sample: 2,
            point_capacity: None,
            steps_per_frame: None,
            target_fps: None,
            trail_count: None,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device_class(mut self, device_class: DeviceClass) -> Self {
        self.device_class = device_class;
        self
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn with_lorenz(mut self, lorenz: LorenzParams) -> Self {
        self.lorenz = lorenz;
        self
    }

    pub fn with_modulation(mut self, modulation: Modulation) -> Self {
        self.modulation = modulation;
        self
    }

    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = formation;
        self
    }

    pub fn with_settle_steps(mut self, steps: u32) -> Self {
        self.settle_steps = steps;
        self
    }

    pub fn with_steps_per_sample(mut self, steps: u32) -> Self {
        self.steps_per_sample = steps;
        self
    }

    pub fn with_point_capacity(mut self, capacity: usize) -> Self {
        self.point_capacity = Some(capacity);
        self
    }

    pub fn with_steps_per_frame(mut self, steps: u32) -> Self {
        self.steps_per_frame = Some(steps);
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    pub fn with_trail_count(mut self, count: usize) -> Self {
        self.trail_count = Some(count);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn point_capacity(&self) -> usize {
        self.point_capacity
            .unwrap_or_else(|| self.device_class.point_capacity())
    }

    pub fn steps_per_frame(&self) -> u32 {
        self.steps_per_frame
            .unwrap_or_else(|| self.device_class.steps_per_frame())
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
            .unwrap_or_else(|| self.device_class.target_fps())
    }

    /// Shortest wall-clock gap between two rendered frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps().max(1) as f64)
    }

    /// Seeds of the trail roster, in roster order.
    pub fn trail_seeds(&self) -> Vec<TrailSeed> {
        let count = self
            .trail_count
            .unwrap_or_else(|| self.device_class.trail_count())
            .min(ROSTER.len());
        ROSTER[..count]
            .iter()
            .map(|(position, base_hue)| TrailSeed {
                position: DVec3::from_array(*position),
                base_hue: *base_hue,
            })
            .collect()
    }

    /// Reject values the engine cannot integrate or render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.lorenz.is_valid() {
            return Err(ConfigError::Invalid {
                field: "lorenz",
                reason: "sigma, rho, beta and dt must be finite and positive",
            });
        }
        let amplitudes = [
            self.modulation.rho_amplitude,
            self.modulation.sigma_amplitude,
            self.modulation.beta_amplitude,
        ];
        if amplitudes.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(ConfigError::Invalid {
                field: "modulation",
                reason: "amplitudes must be finite and non-negative",
            });
        }
        if self.modulation.sigma_amplitude >= self.lorenz.sigma
            || self.modulation.rho_amplitude >= self.lorenz.rho
            || self.modulation.beta_amplitude >= self.lorenz.beta
        {
            return Err(ConfigError::Invalid {
                field: "modulation",
                reason: "amplitudes must be smaller than the parameters they perturb",
            });
        }
        if !(self.formation.duration.is_finite() && self.formation.duration > 0.0) {
            return Err(ConfigError::Invalid {
                field: "formation.duration",
                reason: "must be finite and positive",
            });
        }
        let scale_ok = |s: f32| s > 0.0 && s <= MAX_FORMATION_SCALE;
        if !(scale_ok(self.formation.initial_scale) && scale_ok(self.formation.target_scale)) {
            return Err(ConfigError::Invalid {
                field: "formation",
                reason: "scales must be in (0, 1000]",
            });
        }
        if self.point_capacity() == 0 {
            return Err(ConfigError::Invalid {
                field: "point_capacity",
                reason: "must be at least 1",
            });
        }
        if self.steps_per_sample == 0 || self.steps_per_frame() == 0 {
            return Err(ConfigError::Invalid {
                field: "steps_per_frame",
                reason: "trails need at least one integration step per sample and frame",
            });
        }
        if self.target_fps() == 0 {
            return Err(ConfigError::Invalid {
                field: "target_fps",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
