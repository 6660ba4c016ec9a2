//! Trail systems: Lorenz trajectories recorded into fixed ring buffers.
//!
//! A [`TrailSystem`] is built fully populated: after a discarded settling run
//! every slot is filled with a sample of the trajectory, coloured along a hue
//! ramp and faded towards the end of the buffer. From then on each frame
//! overwrites exactly one slot at the write cursor, so per-frame cost does not
//! depend on the buffer capacity.
//!
//! ```ignore
//! let mut trail = TrailSystem::new(0, seed, 0.0, &layout);
//! let write = trail.advance(&FrameStep {
//!     params: layout.lorenz,
//!     steps: 4,
//!     scale: 1.2,
//!     elapsed: 0.5,
//! });
//! upload(trail.position_floats(), write.slot);
//! ```

use glam::DVec3;

use crate::color;
use crate::config::TrailSeed;
use crate::lorenz::LorenzParams;

/// Construction parameters shared by every trail in a roster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailLayout {
    /// Ring buffer capacity.
    pub capacity: usize,
    /// Discarded integration steps before recording starts.
    pub settle_steps: u32,
    /// Integration steps between recorded construction samples.
    pub steps_per_sample: u32,
    /// Scale applied to construction samples.
    pub scale: f32,
    /// Unperturbed parameters, used for construction and reseeding.
    pub lorenz: LorenzParams,
}

/// Input to one per-frame update of a trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Parameters for this frame, usually modulated.
    pub params: LorenzParams,
    /// Integration steps to take.
    pub steps: u32,
    /// Scale applied to the recorded sample.
    pub scale: f32,
    /// Virtual time, drives the colour cycle.
    pub elapsed: f64,
}

/// What a frame update wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWrite {
    /// Index of the overwritten slot.
    pub slot: usize,
    /// Whether the trajectory had to be reseeded this frame.
    pub reseeded: bool,
}

/// One independently evolving trail.
#[derive(Debug, Clone)]
pub struct TrailSystem {
    index: usize,
    seed: DVec3,
    base_hue: f32,
    phase: f32,
    base_params: LorenzParams,
    settle_steps: u32,
    state: DVec3,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    alphas: Vec<f32>,
    sizes: Vec<f32>,
    cursor: usize,
    dirty_slot: Option<usize>,
    writes: u64,
    reseeds: u32,
}

impl TrailSystem {
    /// Build trail `index` of a roster from its seed.
    ///
    /// # Panics
    ///
    /// Panics if `layout.capacity` is zero. [`EngineConfig::validate`](crate::EngineConfig::validate)
    /// rejects such layouts before a session builds trails.
    pub fn new(index: usize, seed: TrailSeed, phase: f32, layout: &TrailLayout) -> Self {
        assert!(layout.capacity > 0, "trail capacity must be non-zero");

        let n = layout.capacity;
        let mut positions = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut alphas = Vec::with_capacity(n);
        let mut sizes = Vec::with_capacity(n);

        let params = layout.lorenz;
        let mut state = params.advance(seed.position, layout.settle_steps);

        for i in 0..n {
            state = params.advance(state, layout.steps_per_sample);
            let t = i as f32 / n as f32;

            positions.push(scaled(state, layout.scale));
            colors.push(color::slot_color(seed.base_hue, t));
            alphas.push(color::slot_opacity(t));
            sizes.push(color::slot_size(t));
        }

        Self {
            index,
            seed: seed.position,
            base_hue: seed.base_hue,
            phase,
            base_params: params,
            settle_steps: layout.settle_steps,
            state,
            positions,
            colors,
            alphas,
            sizes,
            cursor: 0,
            dirty_slot: None,
            writes: 0,
            reseeds: 0,
        }
    }

    /// Advance the trajectory by one frame and overwrite the cursor slot.
    pub fn advance(&mut self, step: &FrameStep) -> SlotWrite {
        let mut reseeded = false;

        if !self.state.is_finite() {
            self.reseed();
            reseeded = true;
        }

        for _ in 0..step.steps {
            let next = step.params.step(self.state);
            if next.is_finite() {
                self.state = next;
            } else {
                self.reseed();
                reseeded = true;
                break;
            }
        }

        let slot = self.cursor;
        self.positions[slot] = match scaled(self.state, step.scale) {
            p if p.iter().all(|v| v.is_finite()) => p,
            _ => {
                log::warn!(
                    "trail {}: scale {} overflows the position buffer, writing unscaled",
                    self.index,
                    step.scale
                );
                scaled(self.state, 1.0)
            }
        };
        self.colors[slot] = color::frame_color(self.base_hue, step.elapsed, self.index);

        self.cursor = (self.cursor + 1) % self.capacity();
        self.dirty_slot = Some(slot);
        self.writes += 1;

        SlotWrite { slot, reseeded }
    }

    /// Restart the trajectory from the original seed, re-running the
    /// settling phase with the unperturbed parameters.
    pub fn reseed(&mut self) {
        log::warn!(
            "trail {} left the bounded regime at {:?}, reseeding",
            self.index,
            self.state
        );
        self.state = self.base_params.advance(self.seed, self.settle_steps);
        self.reseeds += 1;
    }

    /// Position of this system in the roster.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Ring buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Slot the next frame will overwrite.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current (unscaled) trajectory state.
    #[inline]
    pub fn state(&self) -> DVec3 {
        self.state
    }

    /// Original seed position.
    #[inline]
    pub fn seed(&self) -> DVec3 {
        self.seed
    }

    #[inline]
    pub fn base_hue(&self) -> f32 {
        self.base_hue
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Time value handed to this system's shader.
    #[inline]
    pub fn shader_time(&self, elapsed: f64) -> f32 {
        (elapsed + self.phase as f64) as f32
    }

    /// Slot written by the most recent frame, if any.
    #[inline]
    pub fn dirty_slot(&self) -> Option<usize> {
        self.dirty_slot
    }

    /// Total frame writes since construction.
    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Number of times this system has been reseeded.
    #[inline]
    pub fn reseeds(&self) -> u32 {
        self.reseeds
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Positions as a flat `3 * capacity` float buffer.
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colours as a flat `3 * capacity` float buffer.
    pub fn color_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}

fn scaled(state: DVec3, scale: f32) -> [f32; 3] {
    (state * scale as f64).as_vec3().to_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorenz::Modulation;

    fn layout(capacity: usize) -> TrailLayout {
        TrailLayout {
            capacity,
            settle_steps: 1000,
            steps_per_sample: 2,
            scale: 1.0,
            lorenz: LorenzParams::default(),
        }
    }

    fn seed() -> TrailSeed {
        TrailSeed {
            position: DVec3::new(0.1, 0.0, 0.0),
            base_hue: 0.65,
        }
    }

    fn frame(elapsed: f64) -> FrameStep {
        FrameStep {
            params: LorenzParams::default(),
            steps: 4,
            scale: 1.0,
            elapsed,
        }
    }

    #[test]
    fn test_cold_start() {
        let trail = TrailSystem::new(0, seed(), 0.0, &layout(8000));

        assert_eq!(trail.capacity(), 8000);
        assert_eq!(trail.cursor(), 0);
        assert_eq!(trail.position_floats().len(), 24_000);
        assert_eq!(trail.color_floats().len(), 24_000);
        assert_eq!(trail.alphas().len(), 8000);
        assert_eq!(trail.sizes().len(), 8000);
        assert!(trail.position_floats().iter().all(|v| v.is_finite()));
        assert!(trail.color_floats().iter().all(|v| (0.0..=1.0).contains(v)));
        assert_ne!(trail.positions()[0], trail.positions()[7999]);
    }

    #[test]
    fn test_settling_is_discarded() {
        let layout = layout(16);
        let trail = TrailSystem::new(0, seed(), 0.0, &layout);

        let settled = layout.lorenz.advance(seed().position, layout.settle_steps);
        let first = layout.lorenz.advance(settled, layout.steps_per_sample);

        assert_eq!(trail.positions()[0], first.as_vec3().to_array());
        let raw_seed = seed().position.as_vec3().to_array();
        assert!(trail.positions().iter().all(|p| *p != raw_seed));
    }

    #[test]
    fn test_construction_fades_towards_tail() {
        let trail = TrailSystem::new(0, seed(), 0.0, &layout(100));
        assert!(trail.alphas().windows(2).all(|w| w[0] >= w[1]));
        assert!(trail.sizes().windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ring_buffer_write_counts() {
        let n = 64;
        let mut trail = TrailSystem::new(0, seed(), 0.0, &layout(n));
        let mut counts = vec![0u32; n];

        let (k, r) = (3, 17);
        for f in 0..(k * n + r) {
            let write = trail.advance(&frame(f as f64 * 0.008));
            counts[write.slot] += 1;
        }

        for (slot, count) in counts.iter().enumerate() {
            let expected = if slot < r { k + 1 } else { k };
            assert_eq!(*count as usize, expected, "slot {slot}");
        }
        assert_eq!(trail.cursor(), r);
        assert_eq!(trail.writes(), (k * n + r) as u64);
    }

    #[test]
    fn test_advance_marks_single_dirty_slot() {
        let mut trail = TrailSystem::new(0, seed(), 0.0, &layout(8));
        assert_eq!(trail.dirty_slot(), None);
        trail.advance(&frame(0.0));
        assert_eq!(trail.dirty_slot(), Some(0));
        trail.advance(&frame(0.008));
        assert_eq!(trail.dirty_slot(), Some(1));
    }

    #[test]
    fn test_advance_recolors_with_time() {
        let mut trail = TrailSystem::new(2, seed(), 0.0, &layout(8));
        trail.advance(&frame(4.0));
        assert_eq!(trail.colors()[0], color::frame_color(0.65, 4.0, 2));
    }

    #[test]
    fn test_reseed_on_non_finite_state() {
        let layout = layout(32);
        let mut trail = TrailSystem::new(1, seed(), 0.0, &layout);
        for f in 0..5 {
            trail.advance(&frame(f as f64));
        }

        trail.state = DVec3::new(f64::NAN, 1.0, f64::INFINITY);

        let step = FrameStep {
            params: Modulation::default().apply(&layout.lorenz, 2.0, 1),
            steps: 4,
            scale: 1.25,
            elapsed: 2.0,
        };
        let write = trail.advance(&step);

        assert!(write.reseeded);
        assert_eq!(write.slot, 5);
        assert_eq!(trail.reseeds(), 1);

        let restarted = layout.lorenz.advance(seed().position, layout.settle_steps);
        let expected = step.params.advance(restarted, step.steps) * 1.25;
        let recorded = trail.positions()[5];
        assert!(recorded.iter().all(|v| v.is_finite()));
        assert_eq!(recorded, expected.as_vec3().to_array());
    }

    #[test]
    fn test_divergent_params_reseed_mid_frame() {
        let mut trail = TrailSystem::new(0, seed(), 0.0, &layout(8));
        let step = FrameStep {
            params: LorenzParams {
                dt: 1e300,
                ..LorenzParams::default()
            },
            steps: 4,
            scale: 1.0,
            elapsed: 0.0,
        };
        let write = trail.advance(&step);
        assert!(write.reseeded);
        assert!(trail.state().is_finite());
        assert!(trail.positions()[write.slot].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_overflowing_scale_never_writes_infinity() {
        let mut trail = TrailSystem::new(0, seed(), 0.0, &layout(8));
        let step = FrameStep {
            scale: f32::MAX,
            ..frame(0.0)
        };
        let write = trail.advance(&step);
        assert!(!write.reseeded);
        let recorded = trail.positions()[write.slot];
        assert!(recorded.iter().all(|v| v.is_finite()));
        assert_eq!(recorded, trail.state().as_vec3().to_array());
    }

    #[test]
    fn test_shader_time_includes_phase() {
        let trail = TrailSystem::new(0, seed(), 1.5, &layout(4));
        assert_eq!(trail.shader_time(2.0), 3.5);
    }
}
