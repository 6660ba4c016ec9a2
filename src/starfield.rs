//! Static background point clouds.
//!
//! These are generated once per session and never rewritten. The star shell
//! only rotates, which the renderer applies as a model transform.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::color::hsl_to_rgb;
use crate::config::ColorMode;

/// Half extent of the cube stars are scattered in.
const STAR_EXTENT: f32 = 150.0;
const STAR_OPACITY: f32 = 0.4;
const SOLAR_OPACITY: f32 = 0.4;
const SOLAR_SIZE: f32 = 2.0;

/// What a cloud is, which decides how it is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudKind {
    /// Twinkling background stars.
    Stars,
    /// Warm particles around the fractal plane.
    Solar,
}

/// A static set of coloured points.
#[derive(Debug, Clone)]
pub struct PointCloud {
    kind: CloudKind,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    alphas: Vec<f32>,
    sizes: Vec<f32>,
    /// Rotation about Y per rendered frame, in radians.
    spin: f32,
}

impl PointCloud {
    /// Star shell in the hue band of `mode`.
    pub fn stars(mode: ColorMode, count: usize, spin: f32, rng: &mut impl Rng) -> Self {
        let mut cloud = Self::empty(CloudKind::Stars, count, spin);
        for _ in 0..count {
            cloud.positions.push([
                (rng.gen::<f32>() - 0.5) * STAR_EXTENT * 2.0,
                (rng.gen::<f32>() - 0.5) * STAR_EXTENT * 2.0,
                (rng.gen::<f32>() - 0.5) * STAR_EXTENT * 2.0,
            ]);
            let color = match mode {
                ColorMode::Attractor => hsl_to_rgb(
                    rng.gen::<f32>() * 0.08 + 0.65,
                    0.4,
                    rng.gen::<f32>() * 0.3 + 0.4,
                ),
                ColorMode::Fractal => hsl_to_rgb(
                    0.08 + rng.gen::<f32>() * 0.08,
                    0.6,
                    0.3 + rng.gen::<f32>() * 0.2,
                ),
            };
            cloud.colors.push(color);
            cloud.alphas.push(STAR_OPACITY);
            cloud.sizes.push(rng.gen::<f32>() * 1.5 + 0.8);
        }
        cloud
    }

    /// Spherical shell of warm particles with radii in `[20, 65)`.
    pub fn solar(count: usize, rng: &mut impl Rng) -> Self {
        let mut cloud = Self::empty(CloudKind::Solar, count, 0.0);
        for _ in 0..count {
            let radius = rng.gen::<f32>() * 45.0 + 20.0;
            let theta = rng.gen::<f32>() * TAU;
            let phi = rng.gen::<f32>() * TAU;
            cloud.positions.push([
                theta.cos() * phi.sin() * radius,
                theta.sin() * phi.sin() * radius,
                phi.cos() * radius,
            ]);
            cloud
                .colors
                .push(hsl_to_rgb(0.08 + rng.gen::<f32>() * 0.08, 0.7, 0.45));
            cloud.alphas.push(SOLAR_OPACITY);
            cloud.sizes.push(SOLAR_SIZE);
        }
        cloud
    }

    fn empty(kind: CloudKind, count: usize, spin: f32) -> Self {
        Self {
            kind,
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            alphas: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            spin,
        }
    }

    #[inline]
    pub fn kind(&self) -> CloudKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
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

    /// Model transform after `frame` rendered frames.
    pub fn model_matrix(&self, frame: u64) -> Mat4 {
        Mat4::from_rotation_y(self.spin * frame as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stars_fill_cube() {
        let mut rng = StdRng::seed_from_u64(1);
        let stars = PointCloud::stars(ColorMode::Attractor, 500, 0.0001, &mut rng);
        assert_eq!(stars.len(), 500);
        assert_eq!(stars.kind(), CloudKind::Stars);
        for p in stars.positions() {
            assert!(p.iter().all(|c| c.abs() <= STAR_EXTENT));
        }
        for s in stars.sizes() {
            assert!((0.8..=2.3).contains(s));
        }
    }

    #[test]
    fn test_star_hue_band_depends_on_mode() {
        let mut rng = StdRng::seed_from_u64(2);
        let cool = PointCloud::stars(ColorMode::Attractor, 200, 0.0, &mut rng);
        let warm = PointCloud::stars(ColorMode::Fractal, 200, 0.0, &mut rng);
        // Blue dominates the cool band, red the warm one.
        assert!(cool.colors().iter().all(|c| c[2] >= c[0]));
        assert!(warm.colors().iter().all(|c| c[0] >= c[2]));
    }

    #[test]
    fn test_solar_shell_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let solar = PointCloud::solar(300, &mut rng);
        for p in solar.positions() {
            let r = Vec3::from_array(*p).length();
            assert!((19.99..=65.01).contains(&r), "radius {r}");
        }
    }

    #[test]
    fn test_spin_accumulates_per_frame() {
        let mut rng = StdRng::seed_from_u64(4);
        let stars = PointCloud::stars(ColorMode::Attractor, 1, 0.5, &mut rng);
        let expected = Mat4::from_rotation_y(1.0);
        assert!(stars.model_matrix(2).abs_diff_eq(expected, 1e-6));
    }
}
