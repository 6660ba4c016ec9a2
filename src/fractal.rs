//! Pan and zoom state of the Mandelbrot backdrop.
//!
//! Pointer movement pans the view around a fixed home position, with the pan
//! range shrinking as the zoom grows. Each wheel notch zooms by a fixed
//! factor. Zoom is clamped: the escape-time shader runs in single precision
//! and turns to noise well before `f32` overflows.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::Viewport;

const HOME_CENTER: Vec2 = Vec2::new(-0.5, 0.0);
/// Pan reach at zoom 1.0, in fractal-plane units per unit of NDC.
const PAN_SPEED: f32 = 0.4;
const ZOOM_IN_FACTOR: f32 = 1.08;
const ZOOM_OUT_FACTOR: f32 = 0.92;
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 1.0e5;

/// Uniform block of the fractal shader. Layout matches `Fractal` in
/// `fractal.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FractalUniforms {
    pub center: [f32; 2],
    pub resolution: [f32; 2],
    pub zoom: f32,
    pub time: f32,
    pub _padding: [f32; 2],
}

/// Current view into the fractal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalView {
    zoom: f32,
    center: Vec2,
}

impl Default for FractalView {
    fn default() -> Self {
        Self::new()
    }
}

impl FractalView {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            center: HOME_CENTER,
        }
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Pan to follow the pointer, given in normalized device coordinates.
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        let reach = PAN_SPEED / self.zoom;
        self.center = HOME_CENTER + ndc * reach;
    }

    /// Apply one wheel event. Positive `delta` scrolls away from the user and
    /// zooms in; negative zooms out; zero is ignored.
    pub fn wheel(&mut self, delta: f32) {
        let factor = if delta > 0.0 {
            ZOOM_IN_FACTOR
        } else if delta < 0.0 {
            ZOOM_OUT_FACTOR
        } else {
            return;
        };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn uniforms(&self, elapsed: f64, viewport: Viewport) -> FractalUniforms {
        FractalUniforms {
            center: self.center.to_array(),
            resolution: [viewport.width as f32, viewport.height as f32],
            zoom: self.zoom,
            time: elapsed as f32,
            _padding: [0.0; 2],
        }
    }
}
