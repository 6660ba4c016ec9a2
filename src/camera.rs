//! Camera paths for both colour modes.
//!
//! The camera stores no motion state of its own: its eye position is a pure
//! function of virtual time. Only the projection changes from outside, when
//! the viewport is resized.

use glam::{Mat4, Vec3};

use crate::config::{ColorMode, DeviceClass, Viewport};

/// How the eye moves over time. Always aimed at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraPath {
    /// Circle around the attractor with a slow vertical bob.
    Orbit {
        radius: f32,
        base_height: f32,
        height_variation: f32,
        /// Angular speed in radians per unit of virtual time.
        speed: f32,
    },
    /// Small Lissajous drift in front of the fractal plane.
    Drift {
        amplitude_x: f32,
        amplitude_y: f32,
        distance: f32,
        speed: f32,
    },
}

impl CameraPath {
    /// Path used for `mode` on a display of class `device`.
    pub fn for_mode(mode: ColorMode, device: DeviceClass) -> Self {
        let motion = device.motion_scale();
        match mode {
            ColorMode::Attractor => CameraPath::Orbit {
                radius: 52.0,
                base_height: 8.0,
                height_variation: 6.0,
                speed: 0.04 * motion,
            },
            ColorMode::Fractal => CameraPath::Drift {
                amplitude_x: 1.5,
                amplitude_y: 0.8,
                distance: 15.0,
                speed: 0.08 * motion,
            },
        }
    }

    /// Eye position at virtual time `elapsed`.
    pub fn eye(&self, elapsed: f64) -> Vec3 {
        match *self {
            CameraPath::Orbit {
                radius,
                base_height,
                height_variation,
                speed,
            } => {
                let angle = elapsed * speed as f64;
                Vec3::new(
                    radius * angle.cos() as f32,
                    base_height + (angle * 0.4).sin() as f32 * height_variation,
                    radius * angle.sin() as f32,
                )
            }
            CameraPath::Drift {
                amplitude_x,
                amplitude_y,
                distance,
                speed,
            } => {
                let angle = elapsed * speed as f64;
                Vec3::new(
                    angle.sin() as f32 * amplitude_x,
                    (angle * 0.75).cos() as f32 * amplitude_y,
                    distance,
                )
            }
        }
    }
}

/// Perspective camera following a [`CameraPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub path: CameraPath,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(path: CameraPath, viewport: Viewport) -> Self {
        Self {
            path,
            fov_y: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect: viewport.aspect(),
        }
    }

    /// Pick up a new viewport. Degenerate sizes keep the previous aspect.
    pub fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_empty() {
            self.aspect = viewport.aspect();
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculate the camera's world position.
    pub fn position(&self, elapsed: f64) -> Vec3 {
        self.path.eye(elapsed)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self, elapsed: f64) -> Mat4 {
        Mat4::look_at_rh(self.position(elapsed), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self, elapsed: f64) -> Mat4 {
        self.projection_matrix() * self.view_matrix(elapsed)
    }
}
