//! # Attractor Field
//!
//! Real-time Lorenz attractor trails on the GPU.
//!
//! Several independent trajectories of the Lorenz system are integrated with
//! fourth-order Runge-Kutta and recorded into fixed-capacity ring buffers. Each
//! rendered frame advances every trajectory by a few steps and overwrites
//! exactly one slot per trail, so the visible trails lengthen, fade and cycle
//! colour without any allocation after start-up.
//!
//! ## Quick Start
//!
//! ```ignore
//! use attractor_field::{EngineConfig, DeviceClass};
//!
//! fn main() -> Result<(), attractor_field::RunError> {
//!     attractor_field::run(
//!         EngineConfig::new().with_device_class(DeviceClass::Constrained),
//!     )
//! }
//! ```
//!
//! ## Headless use
//!
//! Everything except the [`run`] loop works without a window. An
//! [`EngineSession`] takes timestamps and input snapshots and exposes the
//! trail buffers as plain slices:
//!
//! ```ignore
//! let mut session = EngineSession::new(&EngineConfig::new(), Viewport::default())?;
//! if let Some(frame) = session.frame(Instant::now(), &InputSnapshot::default()) {
//!     for trail in session.trails() {
//!         let slot = trail.dirty_slot();
//!         // upload trail.position_floats()[slot * 3..slot * 3 + 3]
//!     }
//! }
//! ```
//!
//! ## Colour modes
//!
//! - [`ColorMode::Attractor`]: five trails orbit the attractor against a star
//!   shell and a faint floor grid, seen from a slowly circling camera.
//! - [`ColorMode::Fractal`]: a pannable, zoomable Mandelbrot backdrop with a
//!   solar particle shell. The pointer pans, the wheel zooms.

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod fractal;
mod gpu;
pub mod grid;
pub mod input;
pub mod lorenz;
pub mod session;
pub mod starfield;
pub mod time;
pub mod trail;
mod window;

pub use config::{ColorMode, DeviceClass, EngineConfig, Formation, TrailSeed, Viewport};
pub use error::{ConfigError, GpuError, RunError};
pub use glam::{DVec3, Vec2, Vec3};
pub use input::InputSnapshot;
pub use lorenz::{LorenzParams, Modulation};
pub use session::{EngineSession, Frame};
pub use trail::TrailSystem;

use winit::event_loop::{ControlFlow, EventLoop};

/// Open a window and run the engine until it is closed.
///
/// Blocks the calling thread. Returns once the window closes, or with the
/// error that stopped initialisation.
pub fn run(config: EngineConfig) -> Result<(), RunError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
