//! Input handling for the engine.
//!
//! [`Input`] accumulates raw window events between frames. At each rendered
//! frame the window hands the engine an [`InputSnapshot`], a plain value with
//! no reference back into the event loop, and then clears the per-frame state.
//!
//! ```ignore
//! if let Some(frame) = session.frame(Instant::now(), &input.snapshot()) {
//!     input.begin_frame();
//!     display.render(&session, &frame)?;
//! }
//! ```

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Input events gathered since the last rendered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Latest pointer position in normalized device coordinates, if the
    /// pointer moved since the last frame.
    pub pointer_ndc: Option<Vec2>,
    /// Wheel events in arrival order, in lines. Positive scrolls away from
    /// the user.
    pub wheel: Vec<f32>,
}

/// Input state tracking for keyboard, pointer and wheel.
#[derive(Debug, Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    keys_held: HashSet<KeyCode>,

    mouse_ndc: Vec2,
    pointer_moved: bool,

    wheel: Vec<f32>,

    // Window size for NDC calculation
    window_size: (u32, u32),
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Consume a press of `key`. Returns `true` once per physical press;
    /// holding the key down does not repeat.
    pub fn take_key_press(&mut self, key: KeyCode) -> bool {
        self.keys_pressed.remove(&key)
    }

    /// Events gathered since the last [`begin_frame`](Self::begin_frame).
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pointer_ndc: self.pointer_moved.then_some(self.mouse_ndc),
            wheel: self.wheel.clone(),
        }
    }

    /// Clear per-frame state. Call after a frame consumed a snapshot.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.pointer_moved = false;
        self.wheel.clear();
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Record a pointer position in window pixels.
    ///
    /// Origin of the stored NDC position is the window centre. X increases
    /// to the right, Y increases upward.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.mouse_ndc = Vec2::new(
                (x / w as f32) * 2.0 - 1.0,
                1.0 - (y / h as f32) * 2.0, // Y flipped
            );
        }
        self.pointer_moved = true;
    }

    /// Record one wheel event. Trackpad pixels are converted to lines.
    pub fn wheel_moved(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        self.wheel.push(lines);
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            // Only fire pressed event if not already held (no repeat)
                            if self.keys_held.insert(key) {
                                self.keys_pressed.insert(key);
                            }
                        }
                        ElementState::Released => {
                            self.keys_held.remove(&key);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseWheel { delta, .. } => self.wheel_moved(*delta),

            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }

            _ => {}
        }
    }
}
