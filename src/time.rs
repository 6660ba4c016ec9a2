//! Frame pacing and virtual time.
//!
//! The [`FrameClock`] is fed wall-clock timestamps at every redraw
//! opportunity and decides whether a frame should actually run. A tick that
//! arrives sooner than one target interval after the last rendered frame is
//! skipped outright: nothing advances and nothing is drawn.
//!
//! Virtual time does not follow the wall clock. Every rendered frame adds a
//! fixed step, so a throttled or stalled display simply animates slower
//! rather than jumping. It is derived from the frame count in `f64` so the
//! step never rounds away on long runs; consumers narrow it to `f32` only at
//! the GPU boundary.
//!
//! # Example
//!
//! ```ignore
//! use std::time::{Duration, Instant};
//! use attractor_field::time::FrameClock;
//!
//! let mut clock = FrameClock::new(60, 0.008);
//!
//! // In your redraw handler:
//! if let Some(tick) = clock.tick(Instant::now()) {
//!     println!("frame {} at t = {:.3}", tick.frame, tick.elapsed);
//! }
//! ```

use std::time::{Duration, Instant};

/// A frame the clock decided to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Virtual time after this frame's step.
    pub elapsed: f64,
    /// Frame number, starting at 1.
    pub frame: u64,
}

/// Throttled frame clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Minimum wall-clock gap between rendered frames.
    target_interval: Duration,
    /// Virtual time added per rendered frame.
    time_step: f32,
    /// When the last frame was rendered.
    last_frame: Option<Instant>,
    /// Total frames rendered.
    frame_count: u64,
    /// Ticks rejected by the throttle.
    skipped: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Option<Instant>,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock rendering at most `target_fps` frames per second.
    pub fn new(target_fps: u32, time_step: f32) -> Self {
        Self {
            target_interval: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            time_step,
            last_frame: None,
            frame_count: 0,
            skipped: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: None,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Offer a redraw opportunity at `now`.
    ///
    /// Returns `None` when the throttle skips this tick. The first tick
    /// after creation always runs.
    pub fn tick(&mut self, now: Instant) -> Option<FrameTick> {
        if let Some(last) = self.last_frame {
            if now.saturating_duration_since(last) < self.target_interval {
                self.skipped += 1;
                return None;
            }
        }

        self.last_frame = Some(now);
        self.frame_count += 1;

        // Update FPS periodically
        match self.fps_update_time {
            Some(since) => {
                let fps_elapsed = now.saturating_duration_since(since);
                if fps_elapsed >= self.fps_update_interval {
                    let frames_since = self.frame_count - self.fps_frame_count;
                    self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
                    self.fps_frame_count = self.frame_count;
                    self.fps_update_time = Some(now);
                }
            }
            None => {
                self.fps_frame_count = self.frame_count;
                self.fps_update_time = Some(now);
            }
        }

        Some(FrameTick {
            elapsed: self.elapsed(),
            frame: self.frame_count,
        })
    }

    /// Earliest instant at which the next tick can render.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.last_frame.map(|last| last + self.target_interval)
    }

    /// Accumulated virtual time.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.frame_count as f64 * self.time_step as f64
    }

    /// Total frames rendered.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Ticks rejected by the throttle.
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Measured rendered frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    #[inline]
    pub fn time_step(&self) -> f32 {
        self.time_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_renders() {
        let mut clock = FrameClock::new(60, 0.008);
        let tick = clock.tick(Instant::now()).unwrap();
        assert_eq!(tick.frame, 1);
        assert!((tick.elapsed - 0.008).abs() < 1e-7);
    }

    #[test]
    fn test_early_tick_is_skipped() {
        let start = Instant::now();
        let mut clock = FrameClock::new(30, 0.004);
        clock.tick(start).unwrap();

        assert!(clock.tick(start + Duration::from_millis(10)).is_none());
        assert!(clock.tick(start + Duration::from_millis(33)).is_none());
        assert_eq!(clock.skipped(), 2);
        assert_eq!(clock.frame(), 1);
        assert!((clock.elapsed() - 0.004).abs() < 1e-7);

        let tick = clock.tick(start + Duration::from_millis(34)).unwrap();
        assert_eq!(tick.frame, 2);
        assert!((tick.elapsed - 0.008).abs() < 1e-7);
    }

    #[test]
    fn test_throttle_bounds_frames_per_window() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, 0.008);
        let window = Duration::from_secs(2);

        // 240 Hz display
        let mut rendered = 0u64;
        let mut t = Duration::ZERO;
        while t <= window {
            if clock.tick(start + t).is_some() {
                rendered += 1;
            }
            t += Duration::from_micros(4_167);
        }

        let bound = (window.as_secs_f64() * 60.0) as u64 + 1;
        assert!(rendered <= bound, "{rendered} > {bound}");
        assert!(rendered >= 40);
    }

    #[test]
    fn test_next_deadline() {
        let start = Instant::now();
        let mut clock = FrameClock::new(50, 0.008);
        assert!(clock.next_deadline().is_none());
        clock.tick(start);
        assert_eq!(clock.next_deadline(), Some(start + Duration::from_millis(20)));
    }

    #[test]
    fn test_fps_measurement() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, 0.008);
        for i in 0..=60u64 {
            clock.tick(start + Duration::from_millis(i * 20));
        }
        assert!((clock.fps() - 50.0).abs() < 1.0, "fps = {}", clock.fps());
    }

    #[test]
    fn test_elapsed_keeps_advancing_on_long_runs() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, 0.008);
        // Past the point where an f32 accumulator stops moving.
        clock.frame_count = 40_000_000;
        clock.last_frame = Some(start);

        let before = clock.elapsed();
        let tick = clock.tick(start + Duration::from_millis(17)).unwrap();
        let step = tick.elapsed - before;
        assert!((step - 0.008).abs() < 1e-6, "step = {step}");
        assert!(tick.elapsed > 320_000.0);
    }
}
