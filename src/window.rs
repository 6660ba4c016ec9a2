//! Windowed runner: winit event loop driving one [`EngineSession`].

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::KeyCode,
    window::{Window, WindowId},
};

use crate::config::{EngineConfig, Viewport};
use crate::error::RunError;
use crate::gpu::DisplaySurface;
use crate::input::Input;
use crate::session::EngineSession;

const WINDOW_TITLE: &str = "Attractor Field";

/// Rendered frames between frame-rate log lines.
const STATS_LOG_FRAMES: u64 = 600;

pub struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    session: Option<EngineSession>,
    display: Option<DisplaySurface>,
    input: Input,
    error: Option<RunError>,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            window: None,
            session: None,
            display: None,
            input: Input::new(),
            error: None,
        }
    }

    /// The error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<RunError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        self.error = Some(error);
        self.teardown();
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let viewport = Viewport::default();
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(viewport.width, viewport.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let session = EngineSession::new(&self.config, viewport_of(size))?;
        let display = pollster::block_on(DisplaySurface::new(window.clone(), &session))?;

        self.window = Some(window);
        self.session = Some(session);
        self.display = Some(display);
        Ok(())
    }

    /// Stop the session and release GPU buffers. Safe to call repeatedly.
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if let Some(display) = self.display.as_mut() {
            display.detach();
        }
        self.display = None;
    }

    fn toggle_mode(&mut self) -> Result<(), RunError> {
        let Some(old) = self.session.as_mut() else {
            return Ok(());
        };
        let viewport = old.viewport();
        old.stop();

        self.config.color_mode = self.config.color_mode.toggled();
        let session = EngineSession::new(&self.config, viewport)?;
        if let Some(display) = self.display.as_mut() {
            display.attach(&session);
        }
        self.session = Some(session);
        log::info!("switched to {:?} mode", self.config.color_mode);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(session), Some(display)) = (self.session.as_mut(), self.display.as_mut()) else {
            return;
        };

        let Some(frame) = session.frame(Instant::now(), &self.input.snapshot()) else {
            return;
        };
        self.input.begin_frame();

        if frame.frame % STATS_LOG_FRAMES == 0 {
            let clock = session.clock();
            log::debug!(
                "frame {}: {:.1} fps, {} ticks throttled",
                frame.frame,
                clock.fps(),
                clock.skipped()
            );
        }

        match display.render(session, &frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = display.size();
                display.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, shutting down");
                self.teardown();
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Viewport {
    Viewport::new(size.width, size.height)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { .. } => {
                if self.input.take_key_press(KeyCode::Escape) {
                    self.teardown();
                    event_loop.exit();
                } else if self.input.take_key_press(KeyCode::KeyT) {
                    if let Err(e) = self.toggle_mode() {
                        self.fail(event_loop, e);
                    }
                }
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(session) = self.session.as_mut() {
                    session.resize(viewport_of(physical_size));
                }
                if let Some(display) = self.display.as_mut() {
                    display.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match session.clock().next_deadline() {
            Some(deadline) if deadline > Instant::now() => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                event_loop.set_control_flow(ControlFlow::Poll);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: winit::event::StartCause) {
        if let winit::event::StartCause::ResumeTimeReached { .. } = cause {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
        self.window = None;
    }
}
