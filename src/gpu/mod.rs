//! wgpu display layer.
//!
//! [`DisplaySurface`] owns the surface, device and one set of GPU buffers per
//! trail and backdrop cloud of the attached [`EngineSession`]. Trail buffers
//! are uploaded in full when a session is attached; after that only the slot
//! each frame rewrote is copied over.

mod grid;
mod points;
mod shaders;

use std::sync::Arc;

use bytemuck::Zeroable;
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::GpuError;
use crate::fractal::FractalUniforms;
use crate::session::{EngineSession, Frame};
use crate::starfield::{CloudKind, PointCloud};
use crate::trail::TrailSystem;

use grid::GridPass;
use points::{PointBuffers, PointData, PointPipelines, PointStyle};
use shaders::{Globals, FRACTAL_SOURCE};

/// Fullscreen Mandelbrot pass.
struct FractalPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FractalPass {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fractal Uniform Buffer"),
            contents: bytemuck::bytes_of(&FractalUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fractal Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fractal Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fractal Shader"),
            source: wgpu::ShaderSource::Wgsl(FRACTAL_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fractal Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fractal Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mandelbrot"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

/// Window surface plus everything needed to draw one session.
pub struct DisplaySurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    points: PointPipelines,
    fractal: FractalPass,
    grid: GridPass,
    trails: Vec<PointBuffers>,
    backdrop: Vec<PointBuffers>,
    clear_color: wgpu::Color,
}

impl DisplaySurface {
    /// Set up the GPU for `window` and upload the buffers of `session`.
    pub async fn new(window: Arc<Window>, session: &EngineSession) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let points = PointPipelines::new(&device, &globals_layout, surface_format);
        let fractal = FractalPass::new(&device, surface_format);
        let grid = GridPass::new(&device, &globals_layout, surface_format);

        let mut display = Self {
            surface,
            device,
            queue,
            config,
            globals_buffer,
            globals_bind_group,
            points,
            fractal,
            grid,
            trails: Vec::new(),
            backdrop: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        };
        display.attach(session);
        Ok(display)
    }

    /// Replace all cloud buffers with those of `session`.
    pub fn attach(&mut self, session: &EngineSession) {
        self.trails = session
            .trails()
            .iter()
            .map(|trail| self.trail_buffers(trail))
            .collect();
        self.backdrop = session
            .backdrop()
            .iter()
            .map(|cloud| self.cloud_buffers(cloud))
            .collect();
        self.grid.set_lines(&self.device, session.grid());

        let [r, g, b] = session.mode().clear_color();
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };

        log::debug!(
            "attached {} trail and {} backdrop buffers",
            self.trails.len(),
            self.backdrop.len()
        );
    }

    /// Drop every cloud and grid buffer.
    pub fn detach(&mut self) {
        self.trails.clear();
        self.backdrop.clear();
        self.grid.set_lines(&self.device, None);
    }

    fn trail_buffers(&self, trail: &TrailSystem) -> PointBuffers {
        PointBuffers::new(
            &self.device,
            &self.points,
            &format!("Trail {}", trail.index()),
            PointData {
                positions: trail.positions(),
                colors: trail.colors(),
                alphas: trail.alphas(),
                sizes: trail.sizes(),
            },
            PointStyle::TRAIL,
        )
    }

    fn cloud_buffers(&self, cloud: &PointCloud) -> PointBuffers {
        let (label, style) = match cloud.kind() {
            CloudKind::Stars => ("Stars", PointStyle::STARS),
            CloudKind::Solar => ("Solar", PointStyle::SOLAR),
        };
        PointBuffers::new(
            &self.device,
            &self.points,
            label,
            PointData {
                positions: cloud.positions(),
                colors: cloud.colors(),
                alphas: cloud.alphas(),
                sizes: cloud.sizes(),
            },
            style,
        )
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn upload(&self, session: &EngineSession, frame: &Frame) {
        let viewport = session.viewport();
        let globals = Globals {
            view_proj: frame.view_proj.to_cols_array_2d(),
            viewport: [viewport.width as f32, viewport.height as f32],
            time: frame.elapsed as f32,
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        for (trail, buffers) in session.trails().iter().zip(&self.trails) {
            if let Some(slot) = trail.dirty_slot() {
                buffers.write_slot(
                    &self.queue,
                    slot,
                    &trail.positions()[slot],
                    &trail.colors()[slot],
                );
            }
            buffers.write_style(&self.queue, Mat4::IDENTITY, trail.shader_time(frame.elapsed));
        }

        for (cloud, buffers) in session.backdrop().iter().zip(&self.backdrop) {
            buffers.write_style(&self.queue, cloud.model_matrix(frame.frame), frame.elapsed as f32);
        }

        if let Some(view) = session.fractal() {
            let uniforms = view.uniforms(frame.elapsed, viewport);
            self.queue.write_buffer(
                &self.fractal.uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms),
            );
        }
    }

    /// Upload the state `frame` produced and draw it.
    pub fn render(&mut self, session: &EngineSession, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        self.upload(session, frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if session.fractal().is_some() {
                self.fractal.draw(&mut render_pass);
            }

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            self.grid.draw(&mut render_pass);
            for buffers in &self.backdrop {
                buffers.draw(&mut render_pass, &self.points);
            }
            for buffers in &self.trails {
                buffers.draw(&mut render_pass, &self.points);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
