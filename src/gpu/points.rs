//! Point sprite pipelines and per-cloud GPU buffers.

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::shaders::{StyleUniforms, POINTS_SOURCE};

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const ALPHA_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];
const SIZE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32];

const VEC3_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
const SCALAR_STRIDE: wgpu::BufferAddress = std::mem::size_of::<f32>() as wgpu::BufferAddress;

/// How a cloud is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub pulse_amount: f32,
    pub pulse_rate: f32,
    pub pulse_spread: f32,
    /// Pixel size of a unit-size point at unit depth.
    pub size_scale: f32,
    pub alpha_scale: f32,
    /// Additive soft glow instead of an alpha-blended disc.
    pub glow: bool,
}

impl PointStyle {
    pub const TRAIL: Self = Self {
        pulse_amount: 0.15,
        pulse_rate: 1.5,
        pulse_spread: 0.05,
        size_scale: 180.0,
        alpha_scale: 0.5,
        glow: true,
    };

    pub const STARS: Self = Self {
        pulse_amount: 0.3,
        pulse_rate: 2.5,
        pulse_spread: 0.008,
        size_scale: 120.0,
        alpha_scale: 1.0,
        glow: false,
    };

    pub const SOLAR: Self = Self {
        pulse_amount: 0.0,
        pulse_rate: 0.0,
        pulse_spread: 0.0,
        size_scale: 120.0,
        alpha_scale: 1.0,
        glow: false,
    };

    fn uniforms(&self, model: Mat4, time: f32) -> StyleUniforms {
        StyleUniforms {
            model: model.to_cols_array_2d(),
            time,
            pulse_amount: self.pulse_amount,
            pulse_rate: self.pulse_rate,
            pulse_spread: self.pulse_spread,
            size_scale: self.size_scale,
            alpha_scale: self.alpha_scale,
            _padding: [0.0; 2],
        }
    }
}

/// The two point pipelines and the layout of their per-cloud bind group.
pub struct PointPipelines {
    style_layout: wgpu::BindGroupLayout,
    glow: wgpu::RenderPipeline,
    disc: wgpu::RenderPipeline,
}

impl PointPipelines {
    pub fn new(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let style_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Style Bind Group Layout"),
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

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SOURCE.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[globals_layout, &style_layout],
            push_constant_ranges: &[],
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Zero,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let glow = create_pipeline(device, &layout, &shader, "fs_glow", additive, format);
        let disc = create_pipeline(
            device,
            &layout,
            &shader,
            "fs_disc",
            wgpu::BlendState::ALPHA_BLENDING,
            format,
        );

        Self {
            style_layout,
            glow,
            disc,
        }
    }
}

fn vertex_layout(
    stride: wgpu::BufferAddress,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: stride,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    blend: wgpu::BlendState,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let buffers = [
        vertex_layout(VEC3_STRIDE, &POSITION_ATTRS),
        vertex_layout(VEC3_STRIDE, &COLOR_ATTRS),
        vertex_layout(SCALAR_STRIDE, &ALPHA_ATTRS),
        vertex_layout(SCALAR_STRIDE, &SIZE_ATTRS),
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // Points blend in draw order and never occlude each other.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Per-point attributes of one cloud, borrowed from the engine side.
pub struct PointData<'a> {
    pub positions: &'a [[f32; 3]],
    pub colors: &'a [[f32; 3]],
    pub alphas: &'a [f32],
    pub sizes: &'a [f32],
}

/// GPU copy of one trail or backdrop cloud.
pub struct PointBuffers {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    alphas: wgpu::Buffer,
    sizes: wgpu::Buffer,
    style_buffer: wgpu::Buffer,
    style_bind_group: wgpu::BindGroup,
    style: PointStyle,
    count: u32,
}

impl PointBuffers {
    pub fn new(
        device: &wgpu::Device,
        pipelines: &PointPipelines,
        label: &str,
        data: PointData<'_>,
        style: PointStyle,
    ) -> Self {
        let vertex_buffer = |name: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {name} Buffer")),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        };

        let positions = vertex_buffer("Position", bytemuck::cast_slice(data.positions));
        let colors = vertex_buffer("Color", bytemuck::cast_slice(data.colors));
        let alphas = vertex_buffer("Alpha", bytemuck::cast_slice(data.alphas));
        let sizes = vertex_buffer("Size", bytemuck::cast_slice(data.sizes));

        let style_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Style Buffer")),
            contents: bytemuck::bytes_of(&style.uniforms(Mat4::IDENTITY, 0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let style_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Style Bind Group")),
            layout: &pipelines.style_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: style_buffer.as_entire_binding(),
            }],
        });

        Self {
            positions,
            colors,
            alphas,
            sizes,
            style_buffer,
            style_bind_group,
            style,
            count: data.positions.len() as u32,
        }
    }

    /// Upload one rewritten slot of position and colour.
    pub fn write_slot(&self, queue: &wgpu::Queue, slot: usize, position: &[f32; 3], color: &[f32; 3]) {
        let offset = slot as wgpu::BufferAddress * VEC3_STRIDE;
        queue.write_buffer(&self.positions, offset, bytemuck::bytes_of(position));
        queue.write_buffer(&self.colors, offset, bytemuck::bytes_of(color));
    }

    pub fn write_style(&self, queue: &wgpu::Queue, model: Mat4, time: f32) {
        queue.write_buffer(
            &self.style_buffer,
            0,
            bytemuck::bytes_of(&self.style.uniforms(model, time)),
        );
    }

    /// Record the draw. Group 0 (globals) must already be bound.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipelines: &PointPipelines) {
        if self.count == 0 {
            return;
        }
        let pipeline = if self.style.glow {
            &pipelines.glow
        } else {
            &pipelines.disc
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(1, &self.style_bind_group, &[]);
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.colors.slice(..));
        pass.set_vertex_buffer(2, self.alphas.slice(..));
        pass.set_vertex_buffer(3, self.sizes.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}
