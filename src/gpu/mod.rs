//! wgpu renderer for the particle field.
//!
//! One surface, two pipelines: instanced soft-disc quads for the
//! particles and a line list for the connection graph. Particle
//! positions and the used prefix of the connection buffer are uploaded
//! each frame; the buffers themselves are allocated once.

mod lines;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::GpuError;
use crate::field::ParticleField;
use lines::LineState;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render-extent pixel density cap: beyond 2x the extra pixels are
/// invisible and the fill cost is not.
const MAX_PIXEL_RATIO: f64 = 2.0;

/// Accent color shared by dots and lines (#007bff).
const ACCENT_COLOR: [f32; 3] = [0.0, 0.482, 1.0];
const LINE_ALPHA: f32 = 0.15;

/// Perspective camera with a pointer-driven drift rotation applied at
/// the scene level.
pub struct Camera {
    pub fov_y: f32,
    pub position: Vec3,
    /// Scene drift: x pitch, y yaw, radians.
    pub rotation: Vec2,
}

impl Camera {
    fn new() -> Self {
        Self {
            fov_y: 75.0_f32.to_radians(),
            position: Vec3::new(0.0, 0.0, 100.0),
            rotation: Vec2::ZERO,
        }
    }

    fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect, 0.1, 1000.0);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        let model = Mat4::from_rotation_x(self.rotation.x) * Mat4::from_rotation_y(self.rotation.y);
        proj * view * model
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    time: f32,
    delta_time: f32,
    _padding: [f32; 2],
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    position_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    num_particles: u32,
    lines: LineState,
    pub camera: Camera,
    scale_factor: f64,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, field: &ParticleField) -> Result<Self, GpuError> {
        let scale_factor = window.scale_factor();
        let size = render_extent(window.inner_size(), scale_factor);

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
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Position Buffer"),
            contents: bytemuck::cast_slice(field.positions()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let camera = Camera::new();
        let aspect = config.width as f32 / config.height as f32;
        let uniforms = Uniforms {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            time: 0.0,
            delta_time: 0.0,
            _padding: [0.0; 2],
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let lines = LineState::new(
            &device,
            &uniform_buffer,
            field.connections().capacity_floats(),
            ACCENT_COLOR,
            LINE_ALPHA,
            config.format,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            position_buffer,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            num_particles: field.particle_count() as u32,
            lines,
            camera,
            scale_factor,
        })
    }

    /// Reconfigure for a new window size (physical pixels).
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let size = render_extent(new_size, self.scale_factor);
        if size.width > 0 && size.height > 0 {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Record a monitor scale-factor change; takes effect on the next
    /// resize.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    fn update_uniforms(&mut self, time: f32, delta_time: f32) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms {
            view_proj: self.camera.view_proj(aspect).to_cols_array_2d(),
            time,
            delta_time,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Upload this frame's field state and draw it.
    pub fn render(
        &mut self,
        field: &mut ParticleField,
        time: f32,
        delta_time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        if field.take_positions_dirty() {
            self.queue
                .write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(field.positions()));
        }
        self.lines.upload(&self.queue, field.connections());
        self.camera.rotation = field.drift().rotation;
        self.update_uniforms(time, delta_time);

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
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Connection lines first, dots on top.
            if self.lines.vertex_count > 0 {
                render_pass.set_pipeline(&self.lines.render_pipeline);
                render_pass.set_bind_group(0, &self.lines.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.lines.buffer.slice(..));
                render_pass.draw(0..self.lines.vertex_count, 0..1);
            }

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            render_pass.draw(0..6, 0..self.num_particles);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Cap the render extent at [`MAX_PIXEL_RATIO`] device pixels per
/// logical pixel.
fn render_extent(size: PhysicalSize<u32>, scale_factor: f64) -> PhysicalSize<u32> {
    if scale_factor <= MAX_PIXEL_RATIO {
        return size;
    }
    let shrink = MAX_PIXEL_RATIO / scale_factor;
    PhysicalSize::new(
        (size.width as f64 * shrink).round() as u32,
        (size.height as f64 * shrink).round() as u32,
    )
}

const PARTICLE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

const PARTICLE_COLOR: vec3<f32> = vec3<f32>(0.0, 0.482, 1.0);
const PARTICLE_ALPHA: f32 = 0.8;
const PARTICLE_SIZE: f32 = 0.008;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];

    var clip_pos = uniforms.view_proj * vec4<f32>(particle_pos, 1.0);
    clip_pos.x += quad_pos.x * PARTICLE_SIZE * clip_pos.w;
    clip_pos.y += quad_pos.y * PARTICLE_SIZE * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = (1.0 - smoothstep(0.5, 1.0, dist)) * PARTICLE_ALPHA;
    return vec4<f32>(PARTICLE_COLOR, alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_shader_parses() {
        naga::front::wgsl::parse_str(PARTICLE_SHADER).expect("particle shader should parse");
    }

    #[test]
    fn line_shader_parses() {
        naga::front::wgsl::parse_str(lines::LINE_SHADER).expect("line shader should parse");
    }

    #[test]
    fn render_extent_caps_pixel_density() {
        // 1x and 2x displays render at native resolution.
        assert_eq!(
            render_extent(PhysicalSize::new(1280, 720), 1.0),
            PhysicalSize::new(1280, 720)
        );
        assert_eq!(
            render_extent(PhysicalSize::new(2560, 1440), 2.0),
            PhysicalSize::new(2560, 1440)
        );
        // A 3x display is capped back to 2x density.
        assert_eq!(
            render_extent(PhysicalSize::new(3840, 2160), 3.0),
            PhysicalSize::new(2560, 1440)
        );
    }
}
