mod vertex;

pub use vertex::{quad_indices, InstanceRaw, Vertex, QUAD};

use cgmath::Vector2;
use wgpu::util::DeviceExt;

/// Linear RGBA colour, ready to hand to an sRGB surface
pub type Color = [f32; 4];

/// Converts an 8-bit sRGB colour to linear space.
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    fn channel(c: u8) -> f32 {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    [channel(r), channel(g), channel(b), 1.0]
}

pub fn background() -> Color {
    rgb(0, 25, 40)
}

pub fn target_primary() -> Color {
    rgb(255, 0, 0)
}

pub fn target_secondary() -> Color {
    rgb(255, 255, 255)
}

pub fn status_bar() -> Color {
    rgb(190, 190, 190)
}

/// Something to draw, in window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Target { center: Vector2<f32>, radius: f32 },
    Bar { origin: Vector2<f32>, size: Vector2<f32>, color: Color },
}

impl Shape {
    pub fn to_raw(&self, screen_width: u32, screen_height: u32) -> InstanceRaw {
        let width = screen_width.max(1) as f32;
        let height = screen_height.max(1) as f32;
        let to_ndc = |p: Vector2<f32>| [(p.x / width) * 2.0 - 1.0, -((p.y / height) * 2.0 - 1.0)];

        match *self {
            Shape::Target { center, radius } => InstanceRaw {
                center: to_ndc(center),
                half_extent: [radius / width * 2.0, radius / height * 2.0],
                kind: InstanceRaw::KIND_TARGET,
                primary: target_primary(),
                secondary: target_secondary(),
            },
            Shape::Bar {
                origin,
                size,
                color,
            } => InstanceRaw {
                center: to_ndc(origin + size / 2.0),
                half_extent: [size.x / width, size.y / height],
                kind: InstanceRaw::KIND_FILL,
                primary: color,
                secondary: color,
            },
        }
    }
}

/// Draws every shape of a frame as instances of one quad.
pub struct ShapePipeline {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    num_instances: u32,
}

impl ShapePipeline {
    const INITIAL_CAPACITY: usize = 64;

    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shape Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = quad_indices();
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            instance_buffer: Self::create_instance_buffer(device, Self::INITIAL_CAPACITY),
            instance_capacity: Self::INITIAL_CAPACITY,
            num_instances: 0,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads this frame's instances, growing the buffer if needed.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[InstanceRaw]) {
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            log::debug!("growing instance buffer to {}", self.instance_capacity);
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_capacity);
        }

        self.num_instances = instances.len() as u32;
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    pub fn draw<'pass>(&'pass self, render_pass: &mut wgpu::RenderPass<'pass>) {
        if self.num_instances == 0 {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..self.num_instances);
    }
}

/// Window icon: the same red and white rings the targets use.
pub fn target_icon(size: u32) -> anyhow::Result<winit::window::Icon> {
    let radius = size as f32 / 2.0;
    let image = image::RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let d = (dx * dx + dy * dy).sqrt() / radius;
        match d {
            d if d > 1.0 => image::Rgba([0, 0, 0, 0]),
            d if d > 0.8 || (d > 0.4 && d <= 0.6) => image::Rgba([255, 0, 0, 255]),
            _ => image::Rgba([255, 255, 255, 255]),
        }
    });

    let (width, height) = image.dimensions();
    Ok(winit::window::Icon::from_rgba(image.into_raw(), width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_map_to_linear_endpoints() {
        assert_eq!(rgb(0, 0, 0), [0.0, 0.0, 0.0, 1.0]);
        let white = rgb(255, 255, 255);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
        // Mid grey is darker in linear space
        assert!(rgb(128, 128, 128)[0] < 0.25);
    }

    #[test]
    fn target_centered_on_screen_maps_to_origin() {
        let raw = Shape::Target {
            center: Vector2::new(400.0, 300.0),
            radius: 30.0,
        }
        .to_raw(800, 600);

        assert_eq!(raw.center, [0.0, 0.0]);
        assert_eq!(raw.half_extent, [0.075, 0.1]);
        assert_eq!(raw.kind, InstanceRaw::KIND_TARGET);
    }

    #[test]
    fn screen_y_points_down_ndc_y_points_up() {
        let raw = Shape::Target {
            center: Vector2::new(0.0, 0.0),
            radius: 1.0,
        }
        .to_raw(800, 600);
        assert_eq!(raw.center, [-1.0, 1.0]);
    }

    #[test]
    fn top_bar_covers_top_strip() {
        let raw = Shape::Bar {
            origin: Vector2::new(0.0, 0.0),
            size: Vector2::new(800.0, 60.0),
            color: status_bar(),
        }
        .to_raw(800, 600);

        assert_eq!(raw.kind, InstanceRaw::KIND_FILL);
        assert_eq!(raw.center[0], 0.0);
        assert!((raw.center[1] - 0.9).abs() < 1e-6);
        assert_eq!(raw.half_extent, [1.0, 0.1]);
        // Top edge sits on the top of the screen
        assert!((raw.center[1] + raw.half_extent[1] - 1.0).abs() < 1e-6);
    }
}
