#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Corner of the unit quad, doubles as the local coordinate the shader measures rings with
    pub position: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 2]) -> Self {
        Vertex { position }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // This attribute corresponds to `@location(0) position` in `VertexInput` in the shader file
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Unit quad every shape is stretched from
pub const QUAD: [Vertex; 4] = [
    Vertex::new([-1.0, -1.0]), // Bottom left
    Vertex::new([1.0, -1.0]),  // Bottom right
    Vertex::new([1.0, 1.0]),   // Top right
    Vertex::new([-1.0, 1.0]),  // Top left
];

/// Fan the quad into a triangle list
pub fn quad_indices() -> Vec<u16> {
    let num_triangles = QUAD.len() as u16 - 2;
    (1u16..=num_triangles)
        .flat_map(|i| [i + 1, i, 0])
        .collect()
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Normalized device coordinates
    pub center: [f32; 2],
    /// Half the width and height of the quad, also in NDC
    pub half_extent: [f32; 2],
    /// 0 draws the concentric target rings, 1 fills the whole quad
    pub kind: u32,
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
}

impl InstanceRaw {
    pub const KIND_TARGET: u32 = 0;
    pub const KIND_FILL: u32 = 1;

    // Must match `InstanceInput` in the shader file
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Uint32,
        4 => Float32x4,
        5 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per shape, not once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
