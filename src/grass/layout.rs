//! GPU record layouts and the derived buffer plan.
//!
//! Every struct here is read or written by `shaders/grass_blades.wgsl` and
//! `shaders/grass_draw.wgsl`; strides must match those files exactly.

use bytemuck::{Pod, Zeroable};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::config::GrassSettings;
use crate::grass::dispatch::{self, DispatchGrid};
use crate::grass::mesh::{SourceMesh, SourceVertex};

/// Bytes per source vertex record (3 x f32)
pub const SOURCE_VERT_STRIDE: u64 = std::mem::size_of::<SourceVertex>() as u64;
/// Bytes per source triangle index (u32)
pub const SOURCE_TRI_STRIDE: u64 = std::mem::size_of::<u32>() as u64;
/// Bytes per generated triangle record
pub const DRAW_STRIDE: u64 = std::mem::size_of::<DrawTriangle>() as u64;
/// Bytes per indirect args record (4 x u32)
pub const INDIRECT_ARGS_STRIDE: u64 = std::mem::size_of::<DrawIndirectArgs>() as u64;
/// Bytes of the draw buffer's live append counter
pub const DRAW_COUNTER_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Vertices per generated triangle; the append counter advances by this much
pub const VERTICES_PER_TRIANGLE: u32 = 3;

/// One vertex of a generated blade triangle (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVertex {
    /// World-space position
    pub position: [f32; 3],
    /// 0 at the blade root, 1 at the tip
    pub height: f32,
}

/// One generated triangle: shared face normal plus three vertices (60 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DrawTriangle {
    pub normal: [f32; 3],
    pub vertices: [DrawVertex; 3],
}

/// Arguments for `wgpu::RenderPass::draw_indirect` (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndirectArgs {
    /// Overwritten on the GPU from the append counter each frame
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl DrawIndirectArgs {
    /// Value the args buffer is reset to before every dispatch
    pub const RESET: Self = Self {
        vertex_count: 0,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
    };
}

impl Default for DrawIndirectArgs {
    fn default() -> Self {
        Self::RESET
    }
}

// Compile-time layout validation.
const _: [(); 12] = [(); std::mem::size_of::<SourceVertex>()];
const _: [(); 60] = [(); std::mem::size_of::<DrawTriangle>()];
const _: [(); 16] = [(); std::mem::size_of::<DrawIndirectArgs>()];

/// Most triangles one blade can emit: two per lower segment plus the tip.
pub fn max_blade_triangles(max_segments: i32) -> u32 {
    let segments = max_segments.max(1) as u32;
    (segments - 1) * 2 + 1
}

/// Every count and size derived from one mesh + settings pair.
///
/// Pure data: computing it twice from the same inputs gives equal plans,
/// which is what keeps reinitialization from growing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLayout {
    pub vertex_count: u32,
    pub index_count: u32,
    pub num_source_triangles: u32,
    pub max_blade_segments: u32,
    pub max_blade_triangles: u32,
    /// Draw buffer capacity in triangle records
    pub draw_capacity: u32,
    pub dispatch: DispatchGrid,
}

impl BufferLayout {
    /// Fails when the worst-case draw count does not fit the `u32` vertex
    /// count of an indirect draw.
    pub fn new(mesh: &SourceMesh, settings: &GrassSettings, thread_group_size_x: u32) -> Result<Self> {
        let num_source_triangles = mesh.triangle_count() as u32;
        let max_blade_triangles = max_blade_triangles(settings.max_segments);

        let draw_capacity = num_source_triangles
            .checked_mul(max_blade_triangles)
            .filter(|cap| cap.checked_mul(VERTICES_PER_TRIANGLE).is_some())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} source triangles x {} blade triangles exceeds the indirect vertex count range",
                    num_source_triangles, max_blade_triangles
                ))
            })?;

        Ok(Self {
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.indices().len() as u32,
            num_source_triangles,
            max_blade_segments: settings.max_blade_segments(),
            max_blade_triangles,
            draw_capacity,
            dispatch: dispatch::compute_dispatch_grid(num_source_triangles, thread_group_size_x),
        })
    }

    /// Reject plans whose buffers the device cannot allocate or bind.
    pub fn check_limits(&self, limits: &wgpu::Limits) -> Result<()> {
        let max_buffer = limits.max_buffer_size;
        let max_binding = u64::from(limits.max_storage_buffer_binding_size);

        for (name, bytes) in [
            ("source vertex", self.source_vertex_bytes()),
            ("source triangle", self.source_triangle_bytes()),
            ("draw", self.draw_bytes()),
        ] {
            if bytes > max_buffer || bytes > max_binding {
                return Err(Error::Config(format!(
                    "grass {} buffer needs {} bytes, device allows {} (binding {})",
                    name, bytes, max_buffer, max_binding
                )));
            }
        }
        Ok(())
    }

    pub fn source_vertex_bytes(&self) -> u64 {
        self.vertex_count as u64 * SOURCE_VERT_STRIDE
    }

    pub fn source_triangle_bytes(&self) -> u64 {
        self.index_count as u64 * SOURCE_TRI_STRIDE
    }

    pub fn draw_bytes(&self) -> u64 {
        self.draw_capacity as u64 * DRAW_STRIDE
    }

    /// Largest vertex count the indirect draw can ever be asked for
    pub fn max_draw_vertices(&self) -> u32 {
        self.draw_capacity * VERTICES_PER_TRIANGLE
    }

    /// Total bytes across all four buffers plus the counter
    pub fn total_bytes(&self) -> u64 {
        self.source_vertex_bytes()
            + self.source_triangle_bytes()
            + self.draw_bytes()
            + INDIRECT_ARGS_STRIDE
            + DRAW_COUNTER_SIZE
    }
}
