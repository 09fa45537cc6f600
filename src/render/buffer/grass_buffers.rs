//! GPU buffer set for one grass field: source mesh, draw output, indirect args.

use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::grass::layout::{
    BufferLayout, DrawIndirectArgs, DrawTriangle, DRAW_COUNTER_SIZE, DRAW_STRIDE, INDIRECT_ARGS_STRIDE,
};
use crate::grass::mesh::SourceMesh;
use crate::render::buffer::readback::read_buffer;

/// The four grass buffers plus the draw buffer's append counter.
///
/// Owned exclusively by one renderer. [`GrassBuffers::release`] consumes the
/// set, so a released set can neither be read nor released again.
pub struct GrassBuffers {
    source_vertices: wgpu::Buffer,
    source_triangles: wgpu::Buffer,
    draw_triangles: wgpu::Buffer,
    draw_counter: wgpu::Buffer,
    args: wgpu::Buffer,
    layout: BufferLayout,
}

impl GrassBuffers {
    /// Allocate every buffer and upload the immutable source mesh once.
    pub fn allocate(device: &wgpu::Device, mesh: &SourceMesh, layout: BufferLayout) -> Self {
        let source_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_source_vertices"),
            contents: bytemuck::cast_slice(&mesh.source_vertices()),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let source_triangles = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_source_triangles"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let draw_triangles = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_draw_triangles"),
            size: layout.draw_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let draw_counter = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_draw_counter"),
            contents: bytemuck::bytes_of(&0u32),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });

        let args = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_indirect_args"),
            contents: bytemuck::bytes_of(&DrawIndirectArgs::RESET),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });

        log::info!(
            "Allocated grass buffers: {} source tris, {} draw slots ({} KB total)",
            layout.num_source_triangles,
            layout.draw_capacity,
            layout.total_bytes() / 1024
        );

        Self {
            source_vertices,
            source_triangles,
            draw_triangles,
            draw_counter,
            args,
            layout,
        }
    }

    /// Free the GPU memory now rather than when the last reference drops.
    pub fn release(self) {
        self.source_vertices.destroy();
        self.source_triangles.destroy();
        self.draw_triangles.destroy();
        self.draw_counter.destroy();
        self.args.destroy();
        log::info!("Released grass buffers ({} KB)", self.layout.total_bytes() / 1024);
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// `_SourceVertices`
    pub fn source_vertex_buffer(&self) -> &wgpu::Buffer {
        &self.source_vertices
    }

    /// `_SourceTriangles`
    pub fn source_triangle_buffer(&self) -> &wgpu::Buffer {
        &self.source_triangles
    }

    /// `_DrawTriangles`
    pub fn draw_buffer(&self) -> &wgpu::Buffer {
        &self.draw_triangles
    }

    /// Live element counter of the draw buffer, in vertices
    pub fn counter_buffer(&self) -> &wgpu::Buffer {
        &self.draw_counter
    }

    /// `_IndirectArgsBuffer`
    pub fn args_buffer(&self) -> &wgpu::Buffer {
        &self.args
    }

    /// Read the indirect args back (blocks on the GPU)
    pub fn read_args(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<DrawIndirectArgs, Error> {
        let bytes = read_buffer(device, queue, &self.args, INDIRECT_ARGS_STRIDE)?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Read the append counter back (blocks on the GPU)
    pub fn read_counter(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<u32, Error> {
        let bytes = read_buffer(device, queue, &self.draw_counter, DRAW_COUNTER_SIZE)?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Read the first `count` generated triangles back (blocks on the GPU)
    pub fn read_triangles(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        count: u32,
    ) -> Result<Vec<DrawTriangle>, Error> {
        let count = count.min(self.layout.draw_capacity);
        if count == 0 {
            return Ok(Vec::new());
        }
        let bytes = read_buffer(device, queue, &self.draw_triangles, count as u64 * DRAW_STRIDE)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }
}
