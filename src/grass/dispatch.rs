//! Dispatch sizing and the per-frame reset/dispatch/copy sequence.

use crate::grass::layout::{DrawIndirectArgs, DRAW_COUNTER_SIZE};
use crate::grass::marshal::GrassBindings;
use crate::grass::params::FrameUniforms;
use crate::render::buffer::GrassBuffers;
use crate::render::pipeline::GrassKernel;

/// Workgroup counts for one kernel dispatch. Y and Z are always 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchGrid {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Groups needed so every source triangle gets one invocation.
pub fn compute_dispatch_grid(num_source_triangles: u32, thread_group_size_x: u32) -> DispatchGrid {
    let group = thread_group_size_x.max(1);
    DispatchGrid {
        x: num_source_triangles.div_ceil(group),
        y: 1,
        z: 1,
    }
}

/// Zero the append counter and restore the args buffer to {0, 1, 0, 0}.
///
/// The args write goes through the queue and is applied at the start of the
/// next submission; the counter clear is recorded on `encoder`.
pub fn reset_frame_counters(
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    buffers: &GrassBuffers,
) {
    queue.write_buffer(buffers.args_buffer(), 0, bytemuck::bytes_of(&DrawIndirectArgs::RESET));
    encoder.clear_buffer(buffers.counter_buffer(), 0, None);
}

/// Encode one frame of blade generation.
///
/// Order on the queue: args reset and frame uniforms (queue writes land
/// before this submission's commands), counter clear, kernel dispatch,
/// counter copied into `vertex_count` of the args buffer. The indirect draw
/// must be encoded after this returns, on the same encoder or a later one.
pub fn per_frame_dispatch(
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    kernel: &GrassKernel,
    bindings: &GrassBindings,
    buffers: &GrassBuffers,
    grid: DispatchGrid,
    frame: &FrameUniforms,
) {
    reset_frame_counters(queue, encoder, buffers);
    queue.write_buffer(bindings.frame_buffer(), 0, bytemuck::bytes_of(frame));

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("grass_blades_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(kernel.pipeline());
        pass.set_bind_group(0, bindings.bind_group(), &[]);
        pass.dispatch_workgroups(grid.x, grid.y, grid.z);
    }

    encoder.copy_buffer_to_buffer(
        buffers.counter_buffer(),
        0,
        buffers.args_buffer(),
        0,
        DRAW_COUNTER_SIZE,
    );

    log::trace!("grass dispatch: {}x{}x{} groups", grid.x, grid.y, grid.z);
}
