//! Parameter marshaling: uniforms, wind texture and buffer bindings for
//! the kernel and the material, issued once per initialization.

use wgpu::util::DeviceExt;

use crate::grass::params::{FrameUniforms, GrassParams};
use crate::grass::wind::WindNoise;
use crate::render::buffer::GrassBuffers;
use crate::render::pipeline::grass_kernel::slot;
use crate::render::pipeline::{GrassKernel, GrassMaterial};

/// Everything bound to the kernel and material for one buffer set.
///
/// Only the frame uniform's contents change per frame; none of the
/// bindings are re-issued until the next initialization.
pub struct GrassBindings {
    params: GrassParams,
    params_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    _wind_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    material_bind_group: wgpu::BindGroup,
}

impl GrassBindings {
    /// Upload `params` and `wind`, then bind the buffer set on both the
    /// kernel (all four buffers + counter) and the material (draw buffer).
    pub fn bind(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        kernel: &GrassKernel,
        material: &GrassMaterial,
        buffers: &GrassBuffers,
        params: GrassParams,
        wind: &WindNoise,
    ) -> Self {
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_material_uniforms"),
            contents: bytemuck::bytes_of(material.uniforms()),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let wind_texture = wind.create_texture(device, queue);
        let wind_view = wind_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let wind_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("grass_wind_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_blades_bind_group"),
            layout: kernel.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: slot::SOURCE_VERTICES,
                    resource: buffers.source_vertex_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::SOURCE_TRIANGLES,
                    resource: buffers.source_triangle_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::DRAW_TRIANGLES,
                    resource: buffers.draw_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::INDIRECT_ARGS,
                    resource: buffers.args_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::DRAW_COUNTER,
                    resource: buffers.counter_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::PARAMS,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::FRAME,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slot::WIND_NOISE_TEXTURE,
                    resource: wgpu::BindingResource::TextureView(&wind_view),
                },
                wgpu::BindGroupEntry {
                    binding: slot::WIND_SAMPLER,
                    resource: wgpu::BindingResource::Sampler(&wind_sampler),
                },
            ],
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_material_bind_group"),
            layout: material.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.draw_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
        });

        log::debug!(
            "Bound grass kernel: {} source tris, {} segments, capacity {}",
            params.num_source_triangles,
            params.max_blade_segments,
            params.draw_capacity
        );

        Self {
            params,
            params_buffer,
            frame_buffer,
            material_buffer,
            _wind_texture: wind_texture,
            bind_group,
            material_bind_group,
        }
    }

    /// The static uniforms that were uploaded
    pub fn params(&self) -> &GrassParams {
        &self.params
    }

    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_buffer
    }

    /// Per-frame `_Time` / `_LocalToWorld` uniform
    pub fn frame_buffer(&self) -> &wgpu::Buffer {
        &self.frame_buffer
    }

    pub fn material_buffer(&self) -> &wgpu::Buffer {
        &self.material_buffer
    }

    /// Kernel bind group (group 0)
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Material bind group (group 1 of the draw pipeline)
    pub fn material_bind_group(&self) -> &wgpu::BindGroup {
        &self.material_bind_group
    }
}
