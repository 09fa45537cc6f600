//! Offscreen colour target that executes grass draws

use wgpu::util::DeviceExt;

use crate::core::camera::Camera;
use crate::core::types::Vec3;
use crate::render::pipeline::{view_bind_group_layout, ViewUniforms};
use crate::render::submit::{DrawSubmitter, IndirectDraw};

/// Colour format of [`OffscreenTarget`]
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Draw target backed by a texture instead of a surface.
///
/// Culls by the draw's world bounds against the camera frustum and by
/// layer against `culling_mask`.
pub struct OffscreenTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    view_buffer: wgpu::Buffer,
    view_layout: wgpu::BindGroupLayout,
    view_bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    pub camera: Camera,
    pub light_dir: Vec3,
    /// Bit `n` set = layer `n` is drawn
    pub culling_mask: u32,
    draws_recorded: u64,
    draws_culled: u64,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, mut camera: Camera) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        camera.set_aspect(width as f32, height as f32);

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("grass_offscreen_color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let light_dir = Vec3::new(-0.4, -1.0, -0.3).normalize();
        let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass_view_uniforms"),
            contents: bytemuck::bytes_of(&view_uniforms(&camera, light_dir)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let view_layout = view_bind_group_layout(device);
        let view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_view_bind_group"),
            layout: &view_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });

        Self {
            color,
            color_view,
            view_buffer,
            view_layout,
            view_bind_group,
            width,
            height,
            camera,
            light_dir,
            culling_mask: u32::MAX,
            draws_recorded: 0,
            draws_culled: 0,
        }
    }

    /// Push camera/light changes to the GPU and clear the colour target
    pub fn begin_frame(&self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) {
        queue.write_buffer(
            &self.view_buffer,
            0,
            bytemuck::bytes_of(&view_uniforms(&self.camera, self.light_dir)),
        );

        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass_offscreen_clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.5, g: 0.7, b: 0.9, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    /// Layout the grass material must be built against
    pub fn view_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.view_layout
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        OFFSCREEN_FORMAT
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.color
    }

    pub fn draws_recorded(&self) -> u64 {
        self.draws_recorded
    }

    pub fn draws_culled(&self) -> u64 {
        self.draws_culled
    }

    fn layer_visible(&self, layer: u32) -> bool {
        layer < 32 && self.culling_mask & (1 << layer) != 0
    }
}

fn view_uniforms(camera: &Camera, light_dir: Vec3) -> ViewUniforms {
    ViewUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        light_dir: light_dir.extend(0.0).to_array(),
    }
}

impl DrawSubmitter for OffscreenTarget {
    fn draw_procedural_indirect(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        draw: &IndirectDraw<'_>,
    ) -> bool {
        if !self.layer_visible(draw.layer) || !self.camera.frustum().intersects_aabb(&draw.bounds) {
            self.draws_culled += 1;
            return false;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass_draw_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(draw.material.pipeline());
        pass.set_bind_group(0, &self.view_bind_group, &[]);
        pass.set_bind_group(1, draw.material_bind_group, &[]);
        pass.draw_indirect(draw.args_buffer, draw.args_offset);

        self.draws_recorded += 1;
        true
    }
}
