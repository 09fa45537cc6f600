//! Host-side draw submission for GPU-counted geometry

use crate::math::Aabb;
use crate::render::pipeline::GrassMaterial;

/// Whether a draw contributes to shadow maps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadowCasting {
    #[default]
    Off,
    On,
}

/// One non-indexed, triangle-list indirect draw whose vertex count lives
/// in `args_buffer` and is never read by the CPU.
pub struct IndirectDraw<'a> {
    pub material: &'a GrassMaterial,
    /// Binds `_DrawTriangles` + material uniforms at group 1
    pub material_bind_group: &'a wgpu::BindGroup,
    pub args_buffer: &'a wgpu::Buffer,
    pub args_offset: u64,
    /// World-space culling bounds
    pub bounds: Aabb,
    pub shadow_casting: ShadowCasting,
    pub receive_shadows: bool,
    /// Render layer index (0..32) tested against the target's culling mask
    pub layer: u32,
}

/// Render submission path of the host engine.
///
/// Implementations decide visibility from `draw.bounds` and `draw.layer`
/// and, if visible, record the draw onto `encoder`.
pub trait DrawSubmitter {
    /// Returns `true` if the draw was recorded, `false` if it was culled.
    fn draw_procedural_indirect(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        draw: &IndirectDraw<'_>,
    ) -> bool;
}
