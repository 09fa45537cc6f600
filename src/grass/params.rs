//! Uniform blocks for the blade kernel.
//!
//! `GrassParams` is written once per initialization, `FrameUniforms` every
//! frame. Must match `GrassParams` / `FrameUniforms` in grass_blades.wgsl.

use bytemuck::{Pod, Zeroable};

use crate::core::types::Mat4;
use crate::grass::config::GrassSettings;
use crate::grass::layout::BufferLayout;

/// Static kernel uniforms (64 bytes, 16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GrassParams {
    /// `_NumSourceTriangles`
    pub num_source_triangles: u32,
    /// `_MaxBladeSegments`, already clamped to >= 1
    pub max_blade_segments: u32,
    /// `_MaxBendAngle`
    pub max_bend_angle: f32,
    /// `_BladeCurvature`
    pub blade_curvature: f32,
    // -- 16 bytes --
    pub blade_height: f32,
    pub blade_height_variance: f32,
    pub blade_width: f32,
    pub blade_width_variance: f32,
    // -- 16 bytes --
    /// `_WindTexMult`
    pub wind_tex_mult: f32,
    /// `_WindTimeMult`
    pub wind_time_mult: f32,
    /// `_WindPosMult`
    pub wind_pos_mult: f32,
    pub wind_amplitude: f32,
    // -- 16 bytes --
    pub wind_direction_angle: f32,
    /// Draw buffer capacity in triangles; appends past this are dropped
    pub draw_capacity: u32,
    pub _pad: [u32; 2],
    // -- 16 bytes --
    // Total: 64 bytes
}

impl GrassParams {
    /// Pack settings and derived counts into the kernel's uniform block
    pub fn new(settings: &GrassSettings, layout: &BufferLayout) -> Self {
        Self {
            num_source_triangles: layout.num_source_triangles,
            max_blade_segments: layout.max_blade_segments,
            max_bend_angle: settings.max_bend_angle,
            blade_curvature: settings.blade_curvature,
            blade_height: settings.blade_height,
            blade_height_variance: settings.blade_height_variance,
            blade_width: settings.blade_width,
            blade_width_variance: settings.blade_width_variance,
            wind_tex_mult: settings.wind_texture_scale,
            wind_time_mult: settings.wind_period,
            wind_pos_mult: settings.wind_scale,
            wind_amplitude: settings.wind_amplitude,
            wind_direction_angle: settings.wind_direction_angle,
            draw_capacity: layout.draw_capacity,
            _pad: [0; 2],
        }
    }
}

/// Per-frame kernel uniforms (80 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// `_Time`: only `.y` (elapsed seconds) is read
    pub time: [f32; 4],
    /// `_LocalToWorld`, column-major
    pub local_to_world: [[f32; 4]; 4],
}

impl FrameUniforms {
    pub fn new(elapsed_secs: f32, local_to_world: &Mat4) -> Self {
        Self {
            time: [0.0, elapsed_secs, 0.0, 0.0],
            local_to_world: local_to_world.to_cols_array_2d(),
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(0.0, &Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;
    use crate::grass::mesh::SourceMesh;

    #[test]
    fn test_grass_params_size() {
        assert_eq!(std::mem::size_of::<GrassParams>(), 64);
        assert_eq!(std::mem::size_of::<GrassParams>() % 16, 0);
    }

    #[test]
    fn test_frame_uniforms_size() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
        assert_eq!(std::mem::offset_of!(FrameUniforms, local_to_world), 16);
    }

    #[test]
    fn test_pack_settings() {
        let settings = GrassSettings {
            max_segments: 0,
            max_bend_angle: 0.4,
            wind_texture_scale: 2.0,
            wind_period: 3.0,
            wind_scale: 4.0,
            wind_amplitude: 0.25,
            wind_direction_angle: 90.0,
            ..Default::default()
        };
        let mesh = SourceMesh::plane(1.0, 2).unwrap();
        let layout = BufferLayout::new(&mesh, &settings, 64).unwrap();
        let params = GrassParams::new(&settings, &layout);

        assert_eq!(params.num_source_triangles, 8);
        assert_eq!(params.max_blade_segments, 1);
        assert_eq!(params.draw_capacity, 8);
        assert_eq!(params.max_bend_angle, 0.4);
        assert_eq!(params.wind_tex_mult, 2.0);
        assert_eq!(params.wind_time_mult, 3.0);
        assert_eq!(params.wind_pos_mult, 4.0);
        assert_eq!(params.wind_amplitude, 0.25);
        assert_eq!(params.wind_direction_angle, 90.0);
    }

    #[test]
    fn test_frame_time_in_y() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let frame = FrameUniforms::new(12.5, &m);
        assert_eq!(frame.time, [0.0, 12.5, 0.0, 0.0]);
        assert_eq!(frame.local_to_world[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
