//! Viewer camera used by the offscreen draw target

use crate::core::types::{Vec3, Mat4};
use crate::math::Frustum;

/// Right-handed look-at camera with a 0..1 depth perspective projection
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height, kept in sync by the target
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// 60 degree camera at `position` looking at `target`
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
            fov_y: 60f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }

    /// View frustum for bounds culling
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1.0);
    }
}
