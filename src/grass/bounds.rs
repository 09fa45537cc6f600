//! Culling bounds for the generated grass.

use crate::core::types::Mat4;
use crate::grass::config::GrassSettings;
use crate::grass::mesh::SourceMesh;
use crate::math::Aabb;

/// Source mesh bounds padded on every axis by the tallest/widest blade.
pub fn compute_local_bounds(mesh: &SourceMesh, settings: &GrassSettings) -> Aabb {
    mesh.bounds().expanded(settings.max_blade_extent())
}

/// Conservative world-space box around `local` under `object_to_world`.
///
/// Not the tight oriented box: under rotation the result is larger than
/// necessary, which culling tolerates.
pub fn transform_to_world(local: &Aabb, object_to_world: &Mat4) -> Aabb {
    local.transformed(object_to_world)
}
