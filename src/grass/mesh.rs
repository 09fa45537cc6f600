//! Source mesh: the sparse triangle mesh blades grow from.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::math::Aabb;

/// One source vertex as the kernel reads it (12 bytes, tightly packed).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SourceVertex {
    pub position: [f32; 3],
}

/// Immutable vertex positions plus triangle index triples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMesh", into = "RawMesh")]
pub struct SourceMesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: Aabb,
}

#[derive(Serialize, Deserialize)]
struct RawMesh {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl TryFrom<RawMesh> for SourceMesh {
    type Error = Error;

    fn try_from(raw: RawMesh) -> Result<Self> {
        SourceMesh::new(raw.positions.into_iter().map(Vec3::from).collect(), raw.indices)
    }
}

impl From<SourceMesh> for RawMesh {
    fn from(mesh: SourceMesh) -> Self {
        Self {
            positions: mesh.positions.iter().map(|p| p.to_array()).collect(),
            indices: mesh.indices,
        }
    }
}

impl SourceMesh {
    /// Build a mesh, rejecting topology the kernel cannot consume.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::Mesh("source mesh has no triangles".into()));
        }
        if indices.len() % 3 != 0 {
            return Err(Error::Mesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(Error::Mesh(format!(
                "index {} out of range for {} vertices",
                bad,
                positions.len()
            )));
        }
        let bounds = Aabb::from_points(&positions)
            .ok_or_else(|| Error::Mesh("source mesh has no vertices".into()))?;

        Ok(Self { positions, indices, bounds })
    }

    /// Flat grid in the XZ plane centered on the origin, `subdivisions` cells per side.
    pub fn plane(size: f32, subdivisions: u32) -> Result<Self> {
        let cells = subdivisions.max(1);
        let verts_per_side = cells + 1;
        let step = size / cells as f32;
        let half = size * 0.5;

        let mut positions = Vec::with_capacity((verts_per_side * verts_per_side) as usize);
        for z in 0..verts_per_side {
            for x in 0..verts_per_side {
                positions.push(Vec3::new(x as f32 * step - half, 0.0, z as f32 * step - half));
            }
        }

        let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
        for z in 0..cells {
            for x in 0..cells {
                let i0 = z * verts_per_side + x;
                let i1 = i0 + 1;
                let i2 = i0 + verts_per_side;
                let i3 = i2 + 1;
                // Counter-clockwise seen from +Y so face normals point up
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        Self::new(positions, indices)
    }

    /// Load a mesh from JSON `{ "positions": [[x,y,z], ...], "indices": [...] }`
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the mesh as JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Flat index list, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Tight local-space bounds of the vertex positions
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Vertex records ready for upload
    pub fn source_vertices(&self) -> Vec<SourceVertex> {
        self.positions
            .iter()
            .map(|p| SourceVertex { position: p.to_array() })
            .collect()
    }
}
