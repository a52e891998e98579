//! Decoded mesh payload for a single cached frame.

use crate::util::{BBox3f, Vec2, Vec3};

/// Decoded geometry for one frame of an animated mesh stream.
///
/// Produced by a decode callback, cached by the streaming backend, and
/// handed to tracks as the current playback payload. Indices form a
/// triangle list.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (optional).
    pub normals: Option<Vec<Vec3>>,
    /// UV coordinates (optional).
    pub uvs: Option<Vec<Vec2>>,
    /// Vertex velocities / motion vectors (optional).
    pub velocities: Option<Vec<Vec3>>,
    /// Triangle indices into the positions array.
    pub indices: Vec<u32>,
    /// Bounding box, if the decoder knows it.
    pub bounds: Option<BBox3f>,
}

impl MeshData {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get number of indices.
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// Check if mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if mesh has UVs.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Check if mesh has velocities.
    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }

    /// Check if this is a renderable mesh (has positions and a whole
    /// number of triangles).
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty() && !self.indices.is_empty() && self.indices.len() % 3 == 0
    }

    /// Calculate the bounding box from positions.
    ///
    /// Returns [`BBox3f::ZERO`] for an empty mesh.
    pub fn compute_bounds(&self) -> BBox3f {
        if self.positions.is_empty() {
            return BBox3f::ZERO;
        }

        let mut bounds = BBox3f::from_point(self.positions[0]);
        for &p in &self.positions[1..] {
            bounds.expand_by_point(p);
        }
        bounds
    }

    /// Approximate payload size in bytes, for cache accounting.
    pub fn byte_size(&self) -> usize {
        use std::mem::size_of;

        self.positions.len() * size_of::<Vec3>()
            + self.normals.as_ref().map_or(0, |v| v.len() * size_of::<Vec3>())
            + self.uvs.as_ref().map_or(0, |v| v.len() * size_of::<Vec2>())
            + self.velocities.as_ref().map_or(0, |v| v.len() * size_of::<Vec3>())
            + self.indices.len() * size_of::<u32>()
    }
}
