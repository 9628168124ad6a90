//! Mesh data structures produced by the chunk mesher.
//!
//! A chunk mesh is a set of batches, one per material selector. Each batch is
//! an indexed triangle list the renderer can upload and draw with a single
//! call.

use std::collections::BTreeMap;

use crate::engine_state::rendering::{materials::MaterialSelector, vertex::Vertex};
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Indices of the two triangles of a quad, relative to its first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// UVs of the quad corners, in `BlockSide::quad_corners` order.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Geometry for all faces sharing one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBatch {
    /// The vertex data for this batch, four per quad
    pub vertices: Vec<Vertex>,
    /// The index data for this batch, six per quad
    pub indices: Vec<u32>,
}

impl MeshBatch {
    /// Appends one outward-facing unit quad for a face of the cell at `origin`.
    pub fn push_face(&mut self, origin: [f32; 3], side: BlockSide) {
        let base = self.vertices.len() as u32;
        let normal = side.normal().cast::<f32>().map_or([0.0; 3], |n| [n.x, n.y, n.z]);

        for (corner, uv) in side.quad_corners().iter().zip(QUAD_UVS) {
            self.vertices.push(Vertex::new(
                [
                    origin[0] + corner[0],
                    origin[1] + corner[1],
                    origin[2] + corner[2],
                ],
                normal,
                uv,
            ));
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Number of quads in this batch.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// The renderable geometry of one chunk.
///
/// Batches are kept in a `BTreeMap` so iteration order, and therefore the
/// whole mesh, is deterministic for a given grid state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// One batch per material selector that has at least one face.
    pub batches: BTreeMap<MaterialSelector, MeshBatch>,
}

impl ChunkMesh {
    /// Whether the chunk produced no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of quads across all batches.
    pub fn quad_count(&self) -> usize {
        self.batches.values().map(MeshBatch::quad_count).sum()
    }

    /// Total number of vertices across all batches.
    pub fn vertex_count(&self) -> usize {
        self.batches.values().map(|b| b.vertices.len()).sum()
    }

    /// Total number of indices across all batches.
    pub fn index_count(&self) -> usize {
        self.batches.values().map(|b| b.indices.len()).sum()
    }

    /// The batch for a material, creating it on first use.
    pub fn batch_mut(&mut self, selector: MaterialSelector) -> &mut MeshBatch {
        self.batches.entry(selector).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_indices_are_offset_by_existing_vertices() {
        let mut batch = MeshBatch::default();
        batch.push_face([0.0, 0.0, 0.0], BlockSide::TOP);
        batch.push_face([1.0, 0.0, 0.0], BlockSide::TOP);

        assert_eq!(batch.quad_count(), 2);
        assert_eq!(&batch.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn face_carries_side_normal_and_unit_uvs() {
        let mut batch = MeshBatch::default();
        batch.push_face([2.0, 3.0, 4.0], BlockSide::LEFT);

        for vertex in &batch.vertices {
            assert_eq!(vertex.normal, [-1.0, 0.0, 0.0]);
            assert_eq!(vertex.position[0], 2.0);
        }
        let uvs: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.tex_coords).collect();
        assert_eq!(uvs, QUAD_UVS.to_vec());
    }
}
