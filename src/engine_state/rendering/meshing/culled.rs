//! Face-culled meshing.
//!
//! Every non-air cell of the chunk is visited; each of its six faces is
//! emitted if and only if the neighbour across that face is transparent.
//! Neighbours are read straight from the grid, so cells in adjacent chunks
//! (and outside the world, which read as air) are handled uniformly.

use log::trace;
use web_time::Instant;

use crate::engine_state::rendering::materials::MaterialTable;
use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    chunk::{ChunkKey, ChunkLayout},
    grid::VoxelGrid,
};

use super::{mesh::ChunkMesh, transparency::TransparencyPredicate};

/// Builds the culled-face mesh of one chunk.
pub fn culled_mesh(
    grid: &VoxelGrid,
    layout: &ChunkLayout,
    key: ChunkKey,
    transparency: &dyn TransparencyPredicate,
    materials: &MaterialTable,
) -> ChunkMesh {
    let start_time = Instant::now();
    let origin = layout.origin_of(key);
    let size = layout.chunk_size;
    let mut mesh = ChunkMesh::default();

    for y in origin.y..origin.y + size {
        for z in origin.z..origin.z + size {
            for x in origin.x..origin.x + size {
                let block = grid.get(x, y, z);
                if block.is_air() {
                    continue;
                }

                let position = cgmath::Point3::new(x, y, z);
                let cell_origin = [x as f32, y as f32, z as f32];
                for side in BlockSide::all() {
                    let neighbour = grid.get_at(side.neighbour_of(position));
                    if transparency.is_transparent(neighbour) {
                        mesh.batch_mut(materials.selector(block, side))
                            .push_face(cell_origin, side);
                    }
                }
            }
        }
    }

    trace!(
        "Meshed chunk {:?}: {} quads in {} batches ({:?})",
        key,
        mesh.quad_count(),
        mesh.batches.len(),
        start_time.elapsed()
    );

    mesh
}
