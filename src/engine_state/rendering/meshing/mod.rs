//! Mesh generation for voxel chunks.
//!
//! This module converts the cells of one chunk into visible-surface geometry.
//! The key goals are:
//! 1. Emit only faces that can be seen (neighbour is transparent)
//! 2. Stay correct across chunk boundaries by reading neighbours from the grid
//! 3. Group faces by material so each chunk needs few draw calls
//!
//! # Architecture
//! - `ChunkMesher`: Main interface, bundling the chunk layout, the transparency
//!   policy and the material table
//! - `mesh`: The `ChunkMesh` / `MeshBatch` output types
//! - `culled`: The face-culling algorithm
//! - `transparency`: Pluggable policies deciding which neighbours expose a face
//!
//! Meshing is a pure function of the grid contents and the chunk key. It never
//! writes to the grid and is safe to run on worker threads under a read lock.

use crate::engine_state::voxels::{
    chunk::{ChunkKey, ChunkLayout},
    grid::VoxelGrid,
};

use super::materials::MaterialTable;

mod culled;
mod mesh;
mod transparency;

pub use mesh::{ChunkMesh, MeshBatch};
pub use transparency::{AirOnly, SeeThroughFoliage, TransparencyPredicate};

/// Converts chunks of a voxel grid into batched geometry.
pub struct ChunkMesher {
    /// Chunk size and vertical offset used to locate chunks in the grid
    layout: ChunkLayout,
    /// Which neighbours expose a face
    transparency: Box<dyn TransparencyPredicate>,
    /// Material selector per block type and side
    materials: MaterialTable,
}

impl ChunkMesher {
    /// Creates a mesher with an explicit transparency policy and material table.
    pub fn new(
        layout: ChunkLayout,
        transparency: Box<dyn TransparencyPredicate>,
        materials: MaterialTable,
    ) -> Self {
        ChunkMesher {
            layout,
            transparency,
            materials,
        }
    }

    /// Creates a mesher with the default policy (only air is transparent) and
    /// the default material table.
    pub fn with_defaults(layout: ChunkLayout) -> Self {
        Self::new(layout, Box::new(AirOnly), MaterialTable::default())
    }

    /// The chunk layout this mesher works with.
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// The material table used to tag faces.
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Generates the mesh of one chunk from the current grid contents.
    ///
    /// An all-air chunk, or a chunk entirely outside the world, yields an
    /// empty mesh.
    pub fn mesh_chunk(&self, grid: &VoxelGrid, key: ChunkKey) -> ChunkMesh {
        culled::culled_mesh(
            grid,
            &self.layout,
            key,
            self.transparency.as_ref(),
            &self.materials,
        )
    }
}
