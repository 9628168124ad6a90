//! Task for generating mesh data for chunks in a background thread.
//!
//! The task holds a read lock on the grid only while meshing. The result
//! carries the revision it was requested for, so a chunk edited while the task
//! was running simply drops the outdated mesh when it arrives.

use std::sync::Arc;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::{
            meshing::{ChunkMesh, ChunkMesher},
            streaming::{ChunkStreamer, MeshRequest, RenderCommand},
        },
        task_management::task::{Task, TaskResult},
        voxels::{chunk::ChunkKey, grid::VoxelGrid},
    },
};

/// A task that meshes one chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// The world being meshed
    grid: MtResource<VoxelGrid>,
    /// Shared mesher, also used by the streamer for immediate builds
    mesher: Arc<ChunkMesher>,
    /// The chunk and revision to build
    request: MeshRequest,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `grid` - Shared handle to the voxel grid
    /// * `mesher` - The mesher to build with
    /// * `request` - The chunk and revision issued by the streamer
    pub fn new(grid: MtResource<VoxelGrid>, mesher: Arc<ChunkMesher>, request: MeshRequest) -> Self {
        ChunkMeshGenerationTask {
            grid,
            mesher,
            request,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mesh = {
            let grid = self.grid.get();
            self.mesher.mesh_chunk(&grid, self.request.key)
        };

        Box::new(ChunkMeshGenerationTaskResult {
            key: self.request.key,
            revision: self.request.revision,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    key: ChunkKey,
    revision: u64,
    mesh: ChunkMesh,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Installs the mesh, unless the chunk has been evicted or edited again.
    ///
    /// # Returns
    /// No follow-up tasks, and an `Upload` if the mesh was installed.
    fn handle_result(
        self: Box<Self>,
        streamer: &mut ChunkStreamer,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>) {
        let commands = streamer
            .install_mesh(self.key, self.revision, self.mesh)
            .into_iter()
            .collect();
        (Vec::new(), commands)
    }
}
