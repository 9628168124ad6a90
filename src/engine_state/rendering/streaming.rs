//! # Chunk Streaming
//!
//! The `ChunkStreamer` decides which chunks have geometry and which of those
//! are handed to the renderer, based on a reference point (the camera or the
//! player) and a view radius measured in chunks.
//!
//! ## Chunk lifecycle
//!
//! ```text
//! Unloaded --(enters view)--> Active --(leaves view)--> Inactive
//!     ^                          ^                          |
//!     |                          +------(re-enters view)----+
//!     +----------(evicted, least recently deactivated)------+
//! ```
//!
//! Inactive chunks keep their geometry so a chunk that comes back into view
//! does not need to be meshed again. Their number is bounded by an LRU budget;
//! the chunk that has been out of view the longest is released first.
//!
//! ## Immediate and deferred meshing
//!
//! Every operation exists in two flavours. The immediate one (`update`,
//! `rebuild_at`) meshes on the calling thread and returns finished
//! [`RenderCommand`]s. The deferred one (`update_deferred`,
//! `rebuild_at_deferred`) only bumps chunk revisions and returns
//! [`MeshRequest`]s; the caller meshes them elsewhere and hands the results
//! back through [`ChunkStreamer::install_mesh`], which drops any result whose
//! revision has since been superseded.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace};
use lru::LruCache;

use crate::config::WorldDimensions;
use crate::engine_state::voxels::{
    chunk::{Chunk, ChunkKey, ChunkLayout},
    grid::VoxelGrid,
};

use super::meshing::{ChunkMesh, ChunkMesher};

/// An instruction for the rendering collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderCommand {
    /// New geometry for the chunk is available through [`ChunkStreamer::mesh`].
    Upload(ChunkKey),
    /// The chunk should be drawn. May precede the first `Upload` of a chunk.
    Show(ChunkKey),
    /// The chunk should no longer be drawn, but its geometry is kept.
    Hide(ChunkKey),
    /// The chunk has been evicted; any resources held for it can be freed.
    Release(ChunkKey),
}

/// A chunk that needs to be meshed at the given revision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshRequest {
    pub key: ChunkKey,
    pub revision: u64,
}

/// Tracks loaded chunks around a reference point.
pub struct ChunkStreamer {
    /// Shared with mesh tasks running on worker threads.
    mesher: Arc<ChunkMesher>,
    /// Used to clip the visible set to chunks that intersect the world.
    dimensions: WorldDimensions,
    /// Every loaded chunk, active or not.
    chunks: HashMap<ChunkKey, Chunk>,
    /// Inactive chunks, least recently deactivated first.
    inactive: LruCache<ChunkKey, ()>,
    /// Maximum number of inactive chunks kept before eviction.
    max_inactive: usize,
    /// Source of chunk revisions. Shared by all chunks so a chunk that is
    /// evicted and loaded again never reuses a revision still in flight.
    next_revision: u64,
}

impl ChunkStreamer {
    /// Creates a streamer with nothing loaded.
    ///
    /// # Arguments
    /// * `mesher` - The mesher used for immediate builds, shared with deferred tasks
    /// * `dimensions` - Dimensions of the world being streamed
    /// * `max_inactive` - How many out-of-view chunks keep their geometry
    pub fn new(mesher: Arc<ChunkMesher>, dimensions: WorldDimensions, max_inactive: usize) -> Self {
        ChunkStreamer {
            mesher,
            dimensions,
            chunks: HashMap::new(),
            inactive: LruCache::unbounded(),
            max_inactive,
            next_revision: 0,
        }
    }

    fn bump_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    pub fn layout(&self) -> &ChunkLayout {
        self.mesher.layout()
    }

    /// A handle to the mesher, for building deferred mesh tasks.
    pub fn mesher(&self) -> Arc<ChunkMesher> {
        self.mesher.clone()
    }

    /// The current geometry of a loaded chunk.
    pub fn mesh(&self, key: ChunkKey) -> Option<&ChunkMesh> {
        self.chunks.get(&key).map(|chunk| &chunk.mesh)
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    pub fn is_loaded(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    pub fn is_active(&self, key: ChunkKey) -> bool {
        self.chunks.get(&key).is_some_and(|chunk| chunk.active)
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    pub fn active_count(&self) -> usize {
        self.chunks.len() - self.inactive.len()
    }

    /// Keys of all active chunks, sorted by (x, y, z).
    pub fn active_keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self
            .chunks
            .values()
            .filter(|chunk| chunk.active)
            .map(|chunk| chunk.position)
            .collect();
        keys.sort_by_key(|k| (k.x, k.y, k.z));
        keys
    }

    /// Keys of all loaded chunks whose mesh lags behind their revision.
    pub fn stale_keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self
            .chunks
            .values()
            .filter(|chunk| !chunk.is_up_to_date())
            .map(|chunk| chunk.position)
            .collect();
        keys.sort_by_key(|k| (k.x, k.y, k.z));
        keys
    }

    /// The chunks within `view_radius` of the reference chunk that intersect
    /// the world volume, nearest first.
    pub fn visible_keys(&self, reference: Point3<f64>, view_radius: i32) -> Vec<ChunkKey> {
        let layout = self.layout();
        let centre = layout.chunk_of_point(reference);
        let radius = view_radius.max(0);
        let dims = &self.dimensions;
        if dims.size_x <= 0 || dims.size_y <= 0 || dims.size_z <= 0 {
            return Vec::new();
        }

        let last = layout.chunk_of(dims.size_x - 1, dims.max_y(), dims.size_z - 1);
        let clip = |c: i32, max: i32| (c.saturating_sub(radius).max(0), c.saturating_add(radius).min(max));
        let (x0, x1) = clip(centre.x, last.x);
        let (y0, y1) = clip(centre.y, last.y);
        let (z0, z1) = clip(centre.z, last.z);

        let mut keys = Vec::new();
        for y in y0..=y1 {
            for z in z0..=z1 {
                for x in x0..=x1 {
                    keys.push(Point3::new(x, y, z));
                }
            }
        }
        keys.sort_by_key(|k| {
            let d = |a: i32, b: i32| (i64::from(a) - i64::from(b)).pow(2);
            (d(k.x, centre.x) + d(k.y, centre.y) + d(k.z, centre.z), k.y, k.z, k.x)
        });
        keys
    }

    /// Moves the reference point and meshes newly visible chunks immediately.
    ///
    /// # Returns
    /// The render commands for this update, with every `Upload` after the
    /// visibility changes.
    pub fn update(&mut self, grid: &VoxelGrid, reference: Point3<f64>, view_radius: i32) -> Vec<RenderCommand> {
        let (mut commands, requests) = self.update_deferred(reference, view_radius);
        commands.extend(self.build_now(grid, requests));
        commands
    }

    /// Moves the reference point without meshing.
    ///
    /// # Returns
    /// The visibility commands, and a mesh request for every newly loaded chunk
    /// or reactivated chunk whose geometry is out of date.
    pub fn update_deferred(
        &mut self,
        reference: Point3<f64>,
        view_radius: i32,
    ) -> (Vec<RenderCommand>, Vec<MeshRequest>) {
        let visible = self.visible_keys(reference, view_radius);
        let visible_set: HashSet<ChunkKey> = visible.iter().copied().collect();
        let mut commands = Vec::new();
        let mut requests = Vec::new();

        for &key in &visible {
            match self.chunks.get_mut(&key) {
                None => {
                    let mut chunk = Chunk::new(key);
                    chunk.active = true;
                    chunk.revision = self.bump_revision();
                    requests.push(MeshRequest {
                        key,
                        revision: chunk.revision,
                    });
                    self.chunks.insert(key, chunk);
                    commands.push(RenderCommand::Show(key));
                }
                Some(chunk) if !chunk.active => {
                    chunk.active = true;
                    self.inactive.pop(&key);
                    if !chunk.is_up_to_date() {
                        requests.push(MeshRequest {
                            key,
                            revision: chunk.revision,
                        });
                    }
                    commands.push(RenderCommand::Show(key));
                }
                Some(_) => {}
            }
        }

        let mut leaving: Vec<ChunkKey> = self
            .chunks
            .values()
            .filter(|chunk| chunk.active && !visible_set.contains(&chunk.position))
            .map(|chunk| chunk.position)
            .collect();
        leaving.sort_by_key(|k| (k.x, k.y, k.z));
        for key in leaving {
            if let Some(chunk) = self.chunks.get_mut(&key) {
                chunk.active = false;
            }
            self.inactive.put(key, ());
            commands.push(RenderCommand::Hide(key));
        }

        commands.extend(self.evict());

        debug!(
            "Streamed {} visible chunks: {} loaded, {} inactive, {} to mesh",
            visible.len(),
            self.chunks.len(),
            self.inactive.len(),
            requests.len()
        );

        (commands, requests)
    }

    /// Releases the least recently deactivated chunks beyond the budget.
    fn evict(&mut self) -> Vec<RenderCommand> {
        let mut commands = Vec::new();
        while self.inactive.len() > self.max_inactive {
            let Some((key, _)) = self.inactive.pop_lru() else {
                break;
            };
            self.chunks.remove(&key);
            commands.push(RenderCommand::Release(key));
        }
        if !commands.is_empty() {
            debug!("Evicted {} inactive chunks", commands.len());
        }
        commands
    }

    /// Rebuilds every loaded chunk whose geometry depends on the given cell.
    ///
    /// # Returns
    /// An `Upload` per rebuilt chunk.
    pub fn rebuild_at(&mut self, grid: &VoxelGrid, x: i32, y: i32, z: i32) -> Vec<RenderCommand> {
        let requests = self.rebuild_at_deferred(x, y, z);
        self.build_now(grid, requests)
    }

    /// Invalidates every loaded chunk whose geometry depends on the given cell.
    pub fn rebuild_at_deferred(&mut self, x: i32, y: i32, z: i32) -> Vec<MeshRequest> {
        let keys = self.layout().chunks_touching(x, y, z);
        self.invalidate(keys)
    }

    /// Immediate rebuild for a batch of changed cells, each chunk built once.
    pub fn rebuild_cells(&mut self, grid: &VoxelGrid, cells: &[Point3<i32>]) -> Vec<RenderCommand> {
        let requests = self.rebuild_cells_deferred(cells);
        self.build_now(grid, requests)
    }

    /// Deferred rebuild for a batch of changed cells, each chunk requested once.
    pub fn rebuild_cells_deferred(&mut self, cells: &[Point3<i32>]) -> Vec<MeshRequest> {
        let mut seen = HashSet::new();
        let keys: Vec<ChunkKey> = cells
            .iter()
            .flat_map(|cell| self.layout().chunks_touching(cell.x, cell.y, cell.z))
            .filter(|key| seen.insert(*key))
            .collect();
        self.invalidate(keys)
    }

    /// Bumps the revision of every loaded chunk among `keys`.
    fn invalidate(&mut self, keys: Vec<ChunkKey>) -> Vec<MeshRequest> {
        let mut requests = Vec::new();
        for key in keys {
            if !self.chunks.contains_key(&key) {
                continue;
            }
            let revision = self.bump_revision();
            if let Some(chunk) = self.chunks.get_mut(&key) {
                chunk.revision = revision;
                requests.push(MeshRequest { key, revision });
            }
        }
        requests
    }

    /// Swaps in a mesh built for `revision` of the chunk at `key`.
    ///
    /// # Returns
    /// `Some(Upload)` if the mesh was installed, `None` if the chunk has been
    /// evicted or invalidated again since the request was issued.
    pub fn install_mesh(&mut self, key: ChunkKey, revision: u64, mesh: ChunkMesh) -> Option<RenderCommand> {
        let Some(chunk) = self.chunks.get_mut(&key) else {
            trace!("Dropped mesh for unloaded chunk {:?}", key);
            return None;
        };
        if chunk.revision != revision {
            trace!(
                "Dropped stale mesh for chunk {:?} (revision {}, current {})",
                key,
                revision,
                chunk.revision
            );
            return None;
        }
        chunk.mesh = mesh;
        chunk.meshed_revision = Some(revision);
        Some(RenderCommand::Upload(key))
    }

    fn build_now(&mut self, grid: &VoxelGrid, requests: Vec<MeshRequest>) -> Vec<RenderCommand> {
        requests
            .into_iter()
            .filter_map(|request| {
                let mesh = self.mesher.mesh_chunk(grid, request.key);
                self.install_mesh(request.key, request.revision, mesh)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn dims() -> WorldDimensions {
        WorldDimensions {
            size_x: 64,
            size_y: 32,
            size_z: 64,
            min_y: 0,
        }
    }

    fn streamer(max_inactive: usize) -> ChunkStreamer {
        let mesher = Arc::new(ChunkMesher::with_defaults(ChunkLayout::new(16, 0)));
        ChunkStreamer::new(mesher, dims(), max_inactive)
    }

    #[test]
    fn visible_set_is_clipped_to_the_world() {
        let streamer = streamer(8);
        let keys = streamer.visible_keys(Point3::new(1.0, 1.0, 1.0), 1);
        // x, z in 0..=1 and y in 0..=1
        assert_eq!(keys.len(), 8);
        assert_eq!(keys[0], Point3::new(0, 0, 0));
        assert!(keys.iter().all(|k| k.x >= 0 && k.y >= 0 && k.z >= 0));
    }

    #[test]
    fn update_loads_and_hides_by_radius() {
        let grid = VoxelGrid::new(dims());
        let mut streamer = streamer(64);

        let commands = streamer.update(&grid, Point3::new(8.0, 8.0, 8.0), 0);
        assert_eq!(
            commands,
            vec![
                RenderCommand::Show(Point3::new(0, 0, 0)),
                RenderCommand::Upload(Point3::new(0, 0, 0))
            ]
        );

        let commands = streamer.update(&grid, Point3::new(24.0, 8.0, 8.0), 0);
        assert!(commands.contains(&RenderCommand::Hide(Point3::new(0, 0, 0))));
        assert!(commands.contains(&RenderCommand::Show(Point3::new(1, 0, 0))));
        assert!(!streamer.is_active(Point3::new(0, 0, 0)));
        assert!(streamer.is_loaded(Point3::new(0, 0, 0)));

        // Coming back reuses the kept geometry.
        let commands = streamer.update(&grid, Point3::new(8.0, 8.0, 8.0), 0);
        assert!(commands.contains(&RenderCommand::Show(Point3::new(0, 0, 0))));
        assert!(!commands.contains(&RenderCommand::Upload(Point3::new(0, 0, 0))));
    }

    #[test]
    fn eviction_releases_least_recently_deactivated() {
        let grid = VoxelGrid::new(dims());
        let mut streamer = streamer(1);

        streamer.update(&grid, Point3::new(8.0, 8.0, 8.0), 0);
        streamer.update(&grid, Point3::new(24.0, 8.0, 8.0), 0);
        let commands = streamer.update(&grid, Point3::new(40.0, 8.0, 8.0), 0);

        assert!(commands.contains(&RenderCommand::Release(Point3::new(0, 0, 0))));
        assert!(!streamer.is_loaded(Point3::new(0, 0, 0)));
        assert!(streamer.is_loaded(Point3::new(1, 0, 0)));
        assert_eq!(streamer.inactive_count(), 1);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut grid = VoxelGrid::new(dims());
        let mut streamer = streamer(8);
        let (_, requests) = streamer.update_deferred(Point3::new(8.0, 8.0, 8.0), 0);
        assert_eq!(requests.len(), 1);
        let first = requests[0];

        grid.set(3, 3, 3, BlockType::STONE);
        let rebuild = streamer.rebuild_at_deferred(3, 3, 3);
        assert_eq!(rebuild[0].revision, first.revision + 1);

        let mesher = streamer.mesher();
        let old = mesher.mesh_chunk(&grid, first.key);
        assert_eq!(streamer.install_mesh(first.key, first.revision, old), None);
        assert!(streamer.stale_keys().contains(&first.key));

        let new = mesher.mesh_chunk(&grid, rebuild[0].key);
        assert_eq!(
            streamer.install_mesh(rebuild[0].key, rebuild[0].revision, new),
            Some(RenderCommand::Upload(first.key))
        );
        assert_eq!(streamer.mesh(first.key).map(|m| m.quad_count()), Some(6));
    }

    #[test]
    fn far_away_reference_loads_nothing() {
        let grid = VoxelGrid::new(dims());
        let mut streamer = streamer(8);
        for reference in [
            Point3::new(0.0, 1e12, 0.0),
            Point3::new(-1e12, -1e12, -1e12),
            Point3::new(f64::MAX, 0.0, f64::MIN),
        ] {
            assert!(streamer.update(&grid, reference, 4).is_empty());
        }
        assert_eq!(streamer.loaded_count(), 0);
    }

    #[test]
    fn rebuild_ignores_unloaded_chunks() {
        let grid = VoxelGrid::new(dims());
        let mut streamer = streamer(8);
        assert!(streamer.rebuild_at(&grid, 15, 5, 3).is_empty());
    }
}
