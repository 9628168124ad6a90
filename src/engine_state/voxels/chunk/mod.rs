//! # Chunk Module
//!
//! A chunk is a cubic sub-region of the voxel grid and the unit of meshing and
//! visibility streaming. Chunks never own voxel data: blocks are always read
//! live from the [`VoxelGrid`](super::grid::VoxelGrid). A chunk only carries
//! the geometry derived from the grid and its streaming state.
//!
//! ## Coordinates
//!
//! Chunk coordinates use floor division, so negative world coordinates land in
//! negative chunks:
//!
//! ```text
//! cx = floor(x / size)
//! cy = floor((y - min_y) / size)
//! cz = floor(z / size)
//! ```
//!
//! With a chunk size of 16, world X = -1 is chunk -1 at local offset 15, not
//! chunk 0 at local offset -1.

use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::meshing::ChunkMesh;

/// Identifies a chunk by its integer chunk coordinates.
pub type ChunkKey = Point3<i32>;

/// Maps between world coordinates and chunk coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    /// Edge length of a chunk, in blocks. Always positive.
    pub chunk_size: i32,
    /// World Y of the lowest grid layer. Chunk Y coordinates are relative to it.
    pub min_y: i32,
}

impl ChunkLayout {
    /// Creates a layout for the given chunk size and world floor.
    pub fn new(chunk_size: i32, min_y: i32) -> Self {
        ChunkLayout { chunk_size, min_y }
    }

    /// The chunk containing a world position.
    pub fn chunk_of(&self, x: i32, y: i32, z: i32) -> ChunkKey {
        let size = i64::from(self.chunk_size);
        Point3::new(
            x.div_euclid(self.chunk_size),
            clamp_to_i32(self.relative_y(y).div_euclid(size)),
            z.div_euclid(self.chunk_size),
        )
    }

    /// The chunk containing a continuous position, such as a camera or player.
    ///
    /// Coordinates beyond the `i32` range saturate.
    pub fn chunk_of_point(&self, point: Point3<f64>) -> ChunkKey {
        self.chunk_of(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    /// The offset of a world position inside its chunk, each component in `0..chunk_size`.
    pub fn local_of(&self, x: i32, y: i32, z: i32) -> Vector3<i32> {
        let size = i64::from(self.chunk_size);
        Vector3::new(
            x.rem_euclid(self.chunk_size),
            clamp_to_i32(self.relative_y(y).rem_euclid(size)),
            z.rem_euclid(self.chunk_size),
        )
    }

    /// World position of the minimum corner of a chunk.
    pub fn origin_of(&self, key: ChunkKey) -> Point3<i32> {
        let size = i64::from(self.chunk_size);
        Point3::new(
            clamp_to_i32(i64::from(key.x) * size),
            clamp_to_i32(i64::from(key.y) * size + i64::from(self.min_y)),
            clamp_to_i32(i64::from(key.z) * size),
        )
    }

    /// Y measured from the world floor, widened so no input can overflow.
    fn relative_y(&self, y: i32) -> i64 {
        i64::from(y) - i64::from(self.min_y)
    }

    /// Every chunk whose geometry depends on the cell at a world position.
    ///
    /// This is the owning chunk, plus the face neighbour across every chunk
    /// boundary plane the cell touches.
    pub fn chunks_touching(&self, x: i32, y: i32, z: i32) -> Vec<ChunkKey> {
        let owner = self.chunk_of(x, y, z);
        let local = self.local_of(x, y, z);
        let last = self.chunk_size - 1;

        let mut keys = vec![owner];
        let axes = [
            (local.x, Vector3::unit_x()),
            (local.y, Vector3::unit_y()),
            (local.z, Vector3::unit_z()),
        ];
        for (offset, axis) in axes {
            if offset == 0 {
                keys.push(Point3::new(
                    owner.x.saturating_sub(axis.x),
                    owner.y.saturating_sub(axis.y),
                    owner.z.saturating_sub(axis.z),
                ));
            }
            if offset == last {
                keys.push(Point3::new(
                    owner.x.saturating_add(axis.x),
                    owner.y.saturating_add(axis.y),
                    owner.z.saturating_add(axis.z),
                ));
            }
        }
        keys
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Streaming state of a loaded chunk.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkKey,

    /// Geometry derived from the grid the last time this chunk was meshed.
    ///
    /// Empty while the first mesh of a deferred chunk is still in flight.
    pub mesh: ChunkMesh,

    /// Whether the chunk is currently handed to the renderer.
    pub active: bool,

    /// Replaced with a fresh, streamer-wide revision every time the chunk is
    /// loaded or invalidated.
    ///
    /// A mesh computed for an older revision is stale and must be dropped.
    pub revision: u64,

    /// The revision the current `mesh` was built from, if any.
    pub meshed_revision: Option<u64>,
}

impl Chunk {
    /// Creates an unmeshed, inactive chunk.
    pub fn new(position: ChunkKey) -> Self {
        Chunk {
            position,
            mesh: ChunkMesh::default(),
            active: false,
            revision: 0,
            meshed_revision: None,
        }
    }

    /// Whether the mesh reflects the latest invalidation.
    pub fn is_up_to_date(&self) -> bool {
        self.meshed_revision == Some(self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_x_maps_to_previous_chunk() {
        let layout = ChunkLayout::new(16, -200);
        assert_eq!(layout.chunk_of(-1, -200, 0), Point3::new(-1, 0, 0));
        assert_eq!(layout.local_of(-1, -200, 0), Vector3::new(15, 0, 0));
        assert_eq!(layout.chunk_of(-16, -200, -17), Point3::new(-1, 0, -2));
        assert_eq!(layout.local_of(-16, -200, -17), Vector3::new(0, 0, 15));
    }

    #[test]
    fn y_is_relative_to_world_floor() {
        let layout = ChunkLayout::new(16, -200);
        assert_eq!(layout.chunk_of(0, -200, 0).y, 0);
        assert_eq!(layout.chunk_of(0, -185, 0).y, 0);
        assert_eq!(layout.chunk_of(0, -184, 0).y, 1);
        assert_eq!(layout.chunk_of(0, -201, 0).y, -1);
        assert_eq!(layout.origin_of(Point3::new(1, 2, 3)), Point3::new(16, -168, 48));
    }

    #[test]
    fn chunk_of_point_floors_fractions() {
        let layout = ChunkLayout::new(16, 0);
        assert_eq!(
            layout.chunk_of_point(Point3::new(-0.5, 15.9, 16.0)),
            Point3::new(-1, 0, 1)
        );
    }

    #[test]
    fn interior_cell_touches_only_its_chunk() {
        let layout = ChunkLayout::new(16, 0);
        assert_eq!(layout.chunks_touching(5, 5, 5), vec![Point3::new(0, 0, 0)]);
    }

    #[test]
    fn corner_cell_touches_three_neighbours() {
        let layout = ChunkLayout::new(16, 0);
        let keys = layout.chunks_touching(16, 31, -1);
        assert_eq!(
            keys,
            vec![
                Point3::new(1, 1, -1),
                Point3::new(0, 1, -1),
                Point3::new(1, 2, -1),
                Point3::new(1, 1, 0),
            ]
        );
    }
}
