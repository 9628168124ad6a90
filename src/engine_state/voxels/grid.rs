//! # Voxel Grid Module
//!
//! This module provides the `VoxelGrid`, the single authoritative store of
//! block data for the whole bounded world.
//!
//! ## Layout
//!
//! Cells are stored densely, one byte per cell, in a flat vector. The linear
//! index of a cell is
//!
//! ```text
//! (y - min_y) * size_x * size_z + z * size_x + x
//! ```
//!
//! which is also the byte order of a saved world buffer.
//!
//! ## Out-of-range access
//!
//! Reads outside the volume yield air and writes outside it are ignored. This
//! keeps neighbour lookups at the world edge branch-free for callers.

use cgmath::Point3;
use log::debug;

use crate::config::WorldDimensions;
use crate::error::EngineError;

use super::block::{block_type::BlockType, BlockTypeSize};

/// Dense storage of block codes over the fixed world volume.
#[derive(Clone)]
pub struct VoxelGrid {
    /// Size and vertical offset of the volume.
    dimensions: WorldDimensions,
    /// One block code per cell, in linear index order.
    data: Vec<BlockTypeSize>,
    /// Dirt cells that were uncovered by a write, in the order they were exposed.
    ///
    /// This queue is only appended to by `set`; consumers drain it on their own schedule.
    exposed_soil: Vec<Point3<i32>>,
}

impl VoxelGrid {
    /// Allocates a fresh, all-air grid.
    pub fn new(dimensions: WorldDimensions) -> Self {
        VoxelGrid {
            dimensions,
            data: vec![BlockType::AIR.code(); dimensions.volume()],
            exposed_soil: Vec::new(),
        }
    }

    /// Adopts a previously persisted buffer as grid storage.
    ///
    /// # Errors
    /// Returns [`EngineError::GridBufferMismatch`] if the buffer length does not
    /// equal the volume of `dimensions`.
    pub fn from_raw(dimensions: WorldDimensions, data: Vec<BlockTypeSize>) -> Result<Self, EngineError> {
        let expected = dimensions.volume();
        if data.len() != expected {
            return Err(EngineError::GridBufferMismatch {
                expected,
                actual: data.len(),
            });
        }

        debug!("Adopted grid buffer of {} cells", expected);

        Ok(VoxelGrid {
            dimensions,
            data,
            exposed_soil: Vec::new(),
        })
    }

    /// The dimensions this grid was allocated with.
    pub fn dimensions(&self) -> WorldDimensions {
        self.dimensions
    }

    /// The raw storage, one byte per cell in linear index order.
    pub fn as_bytes(&self) -> &[BlockTypeSize] {
        &self.data
    }

    /// Computes the linear index of a cell, or `None` if it lies outside the volume.
    #[inline]
    fn index_of(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let dims = &self.dimensions;
        if x < 0 || x >= dims.size_x || z < 0 || z >= dims.size_z {
            return None;
        }
        let world_y = y.checked_sub(dims.min_y)?;
        if world_y < 0 || world_y >= dims.size_y {
            return None;
        }
        Some(
            world_y as usize * dims.size_x as usize * dims.size_z as usize
                + z as usize * dims.size_x as usize
                + x as usize,
        )
    }

    /// Whether the cell lies inside the world volume.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.index_of(x, y, z).is_some()
    }

    /// Reads the block at the given world position.
    ///
    /// Positions outside the volume, and cells holding a code that is not a
    /// known block type, read as air.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        match self.index_of(x, y, z) {
            Some(index) => BlockType::from_code(self.data[index]).unwrap_or(BlockType::AIR),
            None => BlockType::AIR,
        }
    }

    /// Point form of [`get`](Self::get).
    #[inline]
    pub fn get_at(&self, position: Point3<i32>) -> BlockType {
        self.get(position.x, position.y, position.z)
    }

    /// Overwrites the block at the given world position.
    ///
    /// If the write turns the cell into air and the cell below is dirt, the
    /// dirt position is queued as exposed soil.
    ///
    /// # Returns
    /// `true` if the cell was inside the volume and has been written.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let Some(index) = self.index_of(x, y, z) else {
            return false;
        };
        self.data[index] = block.code();

        let below = y.saturating_sub(1);
        if block.is_air() && below != y && self.get(x, below, z) == BlockType::DIRT {
            self.exposed_soil.push(Point3::new(x, below, z));
        }

        true
    }

    /// Point form of [`set`](Self::set).
    pub fn set_at(&mut self, position: Point3<i32>, block: BlockType) -> bool {
        self.set(position.x, position.y, position.z, block)
    }

    /// Takes every exposed-soil position queued since the last drain.
    pub fn drain_exposed_soil(&mut self) -> Vec<Point3<i32>> {
        std::mem::take(&mut self.exposed_soil)
    }

    /// Whether a moving body should collide with this block.
    pub fn is_solid_for_collision(block: BlockType) -> bool {
        block.is_solid_for_collision()
    }

    /// Returns the Y a body should stand on in the given column.
    ///
    /// Scans from the ceiling downward and returns one above the first non-air
    /// cell. An all-air column returns the world floor.
    pub fn surface_y(&self, x: i32, z: i32) -> i32 {
        let dims = &self.dimensions;
        (dims.min_y..=dims.max_y())
            .rev()
            .find(|&y| !self.get(x, y, z).is_air())
            .map_or(dims.min_y, |y| y + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> WorldDimensions {
        WorldDimensions {
            size_x: 8,
            size_y: 10,
            size_z: 6,
            min_y: -4,
        }
    }

    #[test]
    fn linear_index_follows_layer_row_column_order() {
        let mut grid = VoxelGrid::new(small());
        grid.set(3, -2, 5, BlockType::STONE);
        // (y - min_y) * sx * sz + z * sx + x
        let index = 2 * 8 * 6 + 5 * 8 + 3;
        assert_eq!(grid.as_bytes()[index], BlockType::STONE.code());
    }

    #[test]
    fn vertical_bounds_are_relative_to_min_y() {
        let mut grid = VoxelGrid::new(small());
        assert!(grid.set(0, -4, 0, BlockType::DIRT));
        assert!(grid.set(0, 5, 0, BlockType::DIRT));
        assert!(!grid.set(0, -5, 0, BlockType::DIRT));
        assert!(!grid.set(0, 6, 0, BlockType::DIRT));
        assert_eq!(grid.get(0, 6, 0), BlockType::AIR);
    }

    #[test]
    fn clearing_above_dirt_exposes_soil() {
        let mut grid = VoxelGrid::new(small());
        grid.set(1, 0, 1, BlockType::DIRT);
        grid.set(1, 1, 1, BlockType::STONE);
        grid.set(1, 1, 1, BlockType::AIR);
        grid.set(2, 1, 2, BlockType::AIR);

        assert_eq!(grid.drain_exposed_soil(), vec![Point3::new(1, 0, 1)]);
        assert!(grid.drain_exposed_soil().is_empty());
    }

    #[test]
    fn unknown_codes_read_as_air() {
        let mut data = vec![0; small().volume()];
        data[0] = 250;
        let grid = VoxelGrid::from_raw(small(), data).unwrap();
        assert_eq!(grid.get(0, -4, 0), BlockType::AIR);
    }

    #[test]
    fn rejects_wrong_length_buffer() {
        let err = VoxelGrid::from_raw(small(), vec![0; 3]).err().unwrap();
        assert!(matches!(
            err,
            EngineError::GridBufferMismatch { expected: 480, actual: 3 }
        ));
    }

    #[test]
    fn surface_of_empty_column_is_floor() {
        let mut grid = VoxelGrid::new(small());
        assert_eq!(grid.surface_y(2, 2), -4);
        grid.set(2, -4, 2, BlockType::STONE);
        assert_eq!(grid.surface_y(2, 2), -3);
        grid.set(2, 3, 2, BlockType::GRASS);
        assert_eq!(grid.surface_y(2, 2), 4);
    }

    #[test]
    fn bodies_pass_through_air_and_lava() {
        let passable: Vec<BlockType> = BlockType::ALL
            .into_iter()
            .filter(|&b| !VoxelGrid::is_solid_for_collision(b))
            .collect();
        assert_eq!(passable, vec![BlockType::AIR, BlockType::LAVA]);
    }
}
