//! Tree placement.
//!
//! Trees are a straight wooden trunk with an ellipsoidal leaf crown, flattened
//! vertically. The same shape is used by world generation and by saplings
//! growing at runtime.

use cgmath::Point3;

use crate::engine_state::voxels::{block::block_type::BlockType, grid::VoxelGrid};

/// Chance that a grass column gets a tree during generation.
pub const TREE_DENSITY: f64 = 0.005;
/// Columns closer than this to the world edge never get a tree.
const EDGE_MARGIN: i32 = 2;
/// Crown cells satisfy sqrt(dx² + 2·dy² + dz²) <= this radius.
const CROWN_RADIUS: f64 = 2.5;

/// Grows a tree whose trunk starts at `base`.
///
/// # Returns
/// Every position the tree wrote to, trunk first.
pub fn grow_tree(grid: &mut VoxelGrid, rng: &mut fastrand::Rng, base: Point3<i32>) -> Vec<Point3<i32>> {
    let height = rng.i32(4..=6);
    let mut written = Vec::new();

    for dy in 0..height {
        let position = Point3::new(base.x, base.y + dy, base.z);
        if grid.set_at(position, BlockType::WOOD) {
            written.push(position);
        }
    }

    let top_y = base.y + height;
    for dx in -2..=2 {
        for dy in -1..=1 {
            for dz in -2..=2 {
                let distance = ((dx * dx + 2 * dy * dy + dz * dz) as f64).sqrt();
                if distance > CROWN_RADIUS {
                    continue;
                }
                let position = Point3::new(base.x + dx, top_y + dy, base.z + dz);
                if grid.get_at(position) == BlockType::WOOD {
                    continue;
                }
                if grid.set_at(position, BlockType::LEAVES) {
                    written.push(position);
                }
            }
        }
    }

    written
}

/// Scatters trees over the grass columns of a generated world.
///
/// # Returns
/// The number of trees grown.
pub fn place_trees(grid: &mut VoxelGrid, rng: &mut fastrand::Rng) -> usize {
    let dims = grid.dimensions();
    let mut trees = 0;

    for x in EDGE_MARGIN..dims.size_x - EDGE_MARGIN {
        for z in EDGE_MARGIN..dims.size_z - EDGE_MARGIN {
            if rng.f64() >= TREE_DENSITY {
                continue;
            }
            let y = grid.surface_y(x, z);
            if grid.get(x, y - 1, z) == BlockType::GRASS {
                grow_tree(grid, rng, Point3::new(x, y, z));
                trees += 1;
            }
        }
    }

    trees
}
