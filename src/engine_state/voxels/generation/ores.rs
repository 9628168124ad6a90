//! Ore vein seeding.
//!
//! Each ore kind gets a number of random draws proportional to the volume of
//! its height band. A draw that lands on stone starts a short random walk; the
//! walk converts the cells it visits into ore, but only cells that are still
//! stone, so veins never eat into lava, air, soil or other ores.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{block::block_type::BlockType, grid::VoxelGrid};

/// Placement rules for one ore kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OreParameters {
    /// The ore block placed by veins.
    pub block: BlockType,
    /// Lowest world Y a vein may be seeded at (inclusive).
    pub min_y: i32,
    /// Highest world Y a vein may be seeded at (exclusive).
    pub max_y: i32,
    /// Fraction of the band volume that is drawn as seed attempts.
    pub scarcity: f64,
    /// Veins walk between 2 and `cluster_size + 1` steps.
    pub cluster_size: u32,
}

impl OreParameters {
    /// Number of seed attempts for a world of the given footprint.
    pub fn attempts(&self, size_x: i32, size_z: i32) -> u64 {
        let band = (self.max_y - self.min_y).max(0) as f64;
        (size_x.max(0) as f64 * band * size_z.max(0) as f64 * self.scarcity).floor() as u64
    }
}

/// The ore kinds of the default world, from most to least common.
pub const DEFAULT_ORES: [OreParameters; 4] = [
    OreParameters {
        block: BlockType::COAL_ORE,
        min_y: -180,
        max_y: 80,
        scarcity: 0.015,
        cluster_size: 8,
    },
    OreParameters {
        block: BlockType::IRON_ORE,
        min_y: -150,
        max_y: 40,
        scarcity: 0.01,
        cluster_size: 6,
    },
    OreParameters {
        block: BlockType::GOLD_ORE,
        min_y: -200,
        max_y: 10,
        scarcity: 0.005,
        cluster_size: 4,
    },
    OreParameters {
        block: BlockType::TITANIUM_ORE,
        min_y: -200,
        max_y: -50,
        scarcity: 0.003,
        cluster_size: 3,
    },
];

/// Seeds every vein of one ore kind.
///
/// # Returns
/// The number of draws that landed on stone and started a vein.
pub fn seed_ore(grid: &mut VoxelGrid, rng: &mut fastrand::Rng, ore: &OreParameters) -> u64 {
    let dims = grid.dimensions();
    if ore.max_y <= ore.min_y || dims.size_x <= 0 || dims.size_z <= 0 {
        return 0;
    }

    let mut veins = 0;
    for _ in 0..ore.attempts(dims.size_x, dims.size_z) {
        let start = Point3::new(
            rng.i32(0..dims.size_x),
            rng.i32(ore.min_y..ore.max_y),
            rng.i32(0..dims.size_z),
        );
        if grid.get_at(start) == BlockType::STONE {
            carve_vein(grid, rng, start, ore);
            veins += 1;
        }
    }
    veins
}

/// Walks a single vein from `start`, turning stone into ore.
pub fn carve_vein(
    grid: &mut VoxelGrid,
    rng: &mut fastrand::Rng,
    start: Point3<i32>,
    ore: &OreParameters,
) {
    let steps = rng.u32(0..ore.cluster_size.max(1)) + 2;
    let mut cursor = start;
    for _ in 0..steps {
        if grid.get_at(cursor) == BlockType::STONE {
            grid.set_at(cursor, ore.block);
        }
        cursor = cursor + Vector3::new(rng.i32(-1..=1), rng.i32(-1..=1), rng.i32(-1..=1));
    }
}
