//! # World Generation
//!
//! This module populates an empty voxel grid from a seed, in three passes:
//!
//! 1. **Terrain**: a noise heightmap decides every column's surface; columns
//!    are filled with lava, stone, soil and a grass or sand cap.
//! 2. **Ores**: random-walk veins are carved into the stone.
//! 3. **Trees**: trunks and crowns are placed on grass.
//!
//! Generation is deterministic: a single `fastrand::Rng` seeded from the world
//! seed drives every random choice, and the noise seed is derived from the
//! same value. Running it twice with one seed produces byte-identical grids.

use log::info;
use web_time::Instant;

use super::grid::VoxelGrid;

pub mod ores;
pub mod terrain;
pub mod trees;

pub use ores::{OreParameters, DEFAULT_ORES};
pub use terrain::Heightmap;

/// Summary of a generation run, for logging and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Veins started across all ore kinds.
    pub veins: u64,
    /// Trees grown.
    pub trees: usize,
}

/// Deterministic world generator.
pub struct TerrainGenerator {
    seed: u64,
    sea_level: i32,
    ores: Vec<OreParameters>,
}

impl TerrainGenerator {
    /// Creates a generator with the default ore table.
    pub fn new(seed: u64, sea_level: i32) -> Self {
        TerrainGenerator {
            seed,
            sea_level,
            ores: DEFAULT_ORES.to_vec(),
        }
    }

    /// Replaces the ore table.
    pub fn with_ores(mut self, ores: Vec<OreParameters>) -> Self {
        self.ores = ores;
        self
    }

    /// Folds the 64-bit world seed into the 32-bit noise seed.
    fn noise_seed(&self) -> u32 {
        (self.seed ^ (self.seed >> 32)) as u32
    }

    /// Populates every column of `grid`.
    ///
    /// The grid is expected to be freshly allocated (all air).
    pub fn generate(&self, grid: &mut VoxelGrid) -> GenerationStats {
        let start_time = Instant::now();
        let dims = grid.dimensions();
        let heightmap = Heightmap::new(self.noise_seed(), self.sea_level);
        let mut rng = fastrand::Rng::with_seed(self.seed);

        for x in 0..dims.size_x {
            for z in 0..dims.size_z {
                heightmap.fill_column(grid, x, z);
            }
        }

        let veins = self
            .ores
            .iter()
            .map(|ore| ores::seed_ore(grid, &mut rng, ore))
            .sum();

        let trees = trees::place_trees(grid, &mut rng);

        // Generation writes never count as player-exposed soil.
        grid.drain_exposed_soil();

        let stats = GenerationStats { veins, trees };
        info!(
            "Generated {}x{}x{} world (seed {}): {} veins, {} trees in {:?}",
            dims.size_x,
            dims.size_y,
            dims.size_z,
            self.seed,
            stats.veins,
            stats.trees,
            start_time.elapsed()
        );
        stats
    }
}
