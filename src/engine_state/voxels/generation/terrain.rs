//! Heightmap terrain shaping.
//!
//! Four octaves of 2D Perlin noise are summed per column to get an elevation
//! in [-1, 1]. Cubing the elevation keeps its sign but flattens most of the
//! map, leaving occasional sharp relief.

use noise::{NoiseFn, Perlin};

use crate::engine_state::voxels::{block::block_type::BlockType, grid::VoxelGrid};

/// (scale divisor, weight) of each octave, from broadest to finest.
const OCTAVES: [(f64, f64); 4] = [(250.0, 1.0), (90.0, 0.4), (40.0, 0.2), (15.0, 0.1)];

/// Height of the average surface above sea level.
const BASE_HEIGHT: f64 = 30.0;
/// Vertical range of the cubed elevation.
const RELIEF: f64 = 50.0;
/// Below this world Y everything is lava.
pub const LAVA_CEILING: i32 = -190;
/// Number of soil layers above the stone.
const SOIL_DEPTH: f64 = 4.0;
/// Surfaces lower than `sea_level + BEACH_HEIGHT` are sand instead of soil.
const BEACH_HEIGHT: f64 = 2.0;

/// Samples the noise stack for terrain height.
pub struct Heightmap {
    perlin: Perlin,
    sea_level: f64,
}

impl Heightmap {
    pub fn new(noise_seed: u32, sea_level: i32) -> Self {
        Heightmap {
            perlin: Perlin::new(noise_seed),
            sea_level: sea_level as f64,
        }
    }

    /// Normalised elevation of a column, in [-1, 1].
    pub fn elevation(&self, x: i32, z: i32) -> f64 {
        let total_weight: f64 = OCTAVES.iter().map(|(_, weight)| weight).sum();
        let sum: f64 = OCTAVES
            .iter()
            .map(|&(scale, weight)| {
                self.perlin.get([x as f64 / scale, z as f64 / scale]) * weight
            })
            .sum();
        (sum / total_weight).clamp(-1.0, 1.0)
    }

    /// Continuous surface height of a column.
    pub fn surface_height(&self, x: i32, z: i32) -> f64 {
        self.sea_level + BASE_HEIGHT + self.elevation(x, z).powi(3) * RELIEF
    }

    /// Fills one column of the grid from the floor up to its surface.
    pub fn fill_column(&self, grid: &mut VoxelGrid, x: i32, z: i32) {
        let height = self.surface_height(x, z);
        let beach = height < self.sea_level + BEACH_HEIGHT;
        let soil = if beach { BlockType::SAND } else { BlockType::DIRT };
        let dims = grid.dimensions();

        let mut y = dims.min_y;
        while (y as f64) < height && y <= dims.max_y() {
            let block = if y < LAVA_CEILING {
                BlockType::LAVA
            } else if (y as f64) < height - SOIL_DEPTH {
                BlockType::STONE
            } else {
                soil
            };
            grid.set(x, y, z, block);
            y += 1;
        }

        if height >= self.sea_level {
            let cap = if beach { BlockType::SAND } else { BlockType::GRASS };
            grid.set(x, height.floor() as i32, z, cap);
        }
    }
}
