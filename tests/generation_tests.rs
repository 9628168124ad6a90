//! Integration tests for world generation.

use blockworld_engine::config::WorldDimensions;
use blockworld_engine::engine_state::voxels::{
    block::block_type::BlockType,
    generation::{GenerationStats, TerrainGenerator, DEFAULT_ORES},
    grid::VoxelGrid,
};

fn dims() -> WorldDimensions {
    WorldDimensions {
        size_x: 48,
        size_y: 301,
        size_z: 48,
        min_y: -200,
    }
}

fn generate(seed: u64) -> (VoxelGrid, GenerationStats) {
    let mut grid = VoxelGrid::new(dims());
    let stats = TerrainGenerator::new(seed, 0).generate(&mut grid);
    (grid, stats)
}

fn count(grid: &VoxelGrid, block: BlockType) -> usize {
    grid.as_bytes().iter().filter(|&&code| code == block.code()).count()
}

#[test]
fn test_same_seed_gives_identical_worlds() {
    let (first, first_stats) = generate(42);
    let (second, second_stats) = generate(42);
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first_stats, second_stats);
}

#[test]
fn test_different_seeds_give_different_worlds() {
    let (first, _) = generate(1);
    let (second, _) = generate(2);
    assert_ne!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_bottom_layers_are_lava() {
    let (grid, _) = generate(7);
    let dims = grid.dimensions();
    for x in 0..dims.size_x {
        for z in 0..dims.size_z {
            for y in dims.min_y..-190 {
                assert_eq!(grid.get(x, y, z), BlockType::LAVA, "at ({}, {}, {})", x, y, z);
            }
            assert_ne!(grid.get(x, -190, z), BlockType::LAVA);
        }
    }
}

#[test]
fn test_ores_stay_near_their_bands() {
    let (grid, stats) = generate(3);
    assert!(stats.veins > 0);
    let dims = grid.dimensions();

    for ore in DEFAULT_ORES {
        let reach = ore.cluster_size as i32;
        for y in dims.min_y..=dims.max_y() {
            for z in 0..dims.size_z {
                for x in 0..dims.size_x {
                    if grid.get(x, y, z) == ore.block {
                        assert!(y >= -190, "{:?} in the lava layer at y {}", ore.block, y);
                        assert!(y >= ore.min_y - reach && y < ore.max_y + reach);
                    }
                }
            }
        }
    }
    assert!(count(&grid, BlockType::COAL_ORE) > 0);
}

#[test]
fn test_trunks_match_tree_count() {
    let mut trees = 0;
    let mut wood = 0;
    for seed in 1..=3 {
        let (grid, stats) = generate(seed);
        trees += stats.trees;
        wood += count(&grid, BlockType::WOOD);
    }
    assert!(trees > 0);
    assert!(wood >= 4 * trees && wood <= 6 * trees);
}

#[test]
fn test_surface_y_is_one_above_the_top_block() {
    let (grid, _) = generate(11);
    for (x, z) in [(0, 0), (10, 30), (47, 47), (24, 5)] {
        let y = grid.surface_y(x, z);
        assert!(!grid.get(x, y - 1, z).is_air());
        assert!((y..=grid.dimensions().max_y()).all(|top| grid.get(x, top, z).is_air()));
    }
}
