//! Property tests for the voxel grid and chunk coordinate mapping.

use blockworld_engine::config::WorldDimensions;
use blockworld_engine::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::ChunkLayout,
    grid::VoxelGrid,
};
use cgmath::Point3;
use proptest::prelude::*;

const DIMS: WorldDimensions = WorldDimensions {
    size_x: 16,
    size_y: 20,
    size_z: 12,
    min_y: -5,
};

fn block() -> impl Strategy<Value = BlockType> {
    (0..BlockType::ALL.len()).prop_map(|i| BlockType::ALL[i])
}

proptest! {
    #[test]
    fn set_then_get_returns_the_block(
        x in 0..DIMS.size_x,
        y in DIMS.min_y..=DIMS.max_y(),
        z in 0..DIMS.size_z,
        b in block(),
    ) {
        let mut grid = VoxelGrid::new(DIMS);
        prop_assert!(grid.set(x, y, z, b));
        prop_assert_eq!(grid.get(x, y, z), b);
    }

    #[test]
    fn out_of_range_writes_are_ignored(
        x in prop_oneof![-40i32..40, any::<i32>()],
        y in prop_oneof![-40i32..40, any::<i32>()],
        z in prop_oneof![-40i32..40, any::<i32>()],
        b in block(),
    ) {
        prop_assume!(!(0..DIMS.size_x).contains(&x)
            || !(DIMS.min_y..=DIMS.max_y()).contains(&y)
            || !(0..DIMS.size_z).contains(&z));

        let mut grid = VoxelGrid::new(DIMS);
        let before = grid.as_bytes().to_vec();
        prop_assert!(!grid.set(x, y, z, b));
        prop_assert_eq!(grid.as_bytes(), &before[..]);
        prop_assert_eq!(grid.get(x, y, z), BlockType::AIR);
    }

    #[test]
    fn chunk_and_local_recompose_the_position(
        x in -1000i32..1000,
        y in -300i32..300,
        z in -1000i32..1000,
        size in 1i32..40,
    ) {
        let layout = ChunkLayout::new(size, -200);
        let key = layout.chunk_of(x, y, z);
        let local = layout.local_of(x, y, z);
        prop_assert!((0..size).contains(&local.x));
        prop_assert!((0..size).contains(&local.y));
        prop_assert!((0..size).contains(&local.z));
        prop_assert_eq!(layout.origin_of(key) + local, Point3::new(x, y, z));
    }
}

proptest! {
    #[test]
    fn chunk_mapping_never_overflows(
        x in any::<i32>(),
        y in any::<i32>(),
        z in any::<i32>(),
        size in 1i32..64,
        min_y in any::<i32>(),
    ) {
        let layout = ChunkLayout::new(size, min_y);
        let local = layout.local_of(x, y, z);
        prop_assert!((0..size).contains(&local.y));
        let keys = layout.chunks_touching(x, y, z);
        prop_assert_eq!(keys[0], layout.chunk_of(x, y, z));
    }
}

#[test]
fn extreme_coordinates_read_air_and_ignore_writes() {
    let mut grid = VoxelGrid::new(DIMS);
    for (x, y, z) in [(0, i32::MAX, 0), (0, i32::MAX - 1, 0), (i32::MIN, i32::MIN, i32::MIN)] {
        assert_eq!(grid.get(x, y, z), BlockType::AIR);
        assert!(!grid.set(x, y, z, BlockType::STONE));
    }

    let high_floor = WorldDimensions { min_y: 10, ..DIMS };
    let mut grid = VoxelGrid::new(high_floor);
    assert_eq!(grid.get(0, i32::MIN, 0), BlockType::AIR);
    assert!(!grid.set(0, i32::MIN + 1, 0, BlockType::STONE));
}

#[test]
fn negative_coordinate_lands_in_negative_chunk() {
    let layout = ChunkLayout::new(16, 0);
    assert_eq!(layout.chunk_of(-1, 0, 0).x, -1);
    assert_eq!(layout.local_of(-1, 0, 0).x, 15);
}

#[test]
fn adopted_buffer_must_match_volume() {
    assert!(VoxelGrid::from_raw(DIMS, vec![0; DIMS.volume()]).is_ok());
    assert!(VoxelGrid::from_raw(DIMS, vec![0; DIMS.volume() + 1]).is_err());
}

#[test]
fn unknown_codes_read_as_air() {
    let mut bytes = vec![0; DIMS.volume()];
    bytes[0] = 200;
    let grid = VoxelGrid::from_raw(DIMS, bytes).unwrap();
    assert_eq!(grid.get(0, DIMS.min_y, 0), BlockType::AIR);
}
