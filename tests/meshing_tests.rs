//! Integration tests for chunk meshing.

use blockworld_engine::config::WorldDimensions;
use blockworld_engine::engine_state::rendering::meshing::ChunkMesher;
use blockworld_engine::engine_state::rendering::MaterialTable;
use blockworld_engine::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::ChunkLayout,
    grid::VoxelGrid,
};
use cgmath::Point3;

fn setup() -> (VoxelGrid, ChunkMesher) {
    let grid = VoxelGrid::new(WorldDimensions {
        size_x: 32,
        size_y: 32,
        size_z: 32,
        min_y: 0,
    });
    let mesher = ChunkMesher::with_defaults(ChunkLayout::new(16, 0));
    (grid, mesher)
}

#[test]
fn test_air_chunk_has_no_geometry() {
    let (grid, mesher) = setup();
    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    assert!(mesh.is_empty());
    assert_eq!(mesh.batches.len(), 0);
}

#[test]
fn test_single_stone_emits_six_stone_quads() {
    let (mut grid, mesher) = setup();
    grid.set(5, 5, 5, BlockType::STONE);

    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    let stone = MaterialTable::default().selector(BlockType::STONE, BlockSide::TOP);

    assert_eq!(mesh.batches.len(), 1);
    let batch = &mesh.batches[&stone];
    assert_eq!(batch.quad_count(), 6);
    assert_eq!(batch.vertices.len(), 24);
    assert_eq!(batch.indices.len(), 36);
}

#[test]
fn test_buried_block_emits_nothing() {
    let (mut grid, mesher) = setup();
    for x in 4..=6 {
        for y in 4..=6 {
            for z in 4..=6 {
                grid.set(x, y, z, BlockType::STONE);
            }
        }
    }
    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    // Only the outer surface of the 3x3x3 cube: 6 sides of 9 quads.
    assert_eq!(mesh.quad_count(), 54);
}

#[test]
fn test_faces_are_culled_across_chunk_boundaries() {
    let (mut grid, mesher) = setup();
    grid.set(15, 3, 3, BlockType::STONE);
    grid.set(16, 3, 3, BlockType::DIRT);

    let left = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    let right = mesher.mesh_chunk(&grid, Point3::new(1, 0, 0));
    assert_eq!(left.quad_count(), 5);
    assert_eq!(right.quad_count(), 5);
}

#[test]
fn test_normals_point_out_of_the_block() {
    let (mut grid, mesher) = setup();
    grid.set(8, 8, 8, BlockType::SAND);
    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));

    for batch in mesh.batches.values() {
        for quad in batch.vertices.chunks(4) {
            let normal = quad[0].normal;
            for vertex in quad {
                // Every corner of the face lies on the side the normal points to.
                for axis in 0..3 {
                    if normal[axis] > 0.0 {
                        assert_eq!(vertex.position[axis], 9.0);
                    } else if normal[axis] < 0.0 {
                        assert_eq!(vertex.position[axis], 8.0);
                    }
                }
                assert!(vertex.tex_coords.iter().all(|uv| (0.0..=1.0).contains(uv)));
            }
        }
    }
}

#[test]
fn test_meshing_is_deterministic() {
    let (mut grid, mesher) = setup();
    for i in 0..16 {
        grid.set(i, (i * 7) % 16, (i * 3) % 16, BlockType::ALL[(i as usize % 12) + 1]);
    }
    let first = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    let second = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    assert_eq!(first, second);
}

#[test]
fn test_enclosed_block_emits_no_faces() {
    let (mut grid, mesher) = setup();
    grid.set(8, 8, 8, BlockType::GOLD_ORE);
    for side in BlockSide::all() {
        let n = side.neighbour_of(Point3::new(8, 8, 8));
        grid.set(n.x, n.y, n.z, BlockType::STONE);
    }

    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));
    let gold = MaterialTable::default().selector(BlockType::GOLD_ORE, BlockSide::TOP);
    assert!(!mesh.batches.contains_key(&gold));
    // Each of the six stone neighbours shows every face but the one on the gold.
    assert_eq!(mesh.quad_count(), 30);
}

#[test]
fn test_lone_block_has_one_face_per_axis_direction() {
    let (mut grid, mesher) = setup();
    grid.set(8, 8, 8, BlockType::STONE);
    let mesh = mesher.mesh_chunk(&grid, Point3::new(0, 0, 0));

    let mut normals: Vec<[i32; 3]> = mesh
        .batches
        .values()
        .flat_map(|batch| batch.vertices.chunks(4))
        .map(|quad| quad[0].normal.map(|c| c as i32))
        .collect();
    normals.sort();
    assert_eq!(
        normals,
        vec![[-1, 0, 0], [0, -1, 0], [0, 0, -1], [0, 0, 1], [0, 1, 0], [1, 0, 0]]
    );
}
