//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Meshes one chunk against the shared grid

pub mod chunk_mesh_generation_task;

pub use chunk_mesh_generation_task::ChunkMeshGenerationTask;
