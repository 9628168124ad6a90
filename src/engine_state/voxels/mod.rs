//! # Voxel Data
//!
//! Everything that describes the contents of the world, independent of how it
//! is drawn.
//!
//! ## Architecture
//!
//! * **Block**: Block codes and the six block sides
//! * **Grid**: The dense, bounds-checked store of every block in the world
//! * **Chunk**: Chunk coordinates and the per-chunk streaming state
//! * **Generation**: Deterministic terrain, ore and tree placement
//! * **World processes**: Timer-driven changes such as regrowing grass
//!
//! ## Data Flow
//!
//! 1. Generation fills the grid once
//! 2. Edits and world processes write single cells of the grid
//! 3. Each write is fanned out to the chunks whose geometry depends on it
//! 4. Chunks are re-meshed from the grid, never from a copy

pub mod block;
pub mod chunk;
pub mod generation;
pub mod grid;
pub mod world_processes;
