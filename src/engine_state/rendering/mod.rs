//! Renderer-facing side of the engine.
//!
//! The engine does not own a GPU backend. It produces per-chunk geometry
//! grouped by material and a stream of [`RenderCommand`]s; whatever draws the
//! world consumes both.
//!
//! * `materials` - Material selector per block type and side
//! * `meshing` - Chunk geometry from grid contents
//! * `streaming` - Which chunks are loaded and visible
//! * `tasks` - Off-thread meshing

pub mod materials;
pub mod meshing;
pub mod streaming;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use materials::{MaterialSelector, MaterialTable};
pub use streaming::{ChunkStreamer, MeshRequest, RenderCommand};
pub use vertex::Vertex;
