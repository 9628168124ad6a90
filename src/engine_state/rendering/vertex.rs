//! Vertex data structures for voxel geometry.
//!
//! This module defines the vertex format produced by the chunk mesher. The
//! layout is `#[repr(C)]` and `Pod`, so a batch's vertex slice can be handed
//! to any GPU backend as raw bytes.

use bytemuck::{Pod, Zeroable};

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Outward unit normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// UV texture coordinates, spanning [0, 1] across a face
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Vertex {
            position,
            normal,
            tex_coords,
        }
    }

    /// Views a vertex slice as raw bytes for upload.
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}
