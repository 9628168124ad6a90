//! Transparency policies for face culling.
//!
//! Which blocks count as see-through is a rendering policy, not a property of
//! the grid, so the mesher takes it as a parameter. A face is emitted whenever
//! the neighbouring cell is transparent under the active policy.

use crate::engine_state::voxels::block::block_type::BlockType;

/// Decides whether a neighbouring block exposes the face next to it.
pub trait TransparencyPredicate: Send + Sync {
    fn is_transparent(&self, block: BlockType) -> bool;
}

impl<F> TransparencyPredicate for F
where
    F: Fn(BlockType) -> bool + Send + Sync,
{
    fn is_transparent(&self, block: BlockType) -> bool {
        self(block)
    }
}

/// Only air exposes faces. Lava, leaves and saplings are culled like opaque
/// cubes, so a sapling hides the faces of the blocks next to it.
#[derive(Copy, Clone, Debug, Default)]
pub struct AirOnly;

impl TransparencyPredicate for AirOnly {
    fn is_transparent(&self, block: BlockType) -> bool {
        block.is_air()
    }
}

/// Air, lava, leaves and saplings expose faces, so solids behind them stay visible.
#[derive(Copy, Clone, Debug, Default)]
pub struct SeeThroughFoliage;

impl TransparencyPredicate for SeeThroughFoliage {
    fn is_transparent(&self, block: BlockType) -> bool {
        matches!(
            block,
            BlockType::AIR | BlockType::LAVA | BlockType::LEAVES | BlockType::SAPLING
        )
    }
}
