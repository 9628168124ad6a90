//! # Materials
//!
//! The rendering collaborator decides which texture/material each face uses.
//! The mesher only needs a stable selector per (block type, face side), which
//! it uses to group faces into batches.

use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// Opaque identifier of a material, as understood by the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialSelector(pub u16);

/// Number of block types, and therefore rows in the material table.
const NUM_BLOCK_TYPES: usize = BlockType::ALL.len();

/// Maps each block type to its material selector for each face.
///
/// The outer array is indexed by the block code.
/// The inner array contains 6 selectors, one for each face in the order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_MATERIAL_INDICES: [[u16; 6]; NUM_BLOCK_TYPES] = [
    [0, 0, 0, 0, 0, 0],       // AIR (never meshed)
    [2, 2, 1, 3, 2, 2],       // GRASS (top: 3, bottom: dirt, sides: 2)
    [1, 1, 1, 1, 1, 1],       // DIRT
    [4, 4, 4, 4, 4, 4],       // STONE
    [5, 5, 5, 5, 5, 5],       // LAVA
    [6, 6, 6, 6, 6, 6],       // SAND
    [7, 7, 7, 7, 7, 7],       // COAL_ORE
    [8, 8, 8, 8, 8, 8],       // IRON_ORE
    [9, 9, 9, 9, 9, 9],       // GOLD_ORE
    [10, 10, 10, 10, 10, 10], // TITANIUM_ORE
    [11, 11, 12, 12, 11, 11], // WOOD (rings on top and bottom, bark on sides)
    [13, 13, 13, 13, 13, 13], // LEAVES
    [14, 14, 14, 14, 14, 14], // SAPLING
];

/// Materials the renderer should draw in its translucent pass: lava, leaves
/// and saplings.
///
/// Saplings are still meshed as full cubes. Under the default air-only
/// transparency they cull their neighbours' faces like any solid block.
const DEFAULT_TRANSLUCENT: [u16; 3] = [5, 13, 14];

/// Selector lookup table handed to the mesher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTable {
    /// Selector per block code and side, in `BlockSide` order.
    selectors: Vec<[MaterialSelector; 6]>,
    /// Selectors whose geometry is see-through (lava, leaves, saplings).
    translucent: Vec<MaterialSelector>,
}

impl MaterialTable {
    /// Builds a table from explicit rows, one per block code.
    pub fn new(selectors: Vec<[MaterialSelector; 6]>, translucent: Vec<MaterialSelector>) -> Self {
        MaterialTable {
            selectors,
            translucent,
        }
    }

    /// The selector for one side of a block type.
    ///
    /// Block types without a row fall back to selector 0.
    pub fn selector(&self, block: BlockType, side: BlockSide) -> MaterialSelector {
        self.selectors
            .get(block.code() as usize)
            .map_or(MaterialSelector(0), |row| row[side as usize])
    }

    /// Whether faces using this material belong in the translucent render pass.
    pub fn is_translucent(&self, selector: MaterialSelector) -> bool {
        self.translucent.contains(&selector)
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        MaterialTable {
            selectors: BLOCK_TYPE_TO_MATERIAL_INDICES
                .iter()
                .map(|row| row.map(MaterialSelector))
                .collect(),
            translucent: DEFAULT_TRANSLUCENT.iter().copied().map(MaterialSelector).collect(),
        }
    }
}
