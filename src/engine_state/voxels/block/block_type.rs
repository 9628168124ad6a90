//! # Block Type Module
//!
//! This module defines the different kinds of blocks in the voxel world and
//! their compact integer codes. The codes are what the voxel grid stores and
//! what a save file contains, so they must never be renumbered.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// Each variant carries an explicit discriminant that doubles as its storage
/// code. The `FromPrimitive` derive allows conversion back from the stored
/// integer, which is how grid reads decode cells.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Always code zero.
    AIR = 0,

    /// A dirt block capped with grass. Top, sides and bottom use different textures.
    GRASS = 1,

    /// Plain dirt, found in the few layers below the surface.
    DIRT = 2,

    /// The bulk of the underground.
    STONE = 3,

    /// Molten floor of the world. Not solid for collision.
    LAVA = 4,

    /// Beach material used near sea level.
    SAND = 5,

    /// Most common ore.
    COAL_ORE = 6,

    /// Mid-depth ore.
    IRON_ORE = 7,

    /// Deep, scarce ore.
    GOLD_ORE = 8,

    /// Deepest and rarest ore.
    TITANIUM_ORE = 9,

    /// Tree trunk.
    WOOD = 10,

    /// Tree crown.
    LEAVES = 11,

    /// A planted sapling that grows into a tree over time.
    SAPLING = 12,
}

impl BlockType {
    /// Every block type, in code order.
    pub const ALL: [BlockType; 13] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::LAVA,
        BlockType::SAND,
        BlockType::COAL_ORE,
        BlockType::IRON_ORE,
        BlockType::GOLD_ORE,
        BlockType::TITANIUM_ORE,
        BlockType::WOOD,
        BlockType::LEAVES,
        BlockType::SAPLING,
    ];

    /// Decodes a stored code.
    ///
    /// # Returns
    /// `None` if the code does not correspond to any known block type.
    pub fn from_code(code: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(code)
    }

    /// The compact storage code of this block type.
    pub fn code(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this is the empty block.
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Whether a moving body should collide with this block.
    ///
    /// Everything except air and lava is solid for collision purposes.
    pub fn is_solid_for_collision(self) -> bool {
        !matches!(self, BlockType::AIR | BlockType::LAVA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for block in BlockType::ALL {
            assert_eq!(BlockType::from_code(block.code()), Some(block));
        }
        assert_eq!(BlockType::from_code(200), None);
    }

    #[test]
    fn air_is_zero() {
        assert_eq!(BlockType::AIR.code(), 0);
    }

    #[test]
    fn lava_and_air_do_not_collide() {
        assert!(!BlockType::AIR.is_solid_for_collision());
        assert!(!BlockType::LAVA.is_solid_for_collision());
        assert!(BlockType::STONE.is_solid_for_collision());
        assert!(BlockType::LEAVES.is_solid_for_collision());
    }
}
