use std::fmt;
use std::str::FromStr;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::WorldError;

/// Integer grid position of a block slot.
///
/// Blocks are unit cubes centred on their integer position, so the cube at
/// `(x, y, z)` spans `[x - 0.5, x + 0.5)` on each axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The slot directly above this one, or `None` at the top of the grid.
    pub const fn above(self) -> Option<Self> {
        match self.y.checked_add(1) {
            Some(y) => Some(Self::new(self.x, y, self.z)),
            None => None,
        }
    }

    /// The slot directly below this one, or `None` at the bottom of the grid.
    pub const fn below(self) -> Option<Self> {
        match self.y.checked_sub(1) {
            Some(y) => Some(Self::new(self.x, y, self.z)),
            None => None,
        }
    }

    /// `None` if any component leaves the `i32` grid.
    pub fn offset(self, delta: IVec3) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(delta.x)?,
            self.y.checked_add(delta.y)?,
            self.z.checked_add(delta.z)?,
        ))
    }

    /// The slot whose cube contains `point`.
    pub fn containing(point: Vec3) -> Self {
        let p = (point + Vec3::splat(0.5)).floor();
        Self::new(p.x as i32, p.y as i32, p.z as i32)
    }

    /// Floors each component. For callers holding integer-valued floats
    /// (e.g. a picked mesh position) this is the exact key.
    pub fn floored(coords: [f32; 3]) -> Self {
        Self::new(
            coords[0].floor() as i32,
            coords[1].floor() as i32,
            coords[2].floor() as i32,
        )
    }

    /// World-space centre of the slot.
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The closed set of placeable block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
    Grass,
    Dirt,
    Log,
    Leaves,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [Self::Grass, Self::Dirt, Self::Log, Self::Leaves];

    /// Upper-case identifier used by placement callers and config files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Grass => "GRASS",
            Self::Dirt => "DIRT",
            Self::Log => "LOG",
            Self::Leaves => "LEAVES",
        }
    }

    /// Whether this type takes part in the grass/dirt cycle.
    pub fn has_transitions(self) -> bool {
        matches!(self, Self::Grass | Self::Dirt)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WorldError::UnknownBlockType(s.to_owned()))
    }
}

/// Opaque reference to a renderable owned by exactly one block.
///
/// Handles are issued by the scene collaborator; the world only stores and
/// returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_differ_only_in_y() {
        let p = BlockPos::new(3, 0, -7);
        assert_eq!(p.above(), Some(BlockPos::new(3, 1, -7)));
        assert_eq!(p.below(), Some(BlockPos::new(3, -1, -7)));
        assert_eq!(p.above().and_then(BlockPos::below), Some(p));
    }

    #[test]
    fn neighbours_stop_at_grid_edge() {
        assert_eq!(BlockPos::new(0, i32::MAX, 0).above(), None);
        assert_eq!(BlockPos::new(0, i32::MIN, 0).below(), None);
        assert_eq!(BlockPos::new(i32::MAX, 0, 0).offset(IVec3::X), None);
        assert_eq!(
            BlockPos::new(i32::MAX, 0, 0).offset(IVec3::NEG_X),
            Some(BlockPos::new(i32::MAX - 1, 0, 0))
        );
    }

    #[test]
    fn containing_rounds_to_cube_centre() {
        assert_eq!(BlockPos::containing(Vec3::new(0.4, 0.0, -0.4)), BlockPos::ORIGIN);
        assert_eq!(BlockPos::containing(Vec3::new(0.5, 1.49, -0.51)), BlockPos::new(1, 1, -1));
    }

    #[test]
    fn floored_handles_negatives() {
        assert_eq!(BlockPos::floored([2.0, 0.0, -3.0]), BlockPos::new(2, 0, -3));
        assert_eq!(BlockPos::floored([-0.5, 1.9, 0.1]), BlockPos::new(-1, 1, 0));
    }

    #[test]
    fn positions_order_by_x_then_y_then_z() {
        let mut v = vec![
            BlockPos::new(1, 0, 0),
            BlockPos::new(0, 2, 0),
            BlockPos::new(0, 1, 5),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                BlockPos::new(0, 1, 5),
                BlockPos::new(0, 2, 0),
                BlockPos::new(1, 0, 0)
            ]
        );
    }

    #[test]
    fn block_type_parses_case_insensitively() {
        assert_eq!("GRASS".parse::<BlockType>().unwrap(), BlockType::Grass);
        assert_eq!("leaves".parse::<BlockType>().unwrap(), BlockType::Leaves);
        assert_eq!(" Log ".parse::<BlockType>().unwrap(), BlockType::Log);
    }

    #[test]
    fn unknown_block_type_is_an_error() {
        let err = "STONE".parse::<BlockType>().unwrap_err();
        assert!(matches!(err, WorldError::UnknownBlockType(ref n) if n == "STONE"));
        assert!(err.to_string().contains("STONE"));
    }

    #[test]
    fn block_type_serializes_as_identifier() {
        let json = serde_json::to_string(&BlockType::Leaves).unwrap();
        assert_eq!(json, "\"LEAVES\"");
        let back: BlockType = serde_json::from_str("\"DIRT\"").unwrap();
        assert_eq!(back, BlockType::Dirt);
    }

    #[test]
    fn only_grass_and_dirt_transition() {
        let cycling: Vec<_> = BlockType::ALL
            .into_iter()
            .filter(|t| t.has_transitions())
            .collect();
        assert_eq!(cycling, vec![BlockType::Grass, BlockType::Dirt]);
    }
}
