use std::time::Duration;

use blockfield_common::WorldError;
use serde::{Deserialize, Serialize};

/// When the world re-evaluates grass decay and dirt growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// After a block is added at `p`, check `p` and the block below `p`.
    /// After a block is removed at `p`, check the block below `p`.
    #[default]
    NeighborDriven,
    /// Never check automatically; callers drive `World::check_block`.
    Manual,
}

/// Dimensions of the starting floor and its enclosing leaf wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: i32,
    pub depth: i32,
    pub wall_height: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 32,
            depth: 32,
            wall_height: 3,
        }
    }
}

/// World configuration: chunking, timer delays and starting terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length (in blocks) of a horizontal chunk.
    pub chunk_size: i32,
    /// How long grass must stay covered before it turns to dirt.
    pub decay_delay_ms: u64,
    /// How long dirt must stay exposed before it turns to grass.
    pub growth_delay_ms: u64,
    pub transitions: TransitionPolicy,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            decay_delay_ms: 2345,
            growth_delay_ms: 3000,
            transitions: TransitionPolicy::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn decay_delay(&self) -> Duration {
        Duration::from_millis(self.decay_delay_ms)
    }

    pub fn growth_delay(&self) -> Duration {
        Duration::from_millis(self.growth_delay_ms)
    }

    /// Reject settings the world cannot run with.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.chunk_size <= 0 {
            return Err(WorldError::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        let t = &self.terrain;
        if t.width < 0 || t.depth < 0 || t.wall_height < 0 {
            return Err(WorldError::InvalidConfig(format!(
                "terrain dimensions must not be negative, got {}x{} with wall height {}",
                t.width, t.depth, t.wall_height
            )));
        }
        Ok(())
    }
}
