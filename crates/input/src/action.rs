use std::time::Duration;

use blockfield_common::{BlockPos, BlockType};
use blockfield_kernel::{RayHit, Scene, World};
use serde::{Deserialize, Serialize};

/// Pointer buttons relevant to block editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Breaks the picked block.
    Primary,
    /// Places a block against the picked face.
    Secondary,
}

/// A high-level world edit. Scripts and pointer input both produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Place { position: BlockPos, block: BlockType },
    Remove { position: BlockPos },
    /// Let simulated time pass.
    Advance { millis: u64 },
    Noop,
}

/// What applying an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Placed(bool),
    Removed(Option<BlockType>),
    Advanced { transitions: usize },
    Nothing,
}

impl Action {
    /// Map a pointer click on a picked block to an edit. The secondary button
    /// places `held` in the slot in front of the struck face.
    pub fn from_pick(button: PointerButton, hit: Option<&RayHit>, held: BlockType) -> Self {
        let Some(hit) = hit else {
            return Self::Noop;
        };
        match button {
            PointerButton::Primary => Self::Remove {
                position: hit.position,
            },
            // A ray starting inside a block has no face to build against.
            PointerButton::Secondary if hit.normal == glam::IVec3::ZERO => Self::Noop,
            PointerButton::Secondary => match hit.adjacent() {
                Some(position) => Self::Place {
                    position,
                    block: held,
                },
                None => Self::Noop,
            },
        }
    }

    pub fn apply<S: Scene>(self, world: &mut World<S>) -> ActionOutcome {
        tracing::debug!(action = ?self, "applying action");
        match self {
            Self::Place { position, block } => ActionOutcome::Placed(world.add_block(block, position)),
            Self::Remove { position } => ActionOutcome::Removed(world.remove_block(position)),
            Self::Advance { millis } => ActionOutcome::Advanced {
                transitions: world.advance(Duration::from_millis(millis)),
            },
            Self::Noop => ActionOutcome::Nothing,
        }
    }
}
