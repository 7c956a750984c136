//! Shared types for the blockfield workspace.
//!
//! # Invariants
//! - A `BlockPos` is the only identity of a block slot.
//! - The set of block types is closed; unknown names are rejected at parse time.

mod error;
mod types;

pub use error::WorldError;
pub use types::{BlockPos, BlockType, VisualHandle};
