//! World Kernel: authoritative block set, chunk index, collision list and
//! the grass/dirt timers that drive autonomous transitions.
//!
//! # Invariants
//! - All block mutations flow through `World::add_block` / `remove_block` /
//!   `replace_block`.
//! - After every mutating call the block map, chunk index, collision list and
//!   pending timers agree (`World::check_invariants`).
//! - A disposed block never has a timer left in the scheduler.

pub mod block;
pub mod chunk;
pub mod collision;
pub mod config;
pub mod query;
pub mod scene;
pub mod scheduler;
pub mod world;

pub use block::{Block, CheckOutcome};
pub use chunk::{ChunkCoord, ChunkIndex};
pub use collision::CollisionList;
pub use config::{TerrainConfig, TransitionPolicy, WorldConfig};
pub use query::RayHit;
pub use scene::{HeadlessScene, Scene};
pub use scheduler::{Scheduler, Timer, TimerId, TimerKind};
pub use world::{InvariantViolation, World, WorldEvent};
