//! Placement input: pointer picks and scripted commands mapped to actions.
//!
//! # Invariants
//! - The world only ever sees actions, never raw pointer events.
//! - Every action is applied through the world's public mutators.

pub mod action;

pub use action::{Action, ActionOutcome, PointerButton};

pub fn crate_info() -> &'static str {
    "blockfield-input v0.1.0"
}
