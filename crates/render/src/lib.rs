//! Rendering Adapter: scene collaborators for the block world.
//!
//! # Invariants
//! - Renderers read world state; they never mutate it.
//! - The mesh registry holds exactly one mesh per live visual handle.
//!
//! # Workaround
//! Provides a mesh registry that records what a GPU scene would build for
//! each block, plus a top-down text renderer, in place of a real render
//! backend.

mod mesh;
mod renderer;

pub use mesh::{MaterialSpec, MeshInstance, MeshRegistry};
pub use renderer::{RenderView, Renderer, TopDownRenderer};

pub fn crate_info() -> &'static str {
    "blockfield-render v0.1.0"
}
