//! Developer Tooling: world inspector and read-only block queries.
//!
//! # Invariants
//! - Tools never mutate the world.

mod inspector;

pub use inspector::{BlockInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "blockfield-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
