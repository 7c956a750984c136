/// Errors surfaced to world callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("unknown block type {0:?} (expected GRASS, DIRT, LOG or LEAVES)")]
    UnknownBlockType(String),
    #[error("invalid world config: {0}")]
    InvalidConfig(String),
}
