//! Error types for the tree model

use stage::PrimPath;
use thiserror::Error;

use crate::tree::TreeIndex;

/// Recoverable failures of the adapter and tree model
///
/// None of these are fatal: callers recover by re-resolving from a path
/// string (`NotFound`, `StaleIndex`) or by rebinding the stage
/// (`StageUnavailable`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path no longer resolves in the current stage
    #[error("Prim not found: {0}")]
    NotFound(PrimPath),

    /// The index was invalidated by a later structural change
    #[error("Stale tree index: {0}")]
    StaleIndex(TreeIndex),

    /// No stage is bound, the stage was closed or swapped, or it failed
    #[error("Stage unavailable: {0}")]
    StageUnavailable(String),
}

impl TreeError {
    /// Wrap a failure reported by the scene-graph API
    pub fn unavailable(err: anyhow::Error) -> Self {
        TreeError::StageUnavailable(format!("{:#}", err))
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
