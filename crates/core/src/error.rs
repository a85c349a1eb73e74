//! Component-local error types. Each component propagates its own enum;
//! the orchestrator (`node.rs`) folds them into `anyhow::Result` at the
//! boundary where callers stop caring which component failed.

use bdnode_types::Hash;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DagError {
    #[error("block references missing parent {0}")]
    MissingParent(Hash),
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("evm trapped: {0}")]
    Trap(String),
    #[error("checkpoint stack is empty")]
    NoCheckpoint,
}
