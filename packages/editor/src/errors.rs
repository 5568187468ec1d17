//! Error types for the editor

use thiserror::Error;
use vos_blocks::{BlockId, PageId};

/// Structural errors raised by block tree mutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Index {index} out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Block {0} cannot have children")]
    NotAContainer(BlockId),

    #[error("Duplicate block id: {0}")]
    DuplicateId(BlockId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabError {
    #[error("Page {0} is not open")]
    NotOpen(PageId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Tab error: {0}")]
    Tab(#[from] TabError),
}
