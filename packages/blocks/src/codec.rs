//! # Content Codec
//!
//! Serializes the block forest to and from the opaque `content` column of a
//! persisted page. The format is a JSON array of blocks.

use thiserror::Error;

use crate::block::{BlockId, BlockList};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed block content: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Duplicate block id in content: {0}")]
    DuplicateId(BlockId),
}

pub fn encode_blocks(blocks: &BlockList) -> Result<String, CodecError> {
    Ok(serde_json::to_string(blocks)?)
}

/// Decode persisted content; blank content is an empty forest
pub fn decode_blocks(content: &str) -> Result<BlockList, CodecError> {
    if content.trim().is_empty() {
        return Ok(BlockList::new());
    }

    let blocks: BlockList = serde_json::from_str(content)?;
    if let Some(id) = blocks.first_duplicate_id() {
        return Err(CodecError::DuplicateId(id.clone()));
    }
    Ok(blocks)
}
