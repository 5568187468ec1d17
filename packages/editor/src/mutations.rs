//! # Block Tree Mutations
//!
//! Structural operations on a page's block forest.
//!
//! ## Design Principles
//!
//! 1. **Values, not callbacks**: every edit is a serializable [`Mutation`]
//! 2. **Validated**: indices, parents and ids are checked before anything changes
//! 3. **Immutable versions**: `apply` derives a new [`Page`]; the input page,
//!    which may already be captured in history, is never touched
//!
//! ## Mutation Semantics
//!
//! ### Root edits
//! - `AddBlock` appends to the root sequence
//! - `UpdateBlock` replaces a root element wholesale
//! - `RemoveBlock` deletes a root element, shifting the rest left
//!
//! ### MoveBlock
//! - Single splice: remove at `from`, then insert at `to`
//! - `to` is read against the sequence with the element already removed
//! - `MoveBlock { from: j, to: i }` undoes `MoveBlock { from: i, to: j }`
//!
//! ### Child edits
//! - Parents are addressed by id at any depth; only that parent's children
//!   change, and only the blocks on the path to it are copied
//!
//! ### Identity
//! - No mutation may introduce a block id already present in the page

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use vos_blocks::{Block, BlockId, BlockList, Page};

use crate::errors::MutationError;

/// Structural edits to a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Append a block to the root sequence
    AddBlock { block: Block },

    /// Replace the root block at `index`
    UpdateBlock { index: usize, block: Block },

    /// Delete the root block at `index`
    RemoveBlock { index: usize },

    /// Relocate a root block (splice semantics)
    MoveBlock { from: usize, to: usize },

    /// Replace `children[index]` of the block `parent`
    UpdateChild {
        parent: BlockId,
        index: usize,
        block: Block,
    },

    /// Insert into the children of `parent` (index clamped to the end)
    InsertChild {
        parent: BlockId,
        index: usize,
        block: Block,
    },

    /// Delete `children[index]` of the block `parent`
    RemoveChild { parent: BlockId, index: usize },

    SetTitle { title: String },

    /// Set a metadata entry; `null` removes the key
    SetMetadata { key: String, value: Value },
}

impl Mutation {
    /// Short human readable label, used for history descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } => "Add block",
            Mutation::UpdateBlock { .. } => "Update block",
            Mutation::RemoveBlock { .. } => "Remove block",
            Mutation::MoveBlock { .. } => "Move block",
            Mutation::UpdateChild { .. } => "Update child block",
            Mutation::InsertChild { .. } => "Insert child block",
            Mutation::RemoveChild { .. } => "Remove child block",
            Mutation::SetTitle { .. } => "Rename page",
            Mutation::SetMetadata { .. } => "Edit page metadata",
        }
    }

    /// Apply to `page` with validation, deriving the next version
    ///
    /// The result has `updated_at` stamped. On error nothing is produced and
    /// `page` is unchanged.
    pub fn apply(&self, page: &Page) -> Result<Page, MutationError> {
        // Validate first
        self.validate(page)?;

        let mut next = page.clone();
        match self {
            Mutation::AddBlock { block } => next.blocks.push(block.clone()),

            Mutation::UpdateBlock { index, block } => next.blocks.set(*index, block.clone()),

            Mutation::RemoveBlock { index } => {
                next.blocks.remove(*index);
            }

            Mutation::MoveBlock { from, to } => {
                if from != to {
                    let moved = next.blocks.remove(*from);
                    next.blocks.insert_shared(*to, moved);
                }
            }

            Mutation::UpdateChild { parent, index, block } => {
                let children = Self::children_of(&mut next.blocks, parent)?;
                children.set(*index, block.clone());
            }

            Mutation::InsertChild { parent, index, block } => {
                let children = Self::children_of(&mut next.blocks, parent)?;
                let insert_index = (*index).min(children.len());
                children.insert(insert_index, block.clone());
            }

            Mutation::RemoveChild { parent, index } => {
                let children = Self::children_of(&mut next.blocks, parent)?;
                children.remove(*index);
            }

            Mutation::SetTitle { title } => next.title = title.clone(),

            Mutation::SetMetadata { key, value } => {
                if value.is_null() {
                    next.metadata.remove(key);
                } else {
                    next.metadata.insert(key.clone(), value.clone());
                }
            }
        }

        next.touch();
        Ok(next)
    }

    /// Validate without applying
    pub fn validate(&self, page: &Page) -> Result<(), MutationError> {
        let blocks = &page.blocks;
        match self {
            Mutation::AddBlock { block } => ensure_unique(blocks, None, block),

            Mutation::UpdateBlock { index, block } => {
                let old = root_at(blocks, *index)?;
                ensure_unique(blocks, Some(old), block)
            }

            Mutation::RemoveBlock { index } => root_at(blocks, *index).map(|_| ()),

            Mutation::MoveBlock { from, to } => {
                root_at(blocks, *from)?;
                root_at(blocks, *to)?;
                Ok(())
            }

            Mutation::UpdateChild { parent, index, block } => {
                let parent = find_parent(blocks, parent)?;
                let old = child_at(parent, *index)?;
                ensure_unique(blocks, Some(old), block)
            }

            Mutation::InsertChild { parent, block, .. } => {
                let parent = find_parent(blocks, parent)?;
                if !parent.is_container() {
                    return Err(MutationError::NotAContainer(parent.id.clone()));
                }
                ensure_unique(blocks, None, block)
            }

            Mutation::RemoveChild { parent, index } => {
                let parent = find_parent(blocks, parent)?;
                child_at(parent, *index).map(|_| ())
            }

            Mutation::SetTitle { .. } | Mutation::SetMetadata { .. } => Ok(()),
        }
    }

    /// Children of `parent` for writing, copying only the path down to it
    fn children_of<'a>(
        forest: &'a mut BlockList,
        parent: &BlockId,
    ) -> Result<&'a mut BlockList, MutationError> {
        let path = find_path(forest, parent)
            .ok_or_else(|| MutationError::BlockNotFound(parent.clone()))?;
        let block = block_at_path(forest, &path)
            .ok_or_else(|| MutationError::BlockNotFound(parent.clone()))?;
        Ok(block.children.get_or_insert_with(BlockList::new))
    }
}

fn root_at(blocks: &BlockList, index: usize) -> Result<&Block, MutationError> {
    blocks.get(index).ok_or(MutationError::IndexOutOfRange {
        index,
        len: blocks.len(),
    })
}

fn find_parent<'a>(blocks: &'a BlockList, parent: &BlockId) -> Result<&'a Block, MutationError> {
    blocks
        .find(parent)
        .ok_or_else(|| MutationError::BlockNotFound(parent.clone()))
}

fn child_at(parent: &Block, index: usize) -> Result<&Block, MutationError> {
    parent.child(index).ok_or(MutationError::IndexOutOfRange {
        index,
        len: parent.child_count(),
    })
}

/// Reject `incoming` if any id in its subtree repeats, or collides with an
/// id in `forest` outside the `replaced` subtree
fn ensure_unique(
    forest: &BlockList,
    replaced: Option<&Block>,
    incoming: &Block,
) -> Result<(), MutationError> {
    if let Some(id) = incoming.first_duplicate_id() {
        return Err(MutationError::DuplicateId(id.clone()));
    }

    let mut taken: HashSet<&BlockId> = forest.collect_ids().into_iter().collect();
    if let Some(old) = replaced {
        let mut freed = Vec::new();
        old.collect_ids(&mut freed);
        for id in freed {
            taken.remove(id);
        }
    }

    let mut ids = Vec::new();
    incoming.collect_ids(&mut ids);
    match ids.into_iter().find(|id| taken.contains(*id)) {
        Some(id) => Err(MutationError::DuplicateId(id.clone())),
        None => Ok(()),
    }
}

/// Index path from the root forest to the block with `id`
fn find_path(forest: &BlockList, id: &BlockId) -> Option<Vec<usize>> {
    for (i, block) in forest.iter().enumerate() {
        if &block.id == id {
            return Some(vec![i]);
        }
        if let Some(children) = &block.children {
            if let Some(mut rest) = find_path(children, id) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
    }
    None
}

fn block_at_path<'a>(forest: &'a mut BlockList, path: &[usize]) -> Option<&'a mut Block> {
    let (first, rest) = path.split_first()?;
    let block = forest.get_mut(*first)?;
    if rest.is_empty() {
        return Some(block);
    }
    block_at_path(block.children.as_mut()?, rest)
}
