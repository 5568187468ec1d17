//! # Blocks
//!
//! A block is a single node of the page tree. Its `type` decides which of the
//! optional payload fields are meaningful, but the model stays permissive and
//! never forbids setting the others.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::style::Styles;

/// Stable block identifier, assigned at creation and never reassigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<uuid::Uuid> for BlockId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id.to_string())
    }
}

/// Closed set of block variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Image,
    Container,
    Row,
    Column,
    Section,
    Component,
}

impl BlockType {
    pub const ALL: [BlockType; 7] = [
        BlockType::Text,
        BlockType::Image,
        BlockType::Container,
        BlockType::Row,
        BlockType::Column,
        BlockType::Section,
        BlockType::Component,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Container => "container",
            BlockType::Row => "row",
            BlockType::Column => "column",
            BlockType::Section => "section",
            BlockType::Component => "component",
        }
    }

    /// Whether blocks of this type hold an ordered list of children
    pub fn is_container(&self) -> bool {
        !matches!(self, BlockType::Text | BlockType::Image)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Rich-text/HTML payload (text blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Image reference (image blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Exclusively owned children (container-like blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<BlockList>,

    /// Weak reference to a saved component definition. Lookup only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    #[serde(default, skip_serializing_if = "Styles::is_empty")]
    pub styles: Styles,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            content: None,
            src: None,
            alt: None,
            children: None,
            component_id: None,
            styles: Styles::default(),
        }
    }

    pub fn text(id: impl Into<BlockId>, content: impl Into<String>) -> Self {
        Self::new(id, BlockType::Text).with_content(content)
    }

    pub fn image(id: impl Into<BlockId>, src: impl Into<String>, alt: impl Into<String>) -> Self {
        let mut block = Self::new(id, BlockType::Image);
        block.src = Some(src.into());
        block.alt = Some(alt.into());
        block
    }

    /// Create a container-like block that already owns `children`
    pub fn container(
        id: impl Into<BlockId>,
        block_type: BlockType,
        children: impl IntoIterator<Item = Block>,
    ) -> Self {
        Self::new(id, block_type).with_children(children)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Block>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_component(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn is_container(&self) -> bool {
        self.block_type.is_container()
    }

    pub fn child(&self, index: usize) -> Option<&Block> {
        self.children.as_ref().and_then(|c| c.get(index))
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, BlockList::len)
    }

    /// Find a block by id in this block's subtree (including itself)
    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        if &self.id == id {
            return Some(self);
        }
        self.children.as_ref().and_then(|c| c.find(id))
    }

    /// Number of blocks in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.as_ref().map_or(0, BlockList::total_len)
    }

    /// Collect this block's id and every descendant id
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a BlockId>) {
        out.push(&self.id);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_ids(out);
            }
        }
    }

    /// First id that appears more than once in this subtree
    pub fn first_duplicate_id(&self) -> Option<&BlockId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        first_duplicate(ids)
    }
}

pub(crate) fn first_duplicate<'a>(ids: impl IntoIterator<Item = &'a BlockId>) -> Option<&'a BlockId> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

/// Ordered, structurally shared sequence of blocks
///
/// Clones share storage. Mutating methods copy the pointer vector of this
/// level only when it is shared; untouched blocks stay shared with every
/// other clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockList(Arc<Vec<Arc<Block>>>);

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.0.get(index).map(Arc::as_ref)
    }

    /// Mutable access to the block at `index`
    ///
    /// Copies this level's pointer vector and the block itself only when
    /// they are shared with another clone (path copying).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Block> {
        Arc::make_mut(&mut self.0).get_mut(index).map(Arc::make_mut)
    }

    /// Shared handle to the block at `index`
    pub fn get_shared(&self, index: usize) -> Option<&Arc<Block>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.0.iter().map(Arc::as_ref)
    }

    pub fn ids(&self) -> Vec<&BlockId> {
        self.iter().map(|b| &b.id).collect()
    }

    pub fn push(&mut self, block: Block) {
        Arc::make_mut(&mut self.0).push(Arc::new(block));
    }

    pub fn insert(&mut self, index: usize, block: Block) {
        Arc::make_mut(&mut self.0).insert(index, Arc::new(block));
    }

    /// Re-insert a shared block without copying it
    pub fn insert_shared(&mut self, index: usize, block: Arc<Block>) {
        Arc::make_mut(&mut self.0).insert(index, block);
    }

    pub fn set(&mut self, index: usize, block: Block) {
        Arc::make_mut(&mut self.0)[index] = Arc::new(block);
    }

    pub fn remove(&mut self, index: usize) -> Arc<Block> {
        Arc::make_mut(&mut self.0).remove(index)
    }

    /// True when both lists point at the same storage
    pub fn ptr_eq(&self, other: &BlockList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Depth-first search for a block anywhere in the forest
    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.iter().find_map(|b| b.find(id))
    }

    pub fn contains_id(&self, id: &BlockId) -> bool {
        self.find(id).is_some()
    }

    /// Every id in the forest, depth-first
    pub fn collect_ids(&self) -> Vec<&BlockId> {
        let mut out = Vec::new();
        for block in self.iter() {
            block.collect_ids(&mut out);
        }
        out
    }

    /// First id that appears more than once anywhere in the forest
    pub fn first_duplicate_id(&self) -> Option<&BlockId> {
        first_duplicate(self.collect_ids())
    }

    /// Number of blocks in the whole forest
    pub fn total_len(&self) -> usize {
        self.iter().map(Block::subtree_len).sum()
    }
}

impl From<Vec<Block>> for BlockList {
    fn from(blocks: Vec<Block>) -> Self {
        Self(Arc::new(blocks.into_iter().map(Arc::new).collect()))
    }
}

impl FromIterator<Block> for BlockList {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().map(Arc::new).collect()))
    }
}

impl Serialize for BlockList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for BlockList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Block>::deserialize(deserializer).map(BlockList::from)
    }
}
