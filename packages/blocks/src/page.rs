//! # Pages
//!
//! A page is the aggregate edited by a session: routing metadata plus the
//! root forest of blocks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::block::{Block, BlockId, BlockList};

pub type PageId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub slug: String,
    pub title: String,

    /// Root forest of the block tree
    #[serde(default)]
    pub blocks: BlockList,

    /// Open bag: description, keywords, extension data
    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Page {
    /// New draft page with a fresh id and an empty block list
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    pub fn with_id(id: PageId, title: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id,
            slug: slugify(&title),
            title,
            blocks: BlockList::new(),
            metadata: Map::new(),
            is_draft: true,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks = blocks.into_iter().collect();
        self
    }

    /// Stamp `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    pub fn find_block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.find(id)
    }

    pub fn contains_block(&self, id: &BlockId) -> bool {
        self.blocks.contains_id(id)
    }

    /// Number of blocks in the whole tree
    pub fn block_count(&self) -> usize {
        self.blocks.total_len()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }

    pub fn keywords(&self) -> Vec<&str> {
        match self.metadata.get("keywords") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => s.split(',').map(str::trim).filter(|k| !k.is_empty()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn mark_published(&mut self) {
        let now = Utc::now();
        self.is_draft = false;
        self.published_at = Some(now);
        self.updated_at = now.max(self.updated_at);
    }
}

/// URL slug from a title: lowercase ASCII alphanumerics joined by `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
