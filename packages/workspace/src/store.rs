//! # Page Store
//!
//! Persistence boundary. A page is stored as a [`PageRecord`]: the page's
//! columns plus its block forest encoded as a JSON string.
//!
//! Stores broadcast every write so other editors viewing the same page can
//! react ([`PageStore::subscribe`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use vos_blocks::{decode_blocks, encode_blocks, BlockList, CodecError, Page, PageId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    NotFound(PageId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A page as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: PageId,
    pub slug: String,
    pub title: String,

    /// JSON-encoded block forest
    pub content: String,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PageRecord {
    pub fn from_page(page: &Page) -> Result<Self, CodecError> {
        Ok(Self {
            id: page.id,
            slug: page.slug.clone(),
            title: page.title.clone(),
            content: encode_blocks(&page.blocks)?,
            metadata: page.metadata.clone(),
            is_draft: page.is_draft,
            created_at: page.created_at,
            updated_at: page.updated_at,
            published_at: page.published_at,
        })
    }

    /// Decode into a page
    ///
    /// Undecodable content never fails the load: the page comes back with an
    /// empty block list and the codec error is returned alongside it.
    pub fn into_page(self) -> (Page, Option<CodecError>) {
        let (blocks, error) = match decode_blocks(&self.content) {
            Ok(blocks) => (blocks, None),
            Err(e) => (BlockList::new(), Some(e)),
        };

        let page = Page {
            id: self.id,
            slug: self.slug,
            title: self.title,
            blocks,
            metadata: self.metadata,
            is_draft: self.is_draft,
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
        };
        (page, error)
    }
}

/// Change notification broadcast by a store
#[derive(Debug, Clone, PartialEq)]
pub enum PageChange {
    Updated(PageRecord),
    Deleted(PageId),
}

impl PageChange {
    pub fn page_id(&self) -> PageId {
        match self {
            PageChange::Updated(record) => record.id,
            PageChange::Deleted(id) => *id,
        }
    }
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn load_page(&self, id: PageId) -> Result<PageRecord, StoreError>;

    /// Persist a record, returning it as stored
    async fn save_page(&self, record: PageRecord) -> Result<PageRecord, StoreError>;

    /// Create a new draft page
    async fn create_page(&self, title: &str) -> Result<PageRecord, StoreError>;

    async fn delete_page(&self, id: PageId) -> Result<(), StoreError>;

    /// Receive every change made through this store
    fn subscribe(&self) -> broadcast::Receiver<PageChange>;
}
