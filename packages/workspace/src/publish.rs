//! Publishing: flip a page out of draft and stamp `publishedAt`.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use vos_blocks::PageId;

use crate::store::{PageRecord, PageStore, StoreError};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Publish rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish the stored version of a page, returning the published record
    async fn publish(&self, id: PageId) -> Result<PageRecord, PublishError>;
}

/// Publishes by rewriting the record in the page store
pub struct StorePublisher {
    store: Arc<dyn PageStore>,
}

impl StorePublisher {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Publisher for StorePublisher {
    async fn publish(&self, id: PageId) -> Result<PageRecord, PublishError> {
        let record = self.store.load_page(id).await?;

        let (mut page, error) = record.into_page();
        if let Some(e) = error {
            return Err(PublishError::Rejected(format!("stored content is unreadable: {}", e)));
        }
        page.mark_published();

        let record = PageRecord::from_page(&page).map_err(|e| PublishError::Rejected(e.to_string()))?;
        let published = self.store.save_page(record).await?;
        tracing::info!(page = %id, slug = %published.slug, "published page");
        Ok(published)
    }
}
