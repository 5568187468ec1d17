//! In-process [`PageStore`]
//!
//! Backs tests and offline editing. Writes can be made to fail on demand to
//! exercise error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{broadcast, RwLock};
use vos_blocks::{slugify, Page, PageId};

use crate::store::{PageChange, PageRecord, PageStore, StoreError};

const CHANNEL_CAPACITY: usize = 64;

pub struct MemoryStore {
    pages: RwLock<HashMap<PageId, PageRecord>>,
    changes: broadcast::Sender<PageChange>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            pages: RwLock::new(HashMap::new()),
            changes,
            fail_writes: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    /// Seed a record without broadcasting
    pub async fn insert(&self, record: PageRecord) {
        self.pages.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: PageId) -> Option<PageRecord> {
        self.pages.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    /// Make every subsequent write fail with a backend error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes are disabled".to_string()));
        }
        Ok(())
    }

    fn broadcast(&self, change: PageChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn load_page(&self, id: PageId) -> Result<PageRecord, StoreError> {
        self.get(id).await.ok_or(StoreError::NotFound(id))
    }

    async fn save_page(&self, record: PageRecord) -> Result<PageRecord, StoreError> {
        self.check_writable()?;
        self.pages.write().await.insert(record.id, record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(page = %record.id, "saved page");
        self.broadcast(PageChange::Updated(record.clone()));
        Ok(record)
    }

    async fn create_page(&self, title: &str) -> Result<PageRecord, StoreError> {
        self.check_writable()?;
        let mut page = Page::new(title);

        let mut pages = self.pages.write().await;
        let base = slugify(title);
        let mut suffix = 1;
        while pages.values().any(|r| r.slug == page.slug) {
            suffix += 1;
            page.slug = format!("{}-{}", base, suffix);
        }

        let record = PageRecord::from_page(&page).map_err(|e| StoreError::Backend(e.to_string()))?;
        pages.insert(record.id, record.clone());
        drop(pages);

        tracing::info!(page = %record.id, slug = %record.slug, "created page");
        self.broadcast(PageChange::Updated(record.clone()));
        Ok(record)
    }

    async fn delete_page(&self, id: PageId) -> Result<(), StoreError> {
        self.check_writable()?;
        if self.pages.write().await.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(page = %id, "deleted page");
        self.broadcast(PageChange::Deleted(id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PageChange> {
        self.changes.subscribe()
    }
}
