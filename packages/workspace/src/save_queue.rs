//! # Save Queue
//!
//! Serializes writes per page. Saves for one page run one at a time, in
//! call order; a save whose revision is not newer than the last persisted
//! one is skipped, so a slow older write can never land after a newer one.
//!
//! Deletes take the same per-page slot, so a delete waits for the write in
//! flight and every save queued after it is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use vos_blocks::PageId;

use crate::store::{PageRecord, PageStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Written; the record as stored
    Saved(PageRecord),

    /// A newer or equal revision was already persisted
    Skipped { persisted: u64 },

    /// The page was deleted; nothing was written
    Deleted,
}

/// Last persisted revision for one page
type Slot = Arc<tokio::sync::Mutex<Option<u64>>>;

#[derive(Debug, Default)]
pub struct SaveQueue {
    slots: Mutex<HashMap<PageId, Slot>>,

    /// Pages that must not be written again
    deleted: Mutex<HashSet<PageId>>,
}

impl SaveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist `record` as of session `revision`
    pub async fn save(
        &self,
        store: &dyn PageStore,
        revision: u64,
        record: PageRecord,
    ) -> Result<SaveOutcome, StoreError> {
        let page = record.id;
        let slot = self.slot(page);
        let mut persisted = slot.lock().await;

        if self.is_deleted(page) {
            tracing::debug!(page = %page, revision, "dropping save of deleted page");
            return Ok(SaveOutcome::Deleted);
        }
        if let Some(done) = *persisted {
            if done >= revision {
                tracing::debug!(page = %page, revision, persisted = done, "skipping stale save");
                return Ok(SaveOutcome::Skipped { persisted: done });
            }
        }

        let saved = store.save_page(record).await?;
        *persisted = Some(revision);
        Ok(SaveOutcome::Saved(saved))
    }

    pub async fn persisted_revision(&self, page: PageId) -> Option<u64> {
        let slot = self.slot(page);
        let persisted = slot.lock().await;
        *persisted
    }

    /// Delete `page` from the store after any write in flight for it
    pub async fn delete(&self, store: &dyn PageStore, page: PageId) -> Result<(), StoreError> {
        let slot = self.slot(page);
        let _guard = slot.lock().await;
        store.delete_page(page).await?;
        self.tombstone(page);
        Ok(())
    }

    /// Refuse every later save of a page that is gone
    pub fn tombstone(&self, page: PageId) {
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).insert(page);
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).remove(&page);
    }

    pub fn is_deleted(&self, page: PageId) -> bool {
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).contains(&page)
    }

    fn slot(&self, page: PageId) -> Slot {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(page)
            .or_default()
            .clone()
    }
}
