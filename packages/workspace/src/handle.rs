//! # Editor Handle
//!
//! Shared, cloneable access to a [`Workspace`] for async callers.
//!
//! The handle owns the autosave task for the active page and restarts it
//! whenever the active tab changes. Saves release the workspace lock while
//! the write is in flight, so the tree stays readable and editable.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use vos_blocks::PageId;

use crate::autosave::Autosave;
use crate::save_queue::SaveOutcome;
use crate::store::{PageRecord, PageStore};
use crate::workspace::{LoadReport, Workspace, WorkspaceError};

#[derive(Clone)]
pub struct EditorHandle {
    workspace: Arc<Mutex<Workspace>>,
    store: Arc<dyn PageStore>,
    autosave: Arc<StdMutex<Option<Autosave>>>,
    interval: Option<Duration>,
}

impl EditorHandle {
    pub fn new(workspace: Workspace) -> Self {
        let store = workspace.store();
        let interval = workspace.config().autosave_interval();
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
            store,
            autosave: Arc::new(StdMutex::new(None)),
            interval,
        }
    }

    /// Exclusive access for edits and reads
    pub async fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().await
    }

    pub async fn open_page(&self, id: PageId) -> Result<LoadReport, WorkspaceError> {
        let report = self.workspace.lock().await.open_page(id).await?;
        self.restart_autosave().await;
        Ok(report)
    }

    pub async fn create_page(&self, title: &str) -> Result<PageId, WorkspaceError> {
        let id = self.workspace.lock().await.create_page(title).await?;
        self.restart_autosave().await;
        Ok(id)
    }

    pub async fn switch_tab(&self, id: PageId) -> Result<(), WorkspaceError> {
        self.workspace.lock().await.switch_tab(id).await?;
        self.restart_autosave().await;
        Ok(())
    }

    pub async fn close_tab(&self, id: PageId) -> Result<(), WorkspaceError> {
        self.workspace.lock().await.close_tab(id).await?;
        self.restart_autosave().await;
        Ok(())
    }

    pub async fn delete_page(&self, id: PageId) -> Result<(), WorkspaceError> {
        self.workspace.lock().await.delete_page(id).await?;
        self.restart_autosave().await;
        Ok(())
    }

    /// Save the active page if dirty, without holding the lock during the write
    pub async fn save_active(&self) -> Result<Option<SaveOutcome>, WorkspaceError> {
        save_unlocked(&self.workspace, None).await
    }

    pub async fn publish(&self, id: PageId) -> Result<PageRecord, WorkspaceError> {
        self.workspace.lock().await.publish(id).await
    }

    /// Page the autosave task is currently bound to
    pub fn autosave_page(&self) -> Option<PageId> {
        self.autosave_slot().as_ref().map(Autosave::page_id)
    }

    /// Feed store change notifications into the workspace until the store
    /// or the workspace goes away
    pub fn spawn_remote_listener(&self) -> JoinHandle<()> {
        let workspace = Arc::downgrade(&self.workspace);
        let mut changes = self.store.subscribe();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let Some(workspace) = workspace.upgrade() else {
                            break;
                        };
                        let page = change.page_id();
                        let outcome = workspace.lock().await.handle_remote(change);
                        tracing::debug!(page = %page, ?outcome, "remote change");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "remote change listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Stop autosave and flush pending edits
    pub async fn shutdown(&self) -> Result<(), WorkspaceError> {
        drop(self.autosave_slot().take());
        self.save_active().await?;
        tracing::info!("editor shut down");
        Ok(())
    }

    async fn restart_autosave(&self) {
        let active = self.workspace.lock().await.tabs().active();
        let mut slot = self.autosave_slot();

        match (active, self.interval) {
            (Some(page), Some(interval)) => {
                if slot.as_ref().map(Autosave::page_id) != Some(page) {
                    *slot = Some(Autosave::spawn(Arc::downgrade(&self.workspace), page, interval));
                }
            }
            _ => *slot = None,
        }
    }

    fn autosave_slot(&self) -> std::sync::MutexGuard<'_, Option<Autosave>> {
        self.autosave.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Save the active page in two locked steps around an unlocked write
///
/// With `only` set, nothing happens unless that page is still active.
pub(crate) async fn save_unlocked(
    workspace: &Mutex<Workspace>,
    only: Option<PageId>,
) -> Result<Option<SaveOutcome>, WorkspaceError> {
    let (job, store, queue) = {
        let mut ws = workspace.lock().await;
        if let Some(page) = only {
            if ws.tabs().active() != Some(page) {
                return Ok(None);
            }
        }
        match ws.prepare_save()? {
            Some(job) => (job, ws.store(), ws.save_queue()),
            None => return Ok(None),
        }
    };

    let result = queue.save(store.as_ref(), job.revision, job.record).await;
    workspace
        .lock()
        .await
        .finish_save(job.page_id, job.revision, result)
        .map(Some)
}
