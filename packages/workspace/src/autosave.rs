//! Periodic background save of the active page.

use std::sync::Weak;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use vos_blocks::PageId;

use crate::handle::save_unlocked;
use crate::workspace::Workspace;

/// A running autosave task, bound to one page
///
/// The task stops when this value is dropped, when the workspace goes away,
/// or when another page becomes active.
pub struct Autosave {
    page_id: PageId,
    task: JoinHandle<()>,
}

impl Autosave {
    pub fn spawn(workspace: Weak<Mutex<Workspace>>, page_id: PageId, interval: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(workspace) = workspace.upgrade() else {
                    break;
                };

                match save_unlocked(&workspace, Some(page_id)).await {
                    Ok(Some(_)) => tracing::debug!(page = %page_id, "autosaved"),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(page = %page_id, error = %e, "autosave failed"),
                }
            }
        });

        tracing::debug!(page = %page_id, ?interval, "autosave started");
        Self { page_id, task }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(page = %self.page_id, "autosave stopped");
    }
}
