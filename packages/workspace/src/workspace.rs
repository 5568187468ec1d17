//! # Workspace
//!
//! Ties the editing model to persistence: open tabs, the session editing
//! the front tab, the page store, auth and publishing.
//!
//! The session is the source of truth for the active page. Its tab entry is
//! refreshed whenever the session is saved or stashed (tab switch).
//!
//! Saving is split in two halves, [`Workspace::prepare_save`] and
//! [`Workspace::finish_save`], so callers holding the workspace behind a
//! lock can release it while the write is in flight.
//!
//! Every saved record carries the block id counters under
//! [`COUNTERS_KEY`] in its metadata. Loading a record folds them back into
//! the workspace's generator, so a restarted editor keeps numbering where
//! the last one stopped.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use vos_blocks::{Block, BlockCounters, BlockType, CodecError, IdGenerator, Page, PageId};
use vos_editor::{EditSession, EditorError, Mutation, MutationError, RemoteUpdate, TabError, TabManager};

use crate::auth::{AuthProvider, User};
use crate::config::EditorConfig;
use crate::publish::{PublishError, Publisher, StorePublisher};
use crate::save_queue::{SaveOutcome, SaveQueue};
use crate::store::{PageChange, PageRecord, PageStore, StoreError};

/// Records kept per page to recognise our own writes coming back
const ECHO_LIMIT: usize = 8;

/// Record metadata key holding the block id counters
pub const COUNTERS_KEY: &str = "blockCounters";

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Sign in required")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Page content could not be encoded: {0}")]
    Codec(#[from] CodecError),
}

impl From<TabError> for WorkspaceError {
    fn from(e: TabError) -> Self {
        WorkspaceError::Editor(e.into())
    }
}

impl From<MutationError> for WorkspaceError {
    fn from(e: MutationError) -> Self {
        WorkspaceError::Editor(e.into())
    }
}

/// How a page came to be open
#[derive(Debug, Clone, PartialEq)]
pub enum LoadReport {
    Loaded,

    /// The page was already open; its tab was brought to the front
    AlreadyOpen,

    /// Stored content was unreadable; the page opened with no blocks
    Recovered { reason: String },
}

/// What a remote change did to the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    Applied,

    /// The active page has unsaved edits; the change is held by the session
    Conflict,

    /// The page was deleted and its tab closed
    Evicted,

    Ignored,
}

/// A write taken from the session, ready for the save queue
#[derive(Debug, Clone)]
pub struct SaveJob {
    pub page_id: PageId,
    pub revision: u64,
    pub record: PageRecord,
}

pub struct Workspace {
    store: Arc<dyn PageStore>,
    auth: Arc<dyn AuthProvider>,
    publisher: Arc<dyn Publisher>,
    saves: Arc<SaveQueue>,

    session: EditSession,
    tabs: TabManager,
    ids: IdGenerator,
    config: EditorConfig,

    /// Records this workspace wrote, newest last
    written: HashMap<PageId, Vec<PageRecord>>,
}

impl Workspace {
    pub fn new(store: Arc<dyn PageStore>, auth: Arc<dyn AuthProvider>, config: EditorConfig) -> Self {
        let publisher = Arc::new(StorePublisher::new(store.clone()));
        Self {
            store,
            auth,
            publisher,
            saves: Arc::new(SaveQueue::new()),
            session: EditSession::with_history_limit(config.session_id.clone(), config.history_limit),
            tabs: TabManager::new(),
            ids: IdGenerator::new(config.id_namespace),
            config,
            written: HashMap::new(),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.session.current_page()
    }

    pub fn store(&self) -> Arc<dyn PageStore> {
        self.store.clone()
    }

    pub fn save_queue(&self) -> Arc<SaveQueue> {
        self.saves.clone()
    }

    /// Apply an edit to the active page
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, WorkspaceError> {
        Ok(self.session.apply(mutation)?)
    }

    /// A fresh block with the next deterministic id for its type
    ///
    /// Ids already used by the active page are skipped.
    pub fn new_block(&mut self, block_type: BlockType) -> Block {
        let page = self.session.current_page();
        let (id, meta) = self
            .ids
            .next_free(block_type, |id| page.is_some_and(|p| p.contains_block(id)));
        tracing::debug!(block = %id, ordinal = meta.ordinal, "new {} block", block_type.as_str());
        Block::new(id, block_type)
    }

    pub fn id_counters(&self) -> &BlockCounters {
        self.ids.counters()
    }

    /// Continue numbering from persisted counters
    pub fn restore_id_counters(&mut self, counters: BlockCounters) {
        self.ids = IdGenerator::with_counters(self.config.id_namespace, counters);
    }

    /// Decode a stored record, folding its id counters into the generator
    fn adopt(&mut self, mut record: PageRecord) -> (Page, Option<CodecError>) {
        if let Some(value) = record.metadata.remove(COUNTERS_KEY) {
            match serde_json::from_value::<BlockCounters>(value) {
                Ok(counters) => self.ids.absorb(&counters),
                Err(e) => tracing::warn!(page = %record.id, error = %e, "ignoring unreadable block counters"),
            }
        }
        record.into_page()
    }

    fn stamp_counters(&self, record: &mut PageRecord) {
        match serde_json::to_value(self.ids.counters()) {
            Ok(counters) => {
                record.metadata.insert(COUNTERS_KEY.to_string(), counters);
            }
            Err(e) => tracing::warn!(page = %record.id, error = %e, "block counters not saved"),
        }
    }

    fn require_user(&self) -> Result<User, WorkspaceError> {
        self.auth.current_user().ok_or(WorkspaceError::Unauthorized)
    }

    /// Open a stored page in a new tab and start editing it
    pub async fn open_page(&mut self, id: PageId) -> Result<LoadReport, WorkspaceError> {
        if self.tabs.is_open(id) {
            self.switch_tab(id).await?;
            return Ok(LoadReport::AlreadyOpen);
        }

        let record = self.store.load_page(id).await?;
        let (page, error) = self.adopt(record);
        let report = match error {
            Some(e) => {
                tracing::warn!(page = %id, error = %e, "stored content unreadable, opening empty");
                LoadReport::Recovered { reason: e.to_string() }
            }
            None => LoadReport::Loaded,
        };

        self.activate(page);
        tracing::info!(page = %id, tabs = self.tabs.len(), "opened page");
        Ok(report)
    }

    /// Create a draft page and open it
    pub async fn create_page(&mut self, title: &str) -> Result<PageId, WorkspaceError> {
        self.require_user()?;
        let record = self.store.create_page(title).await?;
        self.note_written(record.clone());

        let (page, _) = self.adopt(record);
        let id = page.id;
        self.activate(page);
        Ok(id)
    }

    /// Bring an open tab to the front
    ///
    /// Unsaved edits on the current page are saved first. If that save
    /// fails, nothing changes and the error is returned.
    pub async fn switch_tab(&mut self, id: PageId) -> Result<(), WorkspaceError> {
        if self.tabs.active() == Some(id) {
            return Ok(());
        }
        if !self.tabs.is_open(id) {
            return Err(TabError::NotOpen(id).into());
        }

        if self.session.is_dirty() {
            self.save_active().await?;
        }
        self.stash_session();
        self.tabs.set_active_tab(id)?;
        self.follow_active_tab();
        tracing::debug!(page = %id, "switched tab");
        Ok(())
    }

    /// Close a tab, saving it first when it is the active page and dirty
    pub async fn close_tab(&mut self, id: PageId) -> Result<(), WorkspaceError> {
        if !self.tabs.is_open(id) {
            return Err(TabError::NotOpen(id).into());
        }

        let was_active = self.tabs.active() == Some(id);
        if was_active && self.session.is_dirty() {
            self.save_active().await?;
        }
        self.tabs.remove_tab(id);
        self.written.remove(&id);
        if was_active {
            self.follow_active_tab();
        }
        Ok(())
    }

    /// Delete a page from the store and close its tab
    ///
    /// Waits for a save of the page already in flight; saves started later
    /// are dropped.
    pub async fn delete_page(&mut self, id: PageId) -> Result<(), WorkspaceError> {
        self.require_user()?;
        self.saves.delete(self.store.as_ref(), id).await?;
        self.evict(id);
        Ok(())
    }

    /// Snapshot the active page for writing; `None` when there is nothing to save
    pub fn prepare_save(&mut self) -> Result<Option<SaveJob>, WorkspaceError> {
        if !self.session.is_dirty() {
            return Ok(None);
        }
        self.require_user()?;
        let Some(page) = self.session.current_page() else {
            return Ok(None);
        };

        let mut record = PageRecord::from_page(page)?;
        self.stamp_counters(&mut record);
        let job = SaveJob {
            page_id: page.id,
            revision: self.session.revision(),
            record,
        };
        self.note_written(job.record.clone());
        Ok(Some(job))
    }

    /// Apply the result of a write started by [`Workspace::prepare_save`]
    ///
    /// A failed write leaves the session, its history and dirty state as they were.
    pub fn finish_save(
        &mut self,
        page_id: PageId,
        revision: u64,
        result: Result<SaveOutcome, StoreError>,
    ) -> Result<SaveOutcome, WorkspaceError> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(page = %page_id, revision, error = %e, "save failed");
                return Err(e.into());
            }
        };

        let saved_up_to = match &outcome {
            SaveOutcome::Saved(record) => {
                if self.tabs.is_open(page_id) {
                    self.note_written(record.clone());
                }
                revision
            }
            SaveOutcome::Skipped { persisted } => *persisted,
            SaveOutcome::Deleted => {
                tracing::debug!(page = %page_id, revision, "page deleted before save");
                return Ok(outcome);
            }
        };

        if let Some(page) = self.session.current_page() {
            if page.id == page_id {
                let page = page.clone();
                self.session.mark_saved(saved_up_to);
                self.sync_tab(page);
            }
        }
        tracing::info!(page = %page_id, revision, "saved page");
        Ok(outcome)
    }

    /// Save the active page if it has unsaved edits
    pub async fn save_active(&mut self) -> Result<Option<SaveOutcome>, WorkspaceError> {
        let Some(job) = self.prepare_save()? else {
            return Ok(None);
        };
        let result = self.saves.save(self.store.as_ref(), job.revision, job.record).await;
        self.finish_save(job.page_id, job.revision, result).map(Some)
    }

    /// Publish a page, saving pending edits first when it is the active one
    pub async fn publish(&mut self, id: PageId) -> Result<PageRecord, WorkspaceError> {
        self.require_user()?;
        if self.tabs.active() == Some(id) && self.session.is_dirty() {
            self.save_active().await?;
        }

        let record = self.publisher.publish(id).await?;
        self.note_written(record.clone());

        if self.tabs.is_open(id) {
            let (page, _) = self.adopt(record.clone());
            self.refresh_tab(page);
        }
        Ok(record)
    }

    /// React to a change broadcast by the store
    pub fn handle_remote(&mut self, change: PageChange) -> RemoteOutcome {
        let id = change.page_id();
        if !self.tabs.is_open(id) {
            return RemoteOutcome::Ignored;
        }

        match change {
            PageChange::Deleted(_) => {
                tracing::info!(page = %id, "page deleted remotely, closing tab");
                self.evict(id);
                RemoteOutcome::Evicted
            }
            PageChange::Updated(record) => {
                if self.take_echo(&record) {
                    return RemoteOutcome::Ignored;
                }
                let (page, error) = self.adopt(record);
                if let Some(e) = error {
                    tracing::warn!(page = %id, error = %e, "ignoring unreadable remote change");
                    return RemoteOutcome::Ignored;
                }
                self.refresh_tab(page)
            }
        }
    }

    /// Resolve a held remote change in its favour
    pub fn accept_remote(&mut self) -> bool {
        let accepted = self.session.accept_remote();
        if accepted {
            self.stash_session();
        }
        accepted
    }

    /// Resolve a held remote change by keeping local edits
    pub fn keep_local(&mut self) -> bool {
        self.session.keep_local()
    }

    fn refresh_tab(&mut self, page: Page) -> RemoteOutcome {
        let id = page.id;
        if self.tabs.active() != Some(id) {
            self.sync_tab(page);
            return RemoteOutcome::Applied;
        }

        match self.session.apply_remote(page.clone()) {
            RemoteUpdate::Applied => {
                self.sync_tab(page);
                RemoteOutcome::Applied
            }
            RemoteUpdate::Conflict => RemoteOutcome::Conflict,
            RemoteUpdate::Ignored => RemoteOutcome::Ignored,
        }
    }

    fn activate(&mut self, page: Page) {
        self.stash_session();
        self.tabs.add_tab(page.id, page.clone());
        self.session.set_page(page);
    }

    /// Write the session's page back into its tab
    fn stash_session(&mut self) {
        if let Some(page) = self.session.current_page() {
            let page = page.clone();
            self.sync_tab(page);
        }
    }

    /// Replace the page held by its tab; a closed tab stays closed
    fn sync_tab(&mut self, page: Page) {
        let id = page.id;
        if let Err(e) = self.tabs.update_tab(id, page) {
            tracing::debug!(page = %id, error = %e, "tab no longer open");
        }
    }

    /// Point the session at whatever tab is now in front
    fn follow_active_tab(&mut self) {
        match self.tabs.active_page() {
            Some(page) => {
                let page = page.clone();
                self.session.set_page(page);
            }
            None => self.session.clear(),
        }
    }

    fn evict(&mut self, id: PageId) {
        let was_active = self.tabs.active() == Some(id);
        self.tabs.remove_tab(id);
        self.saves.tombstone(id);
        self.written.remove(&id);
        if was_active {
            self.follow_active_tab();
        }
    }

    fn note_written(&mut self, record: PageRecord) {
        let records = self.written.entry(record.id).or_default();
        if records.len() == ECHO_LIMIT {
            records.remove(0);
        }
        records.push(record);
    }

    /// Whether `record` is one of our own writes; consumes the match
    fn take_echo(&mut self, record: &PageRecord) -> bool {
        let Some(records) = self.written.get_mut(&record.id) else {
            return false;
        };
        match records.iter().position(|r| r == record) {
            Some(pos) => {
                records.remove(pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuth;
    use crate::MemoryStore;
    use serde_json::json;
    use uuid::Uuid;

    fn setup() -> (Arc<MemoryStore>, Arc<StaticAuth>, Workspace) {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(StaticAuth::signed_in(User::new("u1", "ada@example.com")));
        let workspace = Workspace::new(store.clone(), auth.clone(), EditorConfig::default());
        (store, auth, workspace)
    }

    #[tokio::test]
    async fn test_create_edit_save() {
        let (store, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();

        let block = workspace.new_block(BlockType::Text).with_content("<p>Hi</p>");
        workspace.session_mut().add_block(block).unwrap();
        assert!(workspace.session().is_dirty());

        let outcome = workspace.save_active().await.unwrap();
        assert!(matches!(outcome, Some(SaveOutcome::Saved(_))));
        assert!(!workspace.session().is_dirty());
        assert!(workspace.session().can_undo());

        let stored = store.get(id).await.unwrap();
        assert!(stored.content.contains("<p>Hi</p>"));

        // Nothing left to save
        assert_eq!(workspace.save_active().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_history_and_dirty_state() {
        let (store, _, mut workspace) = setup();
        workspace.create_page("Home").await.unwrap();
        workspace.session_mut().set_title("Start").unwrap();

        store.set_fail_writes(true);
        let result = workspace.save_active().await;
        assert!(matches!(result, Err(WorkspaceError::Store(StoreError::Backend(_)))));
        assert!(workspace.session().is_dirty());
        assert!(workspace.session().can_undo());
        assert_eq!(workspace.active_page().unwrap().title, "Start");
    }

    #[tokio::test]
    async fn test_writes_require_sign_in() {
        let (_, auth, mut workspace) = setup();
        auth.sign_out();

        assert!(matches!(
            workspace.create_page("Home").await,
            Err(WorkspaceError::Unauthorized)
        ));
        assert!(matches!(
            workspace.publish(Uuid::from_u128(1)).await,
            Err(WorkspaceError::Unauthorized)
        ));
        assert!(matches!(
            workspace.delete_page(Uuid::from_u128(1)).await,
            Err(WorkspaceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_open_missing_page_is_not_found() {
        let (_, _, mut workspace) = setup();
        let missing = Uuid::from_u128(42);
        assert!(matches!(
            workspace.open_page(missing).await,
            Err(WorkspaceError::Store(StoreError::NotFound(id))) if id == missing
        ));
        assert!(workspace.tabs().is_empty());
    }

    #[tokio::test]
    async fn test_open_recovers_from_bad_content() {
        let (store, _, mut workspace) = setup();
        let mut record = PageRecord::from_page(&Page::new("Broken")).unwrap();
        record.content = "not json".to_string();
        store.insert(record.clone()).await;

        let report = workspace.open_page(record.id).await.unwrap();
        assert!(matches!(report, LoadReport::Recovered { .. }));
        assert!(workspace.active_page().unwrap().blocks.is_empty());
        assert_eq!(workspace.active_page().unwrap().title, "Broken");
    }

    #[tokio::test]
    async fn test_switch_tab_saves_dirty_page() {
        let (store, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        let second = workspace.create_page("Second").await.unwrap();
        assert_eq!(workspace.tabs().active(), Some(second));

        workspace.session_mut().set_metadata("description", json!("Second page")).unwrap();
        workspace.switch_tab(first).await.unwrap();

        assert_eq!(workspace.active_page().unwrap().id, first);
        assert!(!workspace.session().can_undo());
        let stored = store.get(second).await.unwrap();
        assert_eq!(stored.metadata["description"], "Second page");

        // Switching back shows the edited page
        workspace.switch_tab(second).await.unwrap();
        assert_eq!(workspace.active_page().unwrap().description(), Some("Second page"));
    }

    #[tokio::test]
    async fn test_switch_tab_blocked_by_failed_save() {
        let (store, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        let second = workspace.create_page("Second").await.unwrap();
        workspace.session_mut().set_title("Renamed").unwrap();

        store.set_fail_writes(true);
        assert!(workspace.switch_tab(first).await.is_err());
        assert_eq!(workspace.tabs().active(), Some(second));
        assert_eq!(workspace.active_page().unwrap().title, "Renamed");
        assert!(workspace.session().can_undo());
    }

    #[tokio::test]
    async fn test_switch_to_unknown_tab() {
        let (_, _, mut workspace) = setup();
        workspace.create_page("First").await.unwrap();
        let stranger = Uuid::from_u128(5);
        assert!(matches!(
            workspace.switch_tab(stranger).await,
            Err(WorkspaceError::Editor(EditorError::Tab(TabError::NotOpen(id)))) if id == stranger
        ));
    }

    #[tokio::test]
    async fn test_open_already_open_page() {
        let (_, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        workspace.create_page("Second").await.unwrap();

        let report = workspace.open_page(first).await.unwrap();
        assert_eq!(report, LoadReport::AlreadyOpen);
        assert_eq!(workspace.tabs().active(), Some(first));
        assert_eq!(workspace.tabs().len(), 2);
    }

    #[tokio::test]
    async fn test_close_active_tab_follows_remaining() {
        let (_, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        let second = workspace.create_page("Second").await.unwrap();

        workspace.close_tab(second).await.unwrap();
        assert_eq!(workspace.active_page().unwrap().id, first);

        workspace.close_tab(first).await.unwrap();
        assert!(workspace.active_page().is_none());
        assert!(workspace.tabs().is_empty());
    }

    #[tokio::test]
    async fn test_delete_page_closes_tab() {
        let (store, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        let second = workspace.create_page("Second").await.unwrap();

        workspace.delete_page(second).await.unwrap();
        assert!(store.get(second).await.is_none());
        assert!(!workspace.tabs().is_open(second));
        assert_eq!(workspace.active_page().unwrap().id, first);
    }

    #[tokio::test]
    async fn test_publish_saves_pending_edits() {
        let (store, _, mut workspace) = setup();
        let id = workspace.create_page("Launch").await.unwrap();
        workspace.session_mut().set_title("Launch day").unwrap();

        let record = workspace.publish(id).await.unwrap();
        assert!(!record.is_draft);
        assert_eq!(record.title, "Launch day");

        let page = workspace.active_page().unwrap();
        assert!(!page.is_draft);
        assert!(page.published_at.is_some());
        assert!(!workspace.session().is_dirty());
        assert_eq!(store.get(id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_own_writes_are_not_remote_changes() {
        let (store, _, mut workspace) = setup();
        let mut changes = store.subscribe();
        workspace.create_page("Home").await.unwrap();
        workspace.session_mut().set_title("Start").unwrap();
        workspace.save_active().await.unwrap();

        // create + save
        for _ in 0..2 {
            let change = changes.recv().await.unwrap();
            assert_eq!(workspace.handle_remote(change), RemoteOutcome::Ignored);
        }
        assert!(workspace.session().can_undo());
    }

    #[tokio::test]
    async fn test_remote_update_applies_when_clean() {
        let (store, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();

        let mut remote = store.get(id).await.unwrap();
        remote.title = "Edited elsewhere".to_string();
        let outcome = workspace.handle_remote(PageChange::Updated(remote));

        assert_eq!(outcome, RemoteOutcome::Applied);
        assert_eq!(workspace.active_page().unwrap().title, "Edited elsewhere");
    }

    #[tokio::test]
    async fn test_remote_update_conflicts_when_dirty() {
        let (store, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();
        workspace.session_mut().set_title("Local").unwrap();

        let mut remote = store.get(id).await.unwrap();
        remote.title = "Remote".to_string();
        assert_eq!(
            workspace.handle_remote(PageChange::Updated(remote)),
            RemoteOutcome::Conflict
        );
        assert_eq!(workspace.active_page().unwrap().title, "Local");

        assert!(workspace.accept_remote());
        assert_eq!(workspace.active_page().unwrap().title, "Remote");
        assert_eq!(workspace.tabs().page(id).unwrap().title, "Remote");
        assert!(!workspace.session().is_dirty());
    }

    #[tokio::test]
    async fn test_remote_delete_evicts_tab() {
        let (_, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();

        assert_eq!(workspace.handle_remote(PageChange::Deleted(id)), RemoteOutcome::Evicted);
        assert!(workspace.tabs().is_empty());
        assert!(workspace.active_page().is_none());

        assert_eq!(workspace.handle_remote(PageChange::Deleted(id)), RemoteOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_remote_update_for_background_tab() {
        let (store, _, mut workspace) = setup();
        let first = workspace.create_page("First").await.unwrap();
        workspace.create_page("Second").await.unwrap();

        let mut remote = store.get(first).await.unwrap();
        remote.title = "First (edited)".to_string();
        assert_eq!(
            workspace.handle_remote(PageChange::Updated(remote)),
            RemoteOutcome::Applied
        );
        assert_eq!(workspace.tabs().page(first).unwrap().title, "First (edited)");
        assert_eq!(workspace.active_page().unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_new_block_ids_are_deterministic() {
        let (_, _, mut a) = setup();
        let (_, _, mut b) = setup();

        let first = a.new_block(BlockType::Section);
        let second = a.new_block(BlockType::Section);
        assert_ne!(first.id, second.id);
        assert_eq!(b.new_block(BlockType::Section).id, first.id);

        b.restore_id_counters(a.id_counters().clone());
        let resumed = b.new_block(BlockType::Section);
        assert_ne!(resumed.id, second.id);
        assert_eq!(resumed.id, a.new_block(BlockType::Section).id);
    }

    #[tokio::test]
    async fn test_block_ids_continue_after_restart() {
        let (store, auth, mut first) = setup();
        let id = first.create_page("Home").await.unwrap();
        let block = first.new_block(BlockType::Text);
        first.session_mut().add_block(block).unwrap();
        first.save_active().await.unwrap();

        let stored = store.get(id).await.unwrap();
        assert_eq!(stored.metadata[COUNTERS_KEY], json!({ "text": 1 }));

        let mut restarted = Workspace::new(store.clone(), auth, EditorConfig::default());
        restarted.open_page(id).await.unwrap();
        assert!(restarted.active_page().unwrap().metadata.get(COUNTERS_KEY).is_none());

        let block = restarted.new_block(BlockType::Text);
        assert_eq!(restarted.session_mut().add_block(block), Ok(true));
        assert_eq!(restarted.id_counters().get(&BlockType::Text), Some(&2));
    }

    #[tokio::test]
    async fn test_new_block_skips_ids_on_page_without_counters() {
        let (store, _, mut workspace) = setup();
        let taken = IdGenerator::default().generate(BlockType::Image, 1).0;
        let page = Page::new("Imported").with_blocks(vec![Block::new(taken.clone(), BlockType::Image)]);
        store.insert(PageRecord::from_page(&page).unwrap()).await;

        workspace.open_page(page.id).await.unwrap();
        let block = workspace.new_block(BlockType::Image);
        assert_ne!(block.id, taken);
        assert_eq!(workspace.session_mut().add_block(block), Ok(true));
    }

    #[tokio::test]
    async fn test_save_finishing_after_tab_closed() {
        let (_, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();
        workspace.session_mut().set_title("Renamed").unwrap();
        let job = workspace.prepare_save().unwrap().unwrap();

        workspace.handle_remote(PageChange::Deleted(id));
        let outcome = workspace
            .finish_save(id, job.revision, Ok(SaveOutcome::Saved(job.record)))
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert!(!workspace.tabs().is_open(id));
        assert!(workspace.active_page().is_none());
    }

    #[tokio::test]
    async fn test_delete_page_blocks_later_saves() {
        let (store, _, mut workspace) = setup();
        let id = workspace.create_page("Home").await.unwrap();
        workspace.session_mut().set_title("Draft").unwrap();
        let job = workspace.prepare_save().unwrap().unwrap();

        workspace.delete_page(id).await.unwrap();
        let result = workspace
            .save_queue()
            .save(&*store, job.revision, job.record)
            .await;
        assert_eq!(result.unwrap(), SaveOutcome::Deleted);
        assert!(store.get(id).await.is_none());
    }
}
