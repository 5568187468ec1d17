//! # Edit Session
//!
//! One open page plus its history. The session is the only way presentation
//! code changes the tree: each call applies a [`Mutation`], records the
//! result into [`History`] and then notifies observers.
//!
//! A session without a page ignores every edit (returns `Ok(false)`), so
//! editing surfaces can stay wired up while nothing is loaded.

use serde_json::Value;
use std::fmt;
use vos_blocks::{Block, BlockId, Page};

use crate::history::{History, DEFAULT_MAX_LEVELS};
use crate::{Mutation, MutationError};

/// Callback run with the current page after every change
pub type Observer = Box<dyn FnMut(&Page) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// What happened to a remote page update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpdate {
    /// The session had no unsaved edits and now shows the remote page
    Applied,

    /// Held back: local edits are unsaved. Resolve with
    /// [`EditSession::accept_remote`] or [`EditSession::keep_local`]
    Conflict,

    /// Not for the page this session is editing
    Ignored,
}

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    history: Option<History>,
    history_limit: usize,

    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,

    /// Increments on every change to the current page
    revision: u64,

    /// Last revision known to be persisted
    saved_revision: u64,

    pending_remote: Option<Page>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("page", &self.current_page().map(|p| p.id))
            .field("revision", &self.revision)
            .field("saved_revision", &self.saved_revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EditSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_history_limit(id, DEFAULT_MAX_LEVELS)
    }

    pub fn with_history_limit(id: impl Into<String>, history_limit: usize) -> Self {
        Self {
            id: id.into(),
            history: None,
            history_limit,
            observers: Vec::new(),
            next_observer: 0,
            revision: 0,
            saved_revision: 0,
            pending_remote: None,
        }
    }

    /// Open `page` for editing, discarding any previous history
    pub fn set_page(&mut self, page: Page) {
        tracing::debug!(session = %self.id, page = %page.id, "set page");
        match &mut self.history {
            Some(history) => history.reset(page),
            None => self.history = Some(History::with_max_levels(page, self.history_limit)),
        }
        self.revision += 1;
        self.saved_revision = self.revision;
        self.pending_remote = None;
        self.notify();
    }

    /// Close the current page
    pub fn clear(&mut self) {
        self.history = None;
        self.pending_remote = None;
        self.saved_revision = self.revision;
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.history.as_ref().map(History::current)
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Apply, record and notify
    ///
    /// Returns `Ok(false)` when no page is open. On error the page and its
    /// history are unchanged.
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, MutationError> {
        let Some(history) = &mut self.history else {
            tracing::debug!(session = %self.id, mutation = mutation.name(), "no page open, ignoring");
            return Ok(false);
        };

        let next = mutation.apply(history.current())?;
        history.record_with_description(next, Some(mutation.name().to_string()));
        tracing::debug!(session = %self.id, mutation = mutation.name(), cursor = history.cursor(), "applied");

        self.revision += 1;
        self.notify();
        Ok(true)
    }

    pub fn add_block(&mut self, block: Block) -> Result<bool, MutationError> {
        self.apply(Mutation::AddBlock { block })
    }

    pub fn update_block(&mut self, index: usize, block: Block) -> Result<bool, MutationError> {
        self.apply(Mutation::UpdateBlock { index, block })
    }

    pub fn remove_block(&mut self, index: usize) -> Result<bool, MutationError> {
        self.apply(Mutation::RemoveBlock { index })
    }

    pub fn move_block(&mut self, from: usize, to: usize) -> Result<bool, MutationError> {
        self.apply(Mutation::MoveBlock { from, to })
    }

    pub fn update_child(
        &mut self,
        parent: impl Into<BlockId>,
        index: usize,
        block: Block,
    ) -> Result<bool, MutationError> {
        self.apply(Mutation::UpdateChild {
            parent: parent.into(),
            index,
            block,
        })
    }

    pub fn insert_child(
        &mut self,
        parent: impl Into<BlockId>,
        index: usize,
        block: Block,
    ) -> Result<bool, MutationError> {
        self.apply(Mutation::InsertChild {
            parent: parent.into(),
            index,
            block,
        })
    }

    pub fn remove_child(
        &mut self,
        parent: impl Into<BlockId>,
        index: usize,
    ) -> Result<bool, MutationError> {
        self.apply(Mutation::RemoveChild {
            parent: parent.into(),
            index,
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<bool, MutationError> {
        self.apply(Mutation::SetTitle { title: title.into() })
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) -> Result<bool, MutationError> {
        self.apply(Mutation::SetMetadata {
            key: key.into(),
            value,
        })
    }

    /// Undo the most recent step; false if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        let moved = self.history.as_mut().is_some_and(|h| h.undo().is_some());
        if moved {
            self.revision += 1;
            self.notify();
        }
        moved
    }

    /// Redo the most recently undone step; false if there was nothing to redo
    pub fn redo(&mut self) -> bool {
        let moved = self.history.as_mut().is_some_and(|h| h.redo().is_some());
        if moved {
            self.revision += 1;
            self.notify();
        }
        moved
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(History::can_redo)
    }

    /// Group following edits into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        if let Some(history) = &mut self.history {
            history.begin_batch(Some(description.into()));
        }
    }

    pub fn end_batch(&mut self) {
        if let Some(history) = &mut self.history {
            history.end_batch();
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the current page has changes newer than the last save
    pub fn is_dirty(&self) -> bool {
        self.history.is_some() && self.revision != self.saved_revision
    }

    /// Record that the page as of `revision` has been persisted
    pub fn mark_saved(&mut self, revision: u64) {
        if revision > self.saved_revision {
            self.saved_revision = revision;
        }
    }

    /// Offer a page that changed remotely
    pub fn apply_remote(&mut self, page: Page) -> RemoteUpdate {
        let Some(current) = self.current_page() else {
            return RemoteUpdate::Ignored;
        };
        if current.id != page.id {
            return RemoteUpdate::Ignored;
        }

        if self.is_dirty() {
            tracing::warn!(session = %self.id, page = %page.id, "remote change conflicts with unsaved edits");
            self.pending_remote = Some(page);
            RemoteUpdate::Conflict
        } else {
            tracing::info!(session = %self.id, page = %page.id, "applying remote change");
            self.set_page(page);
            RemoteUpdate::Applied
        }
    }

    pub fn pending_remote(&self) -> Option<&Page> {
        self.pending_remote.as_ref()
    }

    /// Resolve a conflict by discarding local edits in favour of the remote page
    pub fn accept_remote(&mut self) -> bool {
        match self.pending_remote.take() {
            Some(page) => {
                self.set_page(page);
                true
            }
            None => false,
        }
    }

    /// Resolve a conflict by keeping local edits; the next save overwrites
    pub fn keep_local(&mut self) -> bool {
        self.pending_remote.take().is_some()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Page) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        if let Some(history) = &self.history {
            let page = history.current();
            for (_, observer) in &mut self.observers {
                observer(page);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use vos_blocks::BlockType;

    #[test]
    fn test_session_creation() {
        let session = EditSession::new("client-1");

        assert_eq!(session.id, "client-1");
        assert!(session.current_page().is_none());
        assert!(!session.can_undo());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_mutations_without_page_are_noops() {
        let mut session = EditSession::new("client-1");

        assert_eq!(session.add_block(Block::text("a", "hi")), Ok(false));
        assert_eq!(session.remove_block(3), Ok(false));
        assert!(!session.undo());
        assert!(!session.redo());
        assert!(session.current_page().is_none());
    }

    #[test]
    fn test_failed_mutation_keeps_state() {
        let mut session = EditSession::new("client-1");
        session.set_page(Page::new("Home"));
        session.add_block(Block::text("a", "hi")).unwrap();
        let revision = session.revision();

        let err = session.remove_block(5).unwrap_err();
        assert_eq!(err, MutationError::IndexOutOfRange { index: 5, len: 1 });
        assert_eq!(session.revision(), revision);
        assert_eq!(session.history().unwrap().undo_levels(), 1);
    }

    #[test]
    fn test_observers_see_each_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = EditSession::new("client-1");

        let sink = seen.clone();
        let id = session.subscribe(move |page: &Page| sink.lock().unwrap().push(page.blocks.len()));

        session.set_page(Page::new("Home"));
        session.add_block(Block::text("a", "hi")).unwrap();
        session.add_block(Block::new("b", BlockType::Image)).unwrap();
        session.undo();

        assert!(session.unsubscribe(id));
        session.redo();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut session = EditSession::new("client-1");
        session.set_page(Page::new("Home"));
        assert!(!session.is_dirty());

        session.add_block(Block::text("a", "hi")).unwrap();
        assert!(session.is_dirty());

        let saved_at = session.revision();
        session.add_block(Block::text("b", "there")).unwrap();
        session.mark_saved(saved_at);
        assert!(session.is_dirty());

        session.mark_saved(session.revision());
        assert!(!session.is_dirty());

        // Stale acknowledgements never roll back
        session.mark_saved(saved_at);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_remote_update_applies_when_clean() {
        let page = Page::new("Home");
        let mut session = EditSession::new("client-1");
        session.set_page(page.clone());
        session.add_block(Block::text("a", "hi")).unwrap();
        session.mark_saved(session.revision());

        let mut remote = page.clone();
        remote.title = "Remote".into();
        assert_eq!(session.apply_remote(remote), RemoteUpdate::Applied);
        assert_eq!(session.current_page().unwrap().title, "Remote");
        assert!(!session.can_undo());
    }

    #[test]
    fn test_remote_update_conflicts_when_dirty() {
        let page = Page::new("Home");
        let mut session = EditSession::new("client-1");
        session.set_page(page.clone());
        session.add_block(Block::text("a", "local")).unwrap();

        let mut remote = page.clone();
        remote.title = "Remote".into();
        assert_eq!(session.apply_remote(remote.clone()), RemoteUpdate::Conflict);
        assert_eq!(session.current_page().unwrap().blocks.len(), 1);
        assert!(session.pending_remote().is_some());

        assert!(session.keep_local());
        assert!(session.pending_remote().is_none());
        assert!(session.is_dirty());

        session.apply_remote(remote);
        assert!(session.accept_remote());
        assert_eq!(session.current_page().unwrap().title, "Remote");
        assert!(!session.is_dirty());

        assert_eq!(session.apply_remote(Page::new("Elsewhere")), RemoteUpdate::Ignored);
    }

    #[test]
    fn test_batch_is_one_undo_step() {
        let mut session = EditSession::new("client-1");
        session.set_page(Page::new("Home"));
        session.add_block(Block::text("a", "")).unwrap();

        session.begin_batch("Type text");
        for text in ["H", "He", "Hey"] {
            session.update_block(0, Block::text("a", text)).unwrap();
        }
        session.end_batch();

        assert_eq!(session.history().unwrap().undo_description(), Some("Type text"));
        session.undo();
        assert_eq!(session.current_page().unwrap().blocks.get(0).unwrap().content.as_deref(), Some(""));
    }

    #[test]
    fn test_every_mutation_is_undoable_by_default() {
        let mut session = EditSession::new("client-1");
        session.set_page(Page::new("Home"));

        for i in 0..101 {
            session.add_block(Block::text(format!("b{}", i), "")).unwrap();
        }

        let mut undos = 0;
        while session.undo() {
            undos += 1;
        }
        assert_eq!(undos, 101);
        assert!(session.current_page().unwrap().blocks.is_empty());
    }
}
