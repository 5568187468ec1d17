//! # Document History
//!
//! Linear undo/redo over whole-page snapshots.
//!
//! ## Design
//!
//! - Every applied mutation records the resulting page as a new snapshot
//! - Undo/redo move a cursor over the snapshot sequence
//! - Recording after an undo discards every snapshot past the cursor
//! - Batches coalesce several records into one undo step (typing bursts)
//!
//! Snapshots are cheap: pages share unchanged block storage, so a snapshot
//! costs roughly the levels of the tree that the mutation touched.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(page);
//! history.record(mutation.apply(history.current())?);
//!
//! let previous = history.undo();
//! let again = history.redo();
//! ```

use vos_blocks::Page;

/// Default bound on undo levels (0 = unlimited)
///
/// A bounded history is opt-in: every recorded edit stays undoable unless a
/// limit is configured.
pub const DEFAULT_MAX_LEVELS: usize = 0;

#[derive(Debug, Clone)]
struct Snapshot {
    page: Page,

    /// Description of the edit that produced this snapshot
    description: Option<String>,
}

#[derive(Debug, Clone)]
struct Batch {
    description: Option<String>,

    /// Whether the batch already owns a snapshot
    started: bool,
}

/// Snapshot sequence plus cursor
///
/// The sequence is never empty: the cursor always points at the current page.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<Batch>,
}

impl History {
    /// Start a history at `page` with the default max levels
    pub fn new(page: Page) -> Self {
        Self::with_max_levels(page, DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(page: Page, max_levels: usize) -> Self {
        Self {
            snapshots: vec![Snapshot { page, description: None }],
            cursor: 0,
            max_levels,
            current_batch: None,
        }
    }

    /// Record `page` as the newest version
    pub fn record(&mut self, page: Page) {
        self.record_with_description(page, None);
    }

    /// Record `page`, labelling the step for undo/redo menus
    pub fn record_with_description(&mut self, page: Page, description: Option<String>) {
        // New action invalidates the future
        self.snapshots.truncate(self.cursor + 1);

        let mut description = description;
        if let Some(batch) = &mut self.current_batch {
            if batch.started {
                // Fold into the batch's snapshot
                self.snapshots[self.cursor].page = page;
                return;
            }
            batch.started = true;
            description = batch.description.clone().or(description);
        }

        self.snapshots.push(Snapshot { page, description });

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.snapshots.len() > self.max_levels + 1 {
            self.snapshots.remove(0);
        }

        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back; `None` when already at the oldest snapshot
    pub fn undo(&mut self) -> Option<&Page> {
        self.end_batch();
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward; `None` when already at the newest snapshot
    pub fn redo(&mut self) -> Option<&Page> {
        self.end_batch();
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Discard all history and start over at `page`
    pub fn reset(&mut self, page: Page) {
        self.snapshots.clear();
        self.snapshots.push(Snapshot { page, description: None });
        self.cursor = 0;
        self.current_batch = None;
    }

    pub fn current(&self) -> &Page {
        &self.snapshots[self.cursor].page
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len() - 1
    }

    /// Start a batch; records until [`History::end_batch`] form one undo step
    pub fn begin_batch(&mut self, description: Option<String>) {
        self.current_batch = Some(Batch {
            description,
            started: false,
        });
    }

    pub fn end_batch(&mut self) {
        self.current_batch = None;
    }

    pub fn in_batch(&self) -> bool {
        self.current_batch.is_some()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn undo_levels(&self) -> usize {
        self.cursor
    }

    pub fn redo_levels(&self) -> usize {
        self.snapshots.len() - 1 - self.cursor
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Description of the step the next undo would revert
    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.snapshots[self.cursor].description.as_deref()
    }

    /// Description of the step the next redo would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.snapshots
            .get(self.cursor + 1)
            .and_then(|s| s.description.as_deref())
    }
}
