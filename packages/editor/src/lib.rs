//! # VOS Editor
//!
//! Block tree editing engine for the VOS page editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ blocks: Page, Block tree, styles, ids       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: editing model                       │
//! │  - Mutations with validation                │
//! │  - Snapshot history (undo/redo)             │
//! │  - Edit session + observers                 │
//! │  - Tabs for concurrently open pages         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: store, autosave, publishing      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Versions are immutable**: a mutation derives a new page, it never
//!    edits one already captured in history
//! 2. **Mutation and record are atomic**: either both happen or neither
//! 3. **Linear history**: editing after undo discards the redo branch
//! 4. **Explicit context**: sessions and tabs are plain values owned by the
//!    caller, not globals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vos_blocks::{Block, Page};
//! use vos_editor::EditSession;
//!
//! let mut session = EditSession::new("admin");
//! session.set_page(Page::new("Home"));
//!
//! session.add_block(Block::text("intro", "<p>Hello</p>"))?;
//! session.move_block(0, 0)?;
//! session.undo();
//! ```

mod errors;
mod history;
mod mutations;
mod session;
mod tabs;

pub use errors::{EditorError, MutationError, TabError};
pub use history::{History, DEFAULT_MAX_LEVELS};
pub use mutations::Mutation;
pub use session::{EditSession, Observer, ObserverId, RemoteUpdate};
pub use tabs::TabManager;

// Re-export model types for convenience
pub use vos_blocks::{Block, BlockId, BlockType, Page, PageId};
