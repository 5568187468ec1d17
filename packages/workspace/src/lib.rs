//! # VOS Workspace
//!
//! Runs the block editor against persistent storage: loading pages into
//! tabs, saving and autosaving, publishing, and reacting to changes made by
//! other editors of the same page.
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryStore::new());
//! let auth = Arc::new(StaticAuth::signed_in(User::new("u1", "ada@example.com")));
//! let config = EditorConfig::load(".")?;
//!
//! let editor = EditorHandle::new(Workspace::new(store, auth, config));
//! let page = editor.create_page("Home").await?;
//! editor.lock().await.session_mut().set_title("Welcome")?;
//! editor.save_active().await?;
//! ```

pub mod auth;
pub mod autosave;
pub mod config;
pub mod handle;
pub mod logging;
pub mod memory_store;
pub mod publish;
pub mod save_queue;
pub mod store;
pub mod workspace;

pub use auth::{AuthProvider, StaticAuth, User};
pub use autosave::Autosave;
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use handle::EditorHandle;
pub use memory_store::MemoryStore;
pub use publish::{PublishError, Publisher, StorePublisher};
pub use save_queue::{SaveOutcome, SaveQueue};
pub use store::{PageChange, PageRecord, PageStore, StoreError};
pub use workspace::{LoadReport, RemoteOutcome, SaveJob, Workspace, WorkspaceError, COUNTERS_KEY};
