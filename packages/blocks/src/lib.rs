//! # VOS Blocks
//!
//! The document model edited by the VOS page editor.
//!
//! A [`Page`] owns an ordered forest of [`Block`]s. Container-like blocks own
//! their children exclusively, so the forest is always a finite tree. Every
//! block carries a base style map plus optional tablet and mobile overrides.
//!
//! ## Structural sharing
//!
//! Block sequences are stored in a [`BlockList`], a reference-counted vector
//! of reference-counted blocks. Cloning a page is O(1) and editing one level
//! of the tree only copies that level's pointer vector, which keeps
//! whole-document history snapshots cheap.
//!
//! ```rust,ignore
//! use vos_blocks::{Block, BlockType, Page, IdGenerator};
//!
//! let mut ids = IdGenerator::default();
//! let (id, _meta) = ids.next(BlockType::Text);
//!
//! let mut page = Page::new("About us");
//! page.blocks.push(Block::text(id, "<p>Hello</p>"));
//! ```

pub mod block;
pub mod codec;
pub mod id_generator;
pub mod page;
pub mod style;
mod style_lexer;

pub use block::{Block, BlockId, BlockList, BlockType};
pub use codec::{decode_blocks, encode_blocks, CodecError};
pub use id_generator::{generate_id, BlockCounters, IdGenerator, IdMetadata, DEFAULT_NAMESPACE};
pub use page::{slugify, Page, PageId};
pub use style::{
    Breakpoint, LengthUnit, StyleError, StyleMap, StyleProperty, StyleValue, Styles, ValueKind,
};
