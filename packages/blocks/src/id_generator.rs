use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::block::{BlockId, BlockType};

/// Namespace used for block ids unless the editor is configured otherwise
pub const DEFAULT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1d_2c4e_8b3a_5d7f_9e0a_1b2c_3d4e_5f60);

/// What an id was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMetadata {
    pub block_type: BlockType,
    pub ordinal: u64,
    pub created_at: DateTime<Utc>,
}

/// Derive a block id from `(type, ordinal)` in the default namespace
///
/// Same inputs always yield the same id, so re-creating or importing a block
/// with a known ordinal is idempotent.
pub fn generate_id(block_type: BlockType, ordinal: u64) -> (BlockId, IdMetadata) {
    generate_in(&DEFAULT_NAMESPACE, block_type, ordinal)
}

fn generate_in(namespace: &Uuid, block_type: BlockType, ordinal: u64) -> (BlockId, IdMetadata) {
    let name = format!("{}-{}", block_type, ordinal);
    let id = Uuid::new_v5(namespace, name.as_bytes());
    let meta = IdMetadata {
        block_type,
        ordinal,
        created_at: Utc::now(),
    };
    (BlockId::from(id), meta)
}

/// Per-type instance counters, persisted across editing sessions
pub type BlockCounters = BTreeMap<BlockType, u64>;

/// Counter-backed block id generator
#[derive(Debug, Clone)]
pub struct IdGenerator {
    namespace: Uuid,
    counters: BlockCounters,
}

impl IdGenerator {
    pub fn new(namespace: Uuid) -> Self {
        Self::with_counters(namespace, BlockCounters::new())
    }

    /// Resume from previously persisted counters
    pub fn with_counters(namespace: Uuid, counters: BlockCounters) -> Self {
        Self { namespace, counters }
    }

    /// Advance the counter for `block_type` and derive the next id
    pub fn next(&mut self, block_type: BlockType) -> (BlockId, IdMetadata) {
        let counter = self.counters.entry(block_type).or_insert(0);
        *counter += 1;
        let ordinal = *counter;
        generate_in(&self.namespace, block_type, ordinal)
    }

    /// Like [`IdGenerator::next`], skipping ordinals whose id is already `taken`
    pub fn next_free(
        &mut self,
        block_type: BlockType,
        taken: impl Fn(&BlockId) -> bool,
    ) -> (BlockId, IdMetadata) {
        loop {
            let (id, meta) = self.next(block_type);
            if !taken(&id) {
                return (id, meta);
            }
        }
    }

    /// Raise each counter to at least the value in `counters`
    pub fn absorb(&mut self, counters: &BlockCounters) {
        for (block_type, ordinal) in counters {
            let counter = self.counters.entry(*block_type).or_insert(0);
            *counter = (*counter).max(*ordinal);
        }
    }

    /// Derive the id for an explicit ordinal without touching counters
    pub fn generate(&self, block_type: BlockType, ordinal: u64) -> (BlockId, IdMetadata) {
        generate_in(&self.namespace, block_type, ordinal)
    }

    /// Last ordinal issued for `block_type`
    pub fn current(&self, block_type: BlockType) -> u64 {
        self.counters.get(&block_type).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> &BlockCounters {
        &self.counters
    }

    pub fn namespace(&self) -> &Uuid {
        &self.namespace
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
