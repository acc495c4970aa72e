//! Node cache - a bounded, write-through map of decoded nodes.
//!
//! Sits between the tree engine and raw block I/O: the [`BlockStore`]
//! consults the cache before touching the file. Because every node write
//! goes to disk before the cache entry is refreshed, eviction can never
//! lose unpersisted state, so the eviction order is not correctness
//! critical — insertion-order FIFO keeps the structure obvious.
//!
//! [`BlockStore`]: crate::storage::BlockStore

use std::collections::{HashMap, VecDeque};

use crate::common::config::NODE_CACHE_CAPACITY;
use crate::common::BlockId;
use crate::storage::Node;

/// A fixed-capacity map from block id to decoded node.
///
/// Entries are copies by value: a cached node mirrors what is on disk, and
/// mutations become visible only after an explicit write through the store
/// upserts the entry.
pub struct NodeCache {
    /// Cached nodes keyed by block id.
    map: HashMap<BlockId, Node>,

    /// Ids in insertion order (front = oldest = next eviction victim).
    order: VecDeque<BlockId>,

    /// Maximum number of entries, never exceeded.
    capacity: usize,
}

impl NodeCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(NODE_CACHE_CAPACITY)
    }

    /// Create a cache bounded to `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up a node, returning a copy without touching disk.
    pub fn get(&self, id: BlockId) -> Option<Node> {
        self.map.get(&id).cloned()
    }

    /// Insert or refresh the entry for `node.block_id`.
    ///
    /// The caller must already have persisted the node; the cache only
    /// mirrors disk. If the id is new and the cache is full, the oldest
    /// entry is evicted first.
    pub fn put(&mut self, node: Node) {
        let id = node.block_id;

        if self.map.contains_key(&id) {
            // Refresh of a resident entry; insertion order unchanged.
            self.map.insert(id, node);
            return;
        }

        if self.map.len() >= self.capacity {
            if let Some(victim) = self.order.pop_front() {
                self.map.remove(&victim);
            }
        }
        self.map.insert(id, node);
        self.order.push_back(id);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}
