//! Index layer - the B-tree engine.
//!
//! - [`BTreeIndex`] - insert/search/traverse over block-addressed nodes
//! - [`LoadReport`] - bulk-load outcome

mod btree;

pub use btree::{BTreeIndex, LoadReport};
