//! Storage layer - block I/O and on-disk formats.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - File lifecycle, raw block I/O, allocation
//! - [`Node`] - A B-tree node and its block codec
//! - [`FileHeader`] - Tree-wide metadata in block 0

mod block_store;
mod header;
mod node;

pub use block_store::BlockStore;
pub use header::FileHeader;
pub use node::Node;
