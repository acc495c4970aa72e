//! blocktree - a single-file, disk-resident B-tree index.
//!
//! Maps u64 keys to u64 values, persisting the tree as fixed 512-byte
//! blocks in one file. Nodes reference each other by block id — every
//! "pointer" is a lookup into the block store, never an in-memory
//! reference, matching the persisted representation exactly.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                blocktree                      │
//! ├───────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────┐  │
//! │  │          Index Layer (index/)           │  │
//! │  │   BTreeIndex: insert/split/search/      │  │
//! │  │   traverse + bulk load + extract        │  │
//! │  └─────────────────────────────────────────┘  │
//! │                      ↓                        │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │        Storage Layer (storage/)         │  │
//! │  │  BlockStore + Node codec + FileHeader   │  │
//! │  │     ┌───────────────────────────┐       │  │
//! │  │     │  NodeCache (cache/)       │       │  │
//! │  │     │  write-through, 4 entries │       │  │
//! │  │     └───────────────────────────┘       │  │
//! │  └─────────────────────────────────────────┘  │
//! │                      ↓                        │
//! │            one file, 512B blocks              │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Block I/O and on-disk formats
//! - [`cache`] - Bounded write-through node cache
//! - [`index`] - The B-tree engine
//!
//! # Quick Start
//! ```no_run
//! use blocktree::BTreeIndex;
//!
//! let mut index = BTreeIndex::create("idx.dat").unwrap();
//! index.insert(5, 50).unwrap();
//! index.insert(3, 30).unwrap();
//!
//! assert_eq!(index.search(3).unwrap(), Some((3, 30)));
//! index.traverse(|key, value| {
//!     println!("{},{}", key, value);
//!     Ok(())
//! }).unwrap();
//! ```

pub mod cache;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use cache::NodeCache;
pub use common::config::{BLOCK_SIZE, MAX_CHILDREN, MAX_KEYS, MIN_DEGREE};
pub use common::{BlockId, Error, Result};
pub use index::{BTreeIndex, LoadReport};
pub use storage::{BlockStore, FileHeader, Node};
