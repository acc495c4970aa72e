//! Common types and utilities shared across blocktree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - The block identifier

mod block_id;
pub mod config;
pub mod error;

pub use block_id::BlockId;
pub use error::{Error, Result};
