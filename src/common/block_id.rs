//! Block identifier type.

use std::fmt;

use crate::common::config::BLOCK_SIZE;

/// Identifies a 512-byte block in the index file.
///
/// Block N lives at file offset `N × BLOCK_SIZE`. Id `0` is the header
/// block, which doubles as the null sentinel for node references: a child
/// or parent slot holding `BlockId::NULL` means "no node".
///
/// # Example
/// ```
/// use blocktree::BlockId;
///
/// let id = BlockId::new(3);
/// assert!(!id.is_null());
/// assert_eq!(id.offset(), 1536);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl BlockId {
    /// The "no node" sentinel (also the header block's id).
    pub const NULL: BlockId = BlockId(0);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u64) -> Self {
        BlockId(id)
    }

    /// Check whether this is the null sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Byte offset of this block in the file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 * BLOCK_SIZE as u64
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Block(NULL)")
        } else {
            write!(f, "Block({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_new() {
        let id = BlockId::new(42);
        assert_eq!(id.0, 42);
        assert!(!id.is_null());
    }

    #[test]
    fn test_block_id_null() {
        assert!(BlockId::NULL.is_null());
        assert_eq!(BlockId::NULL.0, 0);
        assert_eq!(BlockId::default(), BlockId::NULL);
    }

    #[test]
    fn test_block_id_offset() {
        assert_eq!(BlockId::new(0).offset(), 0);
        assert_eq!(BlockId::new(1).offset(), 512);
        assert_eq!(BlockId::new(10).offset(), 5120);
    }

    #[test]
    fn test_block_id_display() {
        assert_eq!(format!("{}", BlockId::new(42)), "Block(42)");
        assert_eq!(format!("{}", BlockId::NULL), "Block(NULL)");
    }
}
