//! Configuration constants for blocktree.

/// Size of a block in bytes (512B).
///
/// Every unit of file I/O is exactly one block. Block N lives at file
/// offset `N × BLOCK_SIZE`, so the file length is always a multiple of 512.
pub const BLOCK_SIZE: usize = 512;

/// Magic constant at the start of block 0.
///
/// Checked byte-for-byte on open; a mismatch means the file is not a
/// blocktree index and is rejected before any node is decoded.
pub const MAGIC: [u8; 8] = *b"4348PRJ3";

/// Minimum degree `t` of the B-tree.
///
/// Fixed at index-creation time and shared by every node in a file. A node
/// holds between `t - 1` and `2t - 1` keys (the root may hold fewer).
pub const MIN_DEGREE: usize = 10;

/// Maximum keys per node (`2t - 1`).
pub const MAX_KEYS: usize = 2 * MIN_DEGREE - 1;

/// Maximum children per node (`2t`).
pub const MAX_CHILDREN: usize = 2 * MIN_DEGREE;

/// Capacity of the in-memory node cache.
pub const NODE_CACHE_CAPACITY: usize = 4;

/// Serialized size of a node with minimum degree `t`.
///
/// Three u64 header fields, then keys, values, and children, all u64:
/// `24 + 16·(2t−1) + 8·(2t)` bytes.
pub const fn node_layout_size(t: usize) -> usize {
    24 + 16 * (2 * t - 1) + 8 * (2 * t)
}

/// A degree is usable iff its node layout fits in one block.
pub const fn degree_fits(t: usize) -> bool {
    t >= 2 && node_layout_size(t) <= BLOCK_SIZE
}

// The configured degree must fit; t = 10 uses 488 of 512 bytes.
const _: () = assert!(degree_fits(MIN_DEGREE));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        assert_eq!(MAX_KEYS, 19);
        assert_eq!(MAX_CHILDREN, 20);
        assert_eq!(node_layout_size(MIN_DEGREE), 488);
        assert!(node_layout_size(MIN_DEGREE) <= BLOCK_SIZE);
    }

    #[test]
    fn test_degree_bounds() {
        assert!(degree_fits(2));
        assert!(degree_fits(10));
        // t = 21 needs 24 + 16*41 + 8*42 = 1016 bytes
        assert!(!degree_fits(21));
        assert!(!degree_fits(1));
    }

    #[test]
    fn test_magic_is_eight_bytes() {
        assert_eq!(MAGIC.len(), 8);
    }
}
