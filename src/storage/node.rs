//! Node - one B-tree node and its on-disk block codec.
//!
//! A [`Node`] occupies exactly one 512-byte block. All fields are u64,
//! big-endian, packed contiguously with no padding:
//!
//! ```text
//! Offset  Size           Field
//! ------  ----           -----
//! 0       8              block_id
//! 8       8              parent_id
//! 16      8              num_keys
//! 24      8 × 19         keys
//! 176     8 × 19         values
//! 328     8 × 20         children
//! 488     24 (zeroes)    padding to 512
//! ```
//!
//! Leafness is *not* stored. A node is a leaf iff every child slot in
//! `0..=num_keys` is the null sentinel, and [`Node::decode`] re-derives
//! that on every read. Unused key/value/child slots are always zero on
//! disk.

use crate::common::config::{BLOCK_SIZE, MAX_CHILDREN, MAX_KEYS};
use crate::common::{BlockId, Error, Result};

/// A decoded B-tree node.
///
/// Nodes are transient copies: the engine decodes one, mutates it, and must
/// explicitly write it back through the [`BlockStore`] for the change to
/// become visible to later reads. Parent/child relationships are block ids
/// into the store, never in-memory references.
///
/// [`BlockStore`]: crate::storage::BlockStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Position of this node in the file (`block_id × 512` = byte offset).
    pub block_id: BlockId,
    /// The parent's block id, or null for the root.
    pub parent_id: BlockId,
    /// Derived on decode, never serialized.
    pub is_leaf: bool,
    /// Count of populated key/value slots.
    pub num_keys: usize,
    /// Keys, strictly ascending in `0..num_keys`.
    pub keys: [u64; MAX_KEYS],
    /// `values[i]` is the payload for `keys[i]`.
    pub values: [u64; MAX_KEYS],
    /// Child block ids; slots `0..=num_keys` are live for an internal node.
    pub children: [BlockId; MAX_CHILDREN],
}

/// Field offsets within a node block.
const OFFSET_BLOCK_ID: usize = 0;
const OFFSET_PARENT_ID: usize = 8;
const OFFSET_NUM_KEYS: usize = 16;
const OFFSET_KEYS: usize = 24;
const OFFSET_VALUES: usize = OFFSET_KEYS + 8 * MAX_KEYS;
const OFFSET_CHILDREN: usize = OFFSET_VALUES + 8 * MAX_KEYS;

#[inline]
fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
}

#[inline]
fn get_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

impl Node {
    /// Create a new empty node.
    pub fn new(block_id: BlockId, parent_id: BlockId, is_leaf: bool) -> Self {
        Self {
            block_id,
            parent_id,
            is_leaf,
            num_keys: 0,
            keys: [0; MAX_KEYS],
            values: [0; MAX_KEYS],
            children: [BlockId::NULL; MAX_CHILDREN],
        }
    }

    /// Whether this node holds the maximum `2t - 1` keys.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_keys == MAX_KEYS
    }

    /// Encode this node as a full 512-byte block.
    ///
    /// Always emits all slots; unused slots are zero by invariant.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];

        put_u64(&mut buf, OFFSET_BLOCK_ID, self.block_id.0);
        put_u64(&mut buf, OFFSET_PARENT_ID, self.parent_id.0);
        put_u64(&mut buf, OFFSET_NUM_KEYS, self.num_keys as u64);

        for i in 0..MAX_KEYS {
            put_u64(&mut buf, OFFSET_KEYS + 8 * i, self.keys[i]);
            put_u64(&mut buf, OFFSET_VALUES + 8 * i, self.values[i]);
        }
        for i in 0..MAX_CHILDREN {
            put_u64(&mut buf, OFFSET_CHILDREN + 8 * i, self.children[i].0);
        }

        buf
    }

    /// Decode a node from a 512-byte block.
    ///
    /// Re-derives `is_leaf` from the child slots — it is never read from
    /// the block directly. Fails with a format error if the stored key
    /// count exceeds the fan-out limit.
    ///
    /// # Panics
    /// Panics if `data.len() < BLOCK_SIZE`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        assert!(data.len() >= BLOCK_SIZE, "buffer too small for node block");

        let block_id = BlockId::new(get_u64(data, OFFSET_BLOCK_ID));
        let parent_id = BlockId::new(get_u64(data, OFFSET_PARENT_ID));

        let num_keys = get_u64(data, OFFSET_NUM_KEYS);
        if num_keys > MAX_KEYS as u64 {
            return Err(Error::CorruptBlock(block_id.0));
        }
        let num_keys = num_keys as usize;

        let mut keys = [0u64; MAX_KEYS];
        let mut values = [0u64; MAX_KEYS];
        let mut children = [BlockId::NULL; MAX_CHILDREN];

        for i in 0..MAX_KEYS {
            keys[i] = get_u64(data, OFFSET_KEYS + 8 * i);
            values[i] = get_u64(data, OFFSET_VALUES + 8 * i);
        }
        for (i, child) in children.iter_mut().enumerate() {
            *child = BlockId::new(get_u64(data, OFFSET_CHILDREN + 8 * i));
        }

        // A node is a leaf iff every live child slot is null.
        let is_leaf = children[..=num_keys].iter().all(BlockId::is_null);

        Ok(Self {
            block_id,
            parent_id,
            is_leaf,
            num_keys,
            keys,
            values,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(OFFSET_KEYS, 24);
        assert_eq!(OFFSET_VALUES, 176);
        assert_eq!(OFFSET_CHILDREN, 328);
        assert_eq!(OFFSET_CHILDREN + 8 * MAX_CHILDREN, 488);
    }

    #[test]
    fn test_empty_node_roundtrip() {
        let node = Node::new(BlockId::new(1), BlockId::NULL, true);
        let decoded = Node::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert!(decoded.is_leaf);
    }

    #[test]
    fn test_leaf_roundtrip() {
        let mut node = Node::new(BlockId::new(3), BlockId::new(1), true);
        node.keys[0] = 5;
        node.values[0] = 50;
        node.keys[1] = 9;
        node.values[1] = 90;
        node.num_keys = 2;

        let decoded = Node::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert!(decoded.is_leaf);
    }

    #[test]
    fn test_internal_roundtrip() {
        let mut node = Node::new(BlockId::new(2), BlockId::NULL, false);
        node.keys[0] = 100;
        node.values[0] = 1000;
        node.num_keys = 1;
        node.children[0] = BlockId::new(1);
        node.children[1] = BlockId::new(3);

        let decoded = Node::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert!(!decoded.is_leaf);
    }

    #[test]
    fn test_leafness_is_derived_not_stored() {
        // Same bytes, flipped in-memory flag: the decoded node trusts the
        // child slots, not the flag the encoder started from.
        let mut node = Node::new(BlockId::new(2), BlockId::NULL, true);
        node.keys[0] = 7;
        node.values[0] = 70;
        node.num_keys = 1;
        node.children[0] = BlockId::new(4);
        node.children[1] = BlockId::new(5);

        let decoded = Node::decode(&node.encode()).unwrap();
        assert!(!decoded.is_leaf);
    }

    #[test]
    fn test_exact_byte_layout() {
        let mut node = Node::new(BlockId::new(0x0102), BlockId::new(0x03), false);
        node.keys[0] = 0x0405;
        node.values[0] = 0x0607;
        node.num_keys = 1;
        node.children[0] = BlockId::new(0x08);
        node.children[1] = BlockId::new(0x09);

        let buf = node.encode();
        assert_eq!(buf.len(), BLOCK_SIZE);

        // Big-endian u64s at fixed offsets.
        assert_eq!(&buf[0..8], &[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(&buf[8..16], &[0, 0, 0, 0, 0, 0, 0, 0x03]);
        assert_eq!(&buf[16..24], &[0, 0, 0, 0, 0, 0, 0, 0x01]);
        assert_eq!(&buf[24..32], &[0, 0, 0, 0, 0, 0, 0x04, 0x05]);
        assert_eq!(&buf[176..184], &[0, 0, 0, 0, 0, 0, 0x06, 0x07]);
        assert_eq!(&buf[328..336], &[0, 0, 0, 0, 0, 0, 0, 0x08]);
        assert_eq!(&buf[336..344], &[0, 0, 0, 0, 0, 0, 0, 0x09]);

        // Tail past the layout is zero-filled.
        assert!(buf[488..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_rejects_bad_key_count() {
        let mut node = Node::new(BlockId::new(1), BlockId::NULL, true);
        node.num_keys = 1;
        let mut buf = node.encode();
        // Overwrite num_keys with a count past the fan-out limit.
        buf[16..24].copy_from_slice(&(MAX_KEYS as u64 + 1).to_be_bytes());

        match Node::decode(&buf) {
            Err(Error::CorruptBlock(1)) => {}
            other => panic!("expected CorruptBlock, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            block_id in 1u64..1000,
            parent_id in 0u64..1000,
            num_keys in 0usize..=MAX_KEYS,
            seed in any::<u64>(),
            internal in any::<bool>(),
        ) {
            // Build a structurally valid node: ascending keys, live child
            // slots either all null (leaf) or all non-null (internal),
            // unused slots zero.
            let mut node = Node::new(
                BlockId::new(block_id),
                BlockId::new(parent_id),
                !internal,
            );
            node.num_keys = num_keys;
            for i in 0..num_keys {
                node.keys[i] = seed.wrapping_add(i as u64 * 3) % 10_000 + i as u64 * 10_000;
                node.values[i] = seed.wrapping_mul(i as u64 + 1);
            }
            if internal {
                for i in 0..=num_keys {
                    node.children[i] = BlockId::new(block_id + 1 + i as u64);
                }
            }

            let decoded = Node::decode(&node.encode()).unwrap();
            prop_assert_eq!(&decoded, &node);
            prop_assert_eq!(decoded.is_leaf, !internal);
        }
    }
}
