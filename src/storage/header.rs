//! File header - block 0 of every index file.
//!
//! ```text
//! Offset  Size            Field
//! ------  ----            -----
//! 0       8               magic ("4348PRJ3")
//! 8       8               root_id (u64, big-endian)
//! 16      8               next_block_id (u64, big-endian)
//! 24      488 (zeroes)    padding to 512
//! ```
//!
//! The header is the single source of truth for tree shape: every
//! externally-visible operation re-reads it first, and every mutation
//! writes it back last.

use crate::common::config::{BLOCK_SIZE, MAGIC};
use crate::common::{BlockId, Error, Result};

/// Tree-wide metadata persisted in block 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Root node's block id; null means the tree is empty.
    pub root_id: BlockId,
    /// Monotonic block allocator. Starts at 1 (block 0 is the header) and
    /// never reuses an id — there is no deletion, so no free list.
    pub next_block_id: u64,
}

const OFFSET_ROOT_ID: usize = 8;
const OFFSET_NEXT_BLOCK_ID: usize = 16;

impl FileHeader {
    /// Header of a freshly created, empty index.
    pub fn new() -> Self {
        Self {
            root_id: BlockId::NULL,
            next_block_id: 1,
        }
    }

    /// Encode the header as a full 512-byte block.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[..8].copy_from_slice(&MAGIC);
        buf[OFFSET_ROOT_ID..OFFSET_ROOT_ID + 8].copy_from_slice(&self.root_id.0.to_be_bytes());
        buf[OFFSET_NEXT_BLOCK_ID..OFFSET_NEXT_BLOCK_ID + 8]
            .copy_from_slice(&self.next_block_id.to_be_bytes());
        buf
    }

    /// Decode the header from block 0.
    ///
    /// Fails with [`Error::BadMagic`] unless the magic matches exactly.
    ///
    /// # Panics
    /// Panics if `data.len() < BLOCK_SIZE`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        assert!(data.len() >= BLOCK_SIZE, "buffer too small for header block");

        if data[..8] != MAGIC {
            return Err(Error::BadMagic);
        }

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[OFFSET_ROOT_ID..OFFSET_ROOT_ID + 8]);
        let root_id = BlockId::new(u64::from_be_bytes(bytes));
        bytes.copy_from_slice(&data[OFFSET_NEXT_BLOCK_ID..OFFSET_NEXT_BLOCK_ID + 8]);
        let next_block_id = u64::from_be_bytes(bytes);

        Ok(Self {
            root_id,
            next_block_id,
        })
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header() {
        let header = FileHeader::new();
        assert!(header.root_id.is_null());
        assert_eq!(header.next_block_id, 1);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = FileHeader {
            root_id: BlockId::new(7),
            next_block_id: 42,
        };
        let decoded = FileHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_byte_layout() {
        let header = FileHeader {
            root_id: BlockId::new(0x0102),
            next_block_id: 0x0304,
        };
        let buf = header.encode();

        assert_eq!(&buf[..8], b"4348PRJ3");
        assert_eq!(&buf[8..16], &[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(&buf[16..24], &[0, 0, 0, 0, 0, 0, 0x03, 0x04]);
        assert!(buf[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut buf = FileHeader::new().encode();
        buf[0] = b'X';

        match FileHeader::decode(&buf) {
            Err(Error::BadMagic) => {}
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }
}
