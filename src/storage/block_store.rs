//! Block Store - file lifecycle, block I/O, allocation, header persistence.
//!
//! The [`BlockStore`] owns the backing file and the node cache. All node
//! reads go through the cache; all node writes go to disk first and then
//! refresh the cache (write-through).

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::cache::NodeCache;
use crate::common::config::{degree_fits, BLOCK_SIZE, MIN_DEGREE};
use crate::common::{BlockId, Error, Result};
use crate::storage::{FileHeader, Node};

/// Manages block I/O for a single index file.
///
/// # File Layout
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┐
/// │ Block 0  │ Block 1 │  ...    │ Block N │
/// │ (header) │ (node)  │         │ (node)  │
/// └──────────┴─────────┴─────────┴─────────┘
/// Offset:  0      512     ...      N×512
/// ```
///
/// # File handle lifecycle
/// The store keeps the path, not an open handle: each read or write opens
/// the file, performs one seek-and-transfer, and closes it. One operation
/// runs at a time — there is no locking and no multi-writer protocol.
pub struct BlockStore {
    path: PathBuf,
    cache: NodeCache,
}

impl BlockStore {
    /// Create a new index file.
    ///
    /// Writes the initial header block (`root_id = 0`, `next_block_id = 1`)
    /// as the entire file content.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if the path already exists — there
    /// is no silent overwrite.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // The compile-time assertion in `config` already guarantees this;
        // re-checked here so a reconfigured degree fails at creation time
        // instead of producing an undecodable file.
        if !degree_fits(MIN_DEGREE) {
            return Err(Error::InvalidInput(format!(
                "minimum degree {} does not fit a {}-byte block",
                MIN_DEGREE, BLOCK_SIZE
            )));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    Error::AlreadyExists(path.clone())
                } else {
                    Error::Io(e)
                }
            })?;

        file.write_all(&FileHeader::new().encode())?;

        Ok(Self {
            path,
            cache: NodeCache::new(),
        })
    }

    /// Open an existing index file, validating the header magic.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the path does not exist and
    /// [`Error::BadMagic`] if block 0 is not a blocktree header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::FileNotFound(path));
        }

        let store = Self {
            path,
            cache: NodeCache::new(),
        };
        store.read_header()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one raw 512-byte block.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedBlock`] if fewer than 512 bytes come back;
    /// a short read means the file is corrupt and the operation must abort.
    pub fn read_block(&self, id: BlockId) -> Result<[u8; BLOCK_SIZE]> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(id.offset()))?;

        let mut buf = [0u8; BLOCK_SIZE];
        file.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::TruncatedBlock(id.0)
            } else {
                Error::Io(e)
            }
        })?;
        Ok(buf)
    }

    /// Write one raw 512-byte block.
    ///
    /// The block must lie within the file or start exactly at its end —
    /// growth happens only via sequential allocation, never via a seek
    /// past EOF.
    pub fn write_block(&self, id: BlockId, block: &[u8; BLOCK_SIZE]) -> Result<()> {
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;

        if id.offset() > file.metadata()?.len() {
            return Err(Error::BlockOutOfRange(id.0));
        }

        file.seek(SeekFrom::Start(id.offset()))?;
        file.write_all(block)?;
        Ok(())
    }

    /// Read the header from block 0.
    pub fn read_header(&self) -> Result<FileHeader> {
        FileHeader::decode(&self.read_block(BlockId::NULL)?)
    }

    /// Persist the header to block 0.
    pub fn write_header(&self, header: &FileHeader) -> Result<()> {
        self.write_block(BlockId::NULL, &header.encode())
    }

    /// Read and decode a node, consulting the cache first.
    pub fn read_node(&mut self, id: BlockId) -> Result<Node> {
        if let Some(node) = self.cache.get(id) {
            return Ok(node);
        }

        let node = Node::decode(&self.read_block(id)?)?;
        self.cache.put(node.clone());
        Ok(node)
    }

    /// Encode and persist a node, then refresh the cache entry.
    ///
    /// Disk first, cache second: eviction can never lose state.
    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        self.write_block(node.block_id, &node.encode())?;
        self.cache.put(node.clone());
        Ok(())
    }

    /// Allocate a fresh node at `header.next_block_id`.
    ///
    /// The node block and the updated header are both persisted before
    /// returning, so the allocator state is durable before the caller
    /// proceeds. Ids are never reused.
    pub fn allocate_node(
        &mut self,
        header: &mut FileHeader,
        parent_id: BlockId,
        is_leaf: bool,
    ) -> Result<Node> {
        let id = BlockId::new(header.next_block_id);
        header.next_block_id += 1;

        let node = Node::new(id, parent_id, is_leaf);
        self.write_node(&node)?;
        self.write_header(header)?;
        Ok(node)
    }
}
