//! B-tree index engine.
//!
//! All tree structure lives on disk: nodes reference each other by block
//! id, and every read or write goes through the [`BlockStore`]. The header
//! (root id, next block id) is re-read at the start of every operation and
//! written back after every structural mutation.
//!
//! Insertion uses proactive splitting: a full child is split *before* the
//! descent enters it, so a promoted median always finds room in its parent.

use std::fs::OpenOptions;
use std::io::{BufRead, BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::common::config::{MAX_KEYS, MIN_DEGREE};
use crate::common::{BlockId, Error, Result};
use crate::storage::{BlockStore, FileHeader, Node};

/// Outcome of a bulk load: how many records went in, and which lines were
/// skipped as malformed (1-based line number plus the offending text).
#[derive(Debug, Default)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: Vec<(usize, String)>,
}

/// A single-file B-tree index mapping u64 keys to u64 values.
///
/// # Example
/// ```no_run
/// use blocktree::BTreeIndex;
///
/// let mut index = BTreeIndex::create("idx.dat").unwrap();
/// index.insert(5, 50).unwrap();
/// assert_eq!(index.search(5).unwrap(), Some((5, 50)));
/// ```
pub struct BTreeIndex {
    store: BlockStore,
}

impl BTreeIndex {
    /// Create a new, empty index file.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if the path is taken.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            store: BlockStore::create(path)?,
        })
    }

    /// Open an existing index file.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the path is missing and
    /// [`Error::BadMagic`] if the file is not a blocktree index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            store: BlockStore::open(path)?,
        })
    }

    /// Insert a key/value pair.
    ///
    /// Re-inserting an existing key overwrites its value in place (last
    /// write wins); keys stay unique tree-wide.
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        let mut header = self.store.read_header()?;

        if header.root_id.is_null() {
            // Empty tree: the first pair becomes a one-key root leaf.
            let mut root = self.store.allocate_node(&mut header, BlockId::NULL, true)?;
            root.keys[0] = key;
            root.values[0] = value;
            root.num_keys = 1;
            header.root_id = root.block_id;
            self.store.write_node(&root)?;
            self.store.write_header(&header)?;
            return Ok(());
        }

        let root = self.store.read_node(header.root_id)?;
        if root.is_full() {
            // Grow upward: a fresh root adopts the old one, then absorbs
            // the median its split promotes.
            let mut new_root = self.store.allocate_node(&mut header, BlockId::NULL, false)?;
            new_root.children[0] = root.block_id;

            let mut old_root = root;
            old_root.parent_id = new_root.block_id;
            self.store.write_node(&old_root)?;

            self.split_child(&mut new_root, 0, &mut header)?;
            header.root_id = new_root.block_id;
            self.store.write_header(&header)?;

            self.insert_non_full(new_root, key, value, &mut header)?;
        } else {
            self.insert_non_full(root, key, value, &mut header)?;
        }

        self.store.write_header(&header)?;
        Ok(())
    }

    /// Recursive descent into a node known not to be full.
    fn insert_non_full(
        &mut self,
        mut node: Node,
        key: u64,
        value: u64,
        header: &mut FileHeader,
    ) -> Result<()> {
        // A key already present on the descent path is updated where it
        // lives.
        if let Some(pos) = node.keys[..node.num_keys].iter().position(|&k| k == key) {
            node.values[pos] = value;
            return self.store.write_node(&node);
        }

        if node.is_leaf {
            // Shift larger keys right, drop the pair into its slot.
            let mut i = node.num_keys;
            while i > 0 && key < node.keys[i - 1] {
                node.keys[i] = node.keys[i - 1];
                node.values[i] = node.values[i - 1];
                i -= 1;
            }
            node.keys[i] = key;
            node.values[i] = value;
            node.num_keys += 1;
            self.store.write_node(&node)
        } else {
            // First child whose subtree can hold the key.
            let mut i = node.num_keys;
            while i > 0 && key < node.keys[i - 1] {
                i -= 1;
            }

            let child = self.store.read_node(node.children[i])?;
            if child.is_full() {
                self.split_child(&mut node, i, header)?;

                // The promoted median now sits at index i; re-aim.
                if key == node.keys[i] {
                    node.values[i] = value;
                    return self.store.write_node(&node);
                }
                if key > node.keys[i] {
                    i += 1;
                }
            }

            let child = self.store.read_node(node.children[i])?;
            self.insert_non_full(child, key, value, header)
        }
    }

    /// Split the full child at `parent.children[index]`.
    ///
    /// The upper `t - 1` keys move into a freshly allocated sibling, the
    /// median is promoted into the parent at `index`, and every child
    /// relocated to the sibling has its `parent_id` rewritten eagerly.
    fn split_child(
        &mut self,
        parent: &mut Node,
        index: usize,
        header: &mut FileHeader,
    ) -> Result<()> {
        let t = MIN_DEGREE;
        let mut full = self.store.read_node(parent.children[index])?;
        let mut sibling = self
            .store
            .allocate_node(header, parent.block_id, full.is_leaf)?;

        sibling.num_keys = t - 1;
        for i in 0..t - 1 {
            sibling.keys[i] = full.keys[i + t];
            sibling.values[i] = full.values[i + t];
        }

        if !full.is_leaf {
            for i in 0..t {
                sibling.children[i] = full.children[i + t];
                full.children[i + t] = BlockId::NULL;
                if !sibling.children[i].is_null() {
                    let mut moved = self.store.read_node(sibling.children[i])?;
                    moved.parent_id = sibling.block_id;
                    self.store.write_node(&moved)?;
                }
            }
        }

        // Truncate the split child to its lower half. The median and the
        // moved upper half are now unused slots and must be zero on disk.
        let median_key = full.keys[t - 1];
        let median_value = full.values[t - 1];
        full.num_keys = t - 1;
        for i in t - 1..MAX_KEYS {
            full.keys[i] = 0;
            full.values[i] = 0;
        }

        // Make room in the parent for the sibling pointer and the median.
        let mut i = parent.num_keys;
        while i > index {
            parent.children[i + 1] = parent.children[i];
            i -= 1;
        }
        parent.children[index + 1] = sibling.block_id;

        let mut i = parent.num_keys;
        while i > index {
            parent.keys[i] = parent.keys[i - 1];
            parent.values[i] = parent.values[i - 1];
            i -= 1;
        }
        parent.keys[index] = median_key;
        parent.values[index] = median_value;
        parent.num_keys += 1;

        self.store.write_node(&full)?;
        self.store.write_node(&sibling)?;
        self.store.write_node(parent)?;
        Ok(())
    }

    /// Point lookup. A miss is a normal negative result, not an error.
    pub fn search(&mut self, key: u64) -> Result<Option<(u64, u64)>> {
        let header = self.store.read_header()?;
        if header.root_id.is_null() {
            return Ok(None);
        }

        let mut node = self.store.read_node(header.root_id)?;
        loop {
            let mut i = 0;
            while i < node.num_keys && key > node.keys[i] {
                i += 1;
            }
            if i < node.num_keys && node.keys[i] == key {
                return Ok(Some((node.keys[i], node.values[i])));
            }
            if node.is_leaf {
                return Ok(None);
            }
            node = self.store.read_node(node.children[i])?;
        }
    }

    /// In-order traversal, pushing each pair to `sink` in ascending key
    /// order.
    ///
    /// Output is produced incrementally — nothing buffers the whole tree.
    /// Recursion depth is bounded by tree height, `O(log_t n)`.
    pub fn traverse<F>(&mut self, mut sink: F) -> Result<()>
    where
        F: FnMut(u64, u64) -> Result<()>,
    {
        let header = self.store.read_header()?;
        if header.root_id.is_null() {
            return Ok(());
        }
        self.traverse_node(header.root_id, &mut sink)
    }

    fn traverse_node<F>(&mut self, id: BlockId, sink: &mut F) -> Result<()>
    where
        F: FnMut(u64, u64) -> Result<()>,
    {
        let node = self.store.read_node(id)?;
        for i in 0..node.num_keys {
            if !node.is_leaf {
                self.traverse_node(node.children[i], sink)?;
            }
            sink(node.keys[i], node.values[i])?;
        }
        if !node.is_leaf {
            self.traverse_node(node.children[node.num_keys], sink)?;
        }
        Ok(())
    }

    /// Write every pair as a `key,value` line to `out`, ascending.
    pub fn print_to<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.traverse(|key, value| {
            writeln!(out, "{},{}", key, value)?;
            Ok(())
        })
    }

    /// Extract every pair as `key,value` lines into a new text file.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if the output path is taken.
    pub fn extract_to<P: AsRef<Path>>(&mut self, out_path: P) -> Result<()> {
        let out_path = out_path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(out_path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    Error::AlreadyExists(out_path.to_path_buf())
                } else {
                    Error::Io(e)
                }
            })?;

        let mut out = BufWriter::new(file);
        self.print_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Load `key,value` records line by line.
    ///
    /// Blank lines are ignored. A malformed line (wrong field count,
    /// non-integer field) is skipped with a warning and recorded in the
    /// report; it never aborts the rest of the load. There is no
    /// transactional batching — each valid record is one ordinary insert.
    pub fn bulk_load<R: BufRead>(&mut self, reader: R) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_record(line) {
                Ok((key, value)) => {
                    self.insert(key, value)?;
                    report.inserted += 1;
                }
                Err(_) => {
                    log::warn!("skipping malformed record on line {}: {:?}", line_no + 1, line);
                    report.skipped.push((line_no + 1, line.to_string()));
                }
            }
        }

        Ok(report)
    }
}

/// Parse one `key,value` record.
fn parse_record(line: &str) -> Result<(u64, u64)> {
    let mut parts = line.split(',');
    let (key, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => (key.trim(), value.trim()),
        _ => {
            return Err(Error::InvalidInput(format!(
                "expected exactly two fields: {:?}",
                line
            )))
        }
    };

    let key: u64 = key
        .parse()
        .map_err(|_| Error::InvalidInput(format!("key is not an integer: {:?}", key)))?;
    let value: u64 = value
        .parse()
        .map_err(|_| Error::InvalidInput(format!("value is not an integer: {:?}", value)))?;
    Ok((key, value))
}
