//! Bins of the hierarchical index and their identity keys.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::Chunk;

/// Identity of a bin: which reference sequence, which bin number.
///
/// Use this type for map keys, set membership and deduplication. It carries
/// no chunk payload, so there is no question about what equality means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinKey {
    /// Reference sequence the bin belongs to (0-based)
    pub reference_sequence: u32,
    /// Bin number within the binning scheme
    pub bin_number: u32,
}

impl BinKey {
    /// Create a new key.
    pub fn new(reference_sequence: u32, bin_number: u32) -> Self {
        BinKey {
            reference_sequence,
            bin_number,
        }
    }
}

/// A bin in the hierarchical binning index.
///
/// Equality, ordering and hashing look only at the [`BinKey`]: two bins with
/// the same reference sequence and bin number compare equal even when their
/// chunk lists differ. Use [`Bin::same_contents`] to compare payloads.
#[derive(Debug, Clone)]
pub struct Bin {
    key: BinKey,
    chunks: Vec<Chunk>,
}

impl Bin {
    /// Create an empty bin.
    pub fn new(key: BinKey) -> Self {
        Bin {
            key,
            chunks: Vec::new(),
        }
    }

    /// Create a bin holding `chunks` as given.
    pub fn with_chunks(key: BinKey, chunks: Vec<Chunk>) -> Self {
        Bin { key, chunks }
    }

    /// Identity of this bin.
    pub fn key(&self) -> BinKey {
        self.key
    }

    /// Reference sequence the bin belongs to.
    pub fn reference_sequence(&self) -> u32 {
        self.key.reference_sequence
    }

    /// Bin number within the binning scheme.
    pub fn bin_number(&self) -> u32 {
        self.key.bin_number
    }

    /// Chunks of data in this bin, in stored order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Deep comparison: same identity and identical chunk lists.
    pub fn same_contents(&self, other: &Bin) -> bool {
        self.key == other.key && self.chunks == other.chunks
    }

    /// Append a chunk, folding it into the tail when they touch.
    ///
    /// Chunks must arrive in start order, which holds for records appended
    /// from a coordinate-sorted stream.
    pub(crate) fn append(&mut self, chunk: Chunk) {
        match self.chunks.last_mut() {
            Some(tail) if tail.end() >= chunk.start() => tail.extend_to(chunk.end()),
            _ => self.chunks.push(chunk),
        }
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.chunks
    }
}

impl PartialEq for Bin {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Bin {}

impl PartialOrd for Bin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for Bin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
