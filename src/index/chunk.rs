//! Half-open ranges of virtual offsets and chunk coalescing.

use super::VirtualOffset;
use crate::error::{IndexError, Result};

/// A chunk represents a contiguous range of data in the BGZF file.
///
/// Chunks are the atomic units of data retrieval when querying regions.
/// The range is half-open: `start` is inclusive, `end` exclusive, and
/// `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    start: VirtualOffset,
    end: VirtualOffset,
}

impl Chunk {
    /// Create a new chunk.
    ///
    /// Fails with [`IndexError::InvalidInterval`] unless `start < end`.
    pub fn new(start: VirtualOffset, end: VirtualOffset) -> Result<Self> {
        if start >= end {
            return Err(IndexError::InvalidInterval {
                start: start.as_raw(),
                end: end.as_raw(),
            });
        }
        Ok(Chunk { start, end })
    }

    /// Virtual file offset where chunk starts
    pub fn start(&self) -> VirtualOffset {
        self.start
    }

    /// Virtual file offset where chunk ends (exclusive)
    pub fn end(&self) -> VirtualOffset {
        self.end
    }

    /// True when the two ranges share at least one offset.
    pub fn overlaps(&self, other: &Chunk) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when the two ranges overlap or one ends exactly where the other starts.
    pub fn touches(&self, other: &Chunk) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when `offset` lies inside `[start, end)`.
    pub fn contains(&self, offset: VirtualOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Union of two touching chunks, or `None` if a gap separates them.
    pub fn merge_with(&self, other: &Chunk) -> Option<Chunk> {
        if !self.touches(other) {
            return None;
        }
        Some(Chunk {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }

    /// Grow this chunk's end in place. Caller guarantees the ranges touch.
    pub(crate) fn extend_to(&mut self, end: VirtualOffset) {
        if end > self.end {
            self.end = end;
        }
    }
}

/// Merge overlapping or adjacent chunks.
///
/// Sorts by start, then folds left: each chunk is absorbed into the running
/// tail when `tail.end >= next.start`, otherwise it becomes the new tail.
/// The result is sorted and pairwise disjoint with gaps between neighbours.
pub fn coalesce<I>(chunks: I) -> Vec<Chunk>
where
    I: IntoIterator<Item = Chunk>,
{
    let mut chunks: Vec<Chunk> = chunks.into_iter().collect();
    chunks.sort_unstable_by_key(|c| (c.start, c.end));

    let mut merged: Vec<Chunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match merged.last_mut() {
            Some(tail) if tail.end >= chunk.start => tail.extend_to(chunk.end),
            _ => merged.push(chunk),
        }
    }

    merged
}
