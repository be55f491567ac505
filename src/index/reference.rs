//! Binning and linear index for a single reference sequence.

use super::{
    BinIndex, BinIndexBuilder, BinningScheme, LinearIndex, LinearIndexBuilder, VirtualOffset,
};
use crate::error::Result;

/// Reference sequence index data.
///
/// Contains the frozen binning and linear index for one reference sequence.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    bin_index: BinIndex,
    linear_index: LinearIndex,
}

impl ReferenceIndex {
    pub(crate) fn new(bin_index: BinIndex, linear_index: LinearIndex) -> Self {
        ReferenceIndex {
            bin_index,
            linear_index,
        }
    }

    /// An index for a reference with no placed records.
    pub fn empty(reference_sequence: u32, scheme: BinningScheme) -> Self {
        ReferenceIndexBuilder::new(reference_sequence, scheme).finalize()
    }

    /// Reference sequence this index covers.
    pub fn reference_sequence(&self) -> u32 {
        self.bin_index.reference_sequence()
    }

    /// Hierarchical binning index.
    pub fn bin_index(&self) -> &BinIndex {
        &self.bin_index
    }

    /// Linear index of per-window lower-bound offsets.
    pub fn linear_index(&self) -> &LinearIndex {
        &self.linear_index
    }

    /// True when neither index holds any data.
    pub fn is_empty(&self) -> bool {
        self.bin_index.is_empty() && self.linear_index.is_empty()
    }

    /// Deep comparison of bins, chunks and linear entries.
    pub fn same_contents(&self, other: &ReferenceIndex) -> bool {
        self.bin_index.same_contents(&other.bin_index) && self.linear_index == other.linear_index
    }
}

/// Exclusive, mutable build state for one reference sequence.
///
/// Independent references can be built on separate threads, each with its
/// own builder; [`ReferenceIndexBuilder::finalize`] hands back an immutable
/// [`ReferenceIndex`].
#[derive(Debug, Clone)]
pub struct ReferenceIndexBuilder {
    reference_sequence: u32,
    bins: BinIndexBuilder,
    linear: LinearIndexBuilder,
    record_count: u64,
}

impl ReferenceIndexBuilder {
    /// Start an empty index for `reference_sequence`.
    pub fn new(reference_sequence: u32, scheme: BinningScheme) -> Self {
        ReferenceIndexBuilder {
            reference_sequence,
            bins: BinIndexBuilder::new(reference_sequence, scheme),
            linear: LinearIndexBuilder::new(reference_sequence, scheme),
            record_count: 0,
        }
    }

    /// Reference sequence being built.
    pub fn reference_sequence(&self) -> u32 {
        self.reference_sequence
    }

    /// Number of records indexed so far.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Index one record in both the binning and the linear index.
    pub fn push(
        &mut self,
        start: u64,
        end: u64,
        start_offset: VirtualOffset,
        end_offset: VirtualOffset,
    ) -> Result<()> {
        self.bins
            .record_overlap(self.reference_sequence, start, end, start_offset, end_offset)?;
        // Same interval checks already passed in the binning index
        self.linear
            .observe(self.reference_sequence, start, end, start_offset)?;
        self.record_count += 1;
        Ok(())
    }

    /// Freeze both indexes.
    pub fn finalize(self) -> ReferenceIndex {
        log::debug!(
            "reference {} finalized after {} records",
            self.reference_sequence,
            self.record_count
        );
        ReferenceIndex::new(self.bins.finalize(), self.linear.finalize())
    }
}
