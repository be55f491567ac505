//! Per-reference mapping from bin number to bin.
//!
//! [`BinIndexBuilder`] owns the mutable state while records stream in;
//! [`BinIndexBuilder::finalize`] consumes it and returns a frozen
//! [`BinIndex`] that can be shared freely between query threads.

use std::collections::HashMap;

use super::{coalesce, Bin, BinKey, BinningScheme, Chunk, VirtualOffset};
use crate::error::{IndexError, Result};

/// Frozen binning index for one reference sequence.
///
/// Bins keep the order in which they were first populated (or read from
/// disk), so writing a parsed index reproduces the original bytes.
#[derive(Debug, Clone, Default)]
pub struct BinIndex {
    reference_sequence: u32,
    bins: Vec<Bin>,
    lookup: HashMap<u32, usize>,
}

impl BinIndex {
    /// Assemble an index from decoded bins, rejecting duplicate bin numbers.
    pub(crate) fn from_bins(reference_sequence: u32, bins: Vec<Bin>) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(bins.len());
        for (idx, bin) in bins.iter().enumerate() {
            if lookup.insert(bin.bin_number(), idx).is_some() {
                return Err(IndexError::malformed(format!(
                    "duplicate bin {} on reference {}",
                    bin.bin_number(),
                    reference_sequence
                )));
            }
        }

        Ok(BinIndex {
            reference_sequence,
            bins,
            lookup,
        })
    }

    /// Reference sequence this index covers.
    pub fn reference_sequence(&self) -> u32 {
        self.reference_sequence
    }

    /// Look up a bin by number.
    pub fn get(&self, bin_number: u32) -> Option<&Bin> {
        self.lookup.get(&bin_number).map(|&idx| &self.bins[idx])
    }

    /// All populated bins.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of populated bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True when no record was indexed on this reference.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Chunks of every listed bin present in this index.
    ///
    /// Absent bin numbers contribute nothing. The result is unsorted.
    pub fn chunks_in(&self, bin_numbers: &[u32]) -> Vec<Chunk> {
        bin_numbers
            .iter()
            .filter_map(|&bin| self.get(bin))
            .flat_map(|bin| bin.chunks().iter().copied())
            .collect()
    }

    /// Deep comparison of bin numbers and chunk payloads, ignoring bin order.
    pub fn same_contents(&self, other: &BinIndex) -> bool {
        self.reference_sequence == other.reference_sequence
            && self.bins.len() == other.bins.len()
            && self.bins.iter().all(|bin| {
                other
                    .get(bin.bin_number())
                    .is_some_and(|theirs| bin.same_contents(theirs))
            })
    }
}

/// Mutable binning index under construction for one reference sequence.
#[derive(Debug, Clone)]
pub struct BinIndexBuilder {
    reference_sequence: u32,
    scheme: BinningScheme,
    bins: Vec<Bin>,
    lookup: HashMap<u32, usize>,
    last_start: Option<u64>,
}

impl BinIndexBuilder {
    /// Start an empty index for `reference_sequence`.
    pub fn new(reference_sequence: u32, scheme: BinningScheme) -> Self {
        BinIndexBuilder {
            reference_sequence,
            scheme,
            bins: Vec::new(),
            lookup: HashMap::new(),
            last_start: None,
        }
    }

    /// Reference sequence being built.
    pub fn reference_sequence(&self) -> u32 {
        self.reference_sequence
    }

    /// Index one record spanning `[start, end)` on the reference and
    /// occupying `[record_start_offset, record_end_offset)` in the file.
    ///
    /// The record lands in the smallest bin containing it. Records must
    /// arrive with non-decreasing starts; the builder is left untouched
    /// when any check fails.
    pub fn record_overlap(
        &mut self,
        reference_sequence: u32,
        start: u64,
        end: u64,
        record_start_offset: VirtualOffset,
        record_end_offset: VirtualOffset,
    ) -> Result<()> {
        if reference_sequence != self.reference_sequence {
            return Err(IndexError::UnsortedInput {
                reference_sequence: self.reference_sequence,
                previous: u64::from(self.reference_sequence),
                current: u64::from(reference_sequence),
            });
        }

        let bin_number = self.scheme.bin_for(start, end)?;

        if let Some(previous) = self.last_start {
            if start < previous {
                return Err(IndexError::UnsortedInput {
                    reference_sequence,
                    previous,
                    current: start,
                });
            }
        }

        let chunk = Chunk::new(record_start_offset, record_end_offset)?;

        let idx = match self.lookup.get(&bin_number) {
            Some(&idx) => idx,
            None => {
                self.bins
                    .push(Bin::new(BinKey::new(reference_sequence, bin_number)));
                self.lookup.insert(bin_number, self.bins.len() - 1);
                self.bins.len() - 1
            }
        };
        self.bins[idx].append(chunk);
        self.last_start = Some(start);

        Ok(())
    }

    /// Coalesce every bin and freeze the index.
    pub fn finalize(self) -> BinIndex {
        let mut bins = self.bins;
        for bin in &mut bins {
            let chunks = std::mem::take(bin.chunks_mut());
            *bin.chunks_mut() = coalesce(chunks);
        }

        log::debug!(
            "finalized bin index for reference {}: {} bins",
            self.reference_sequence,
            bins.len()
        );

        BinIndex {
            reference_sequence: self.reference_sequence,
            bins,
            lookup: self.lookup,
        }
    }
}
