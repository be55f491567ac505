//! Linear index: one lower-bound offset per fixed-width window.
//!
//! Entry `i` is no greater than the offset of any record overlapping window
//! `i`. The query planner uses it to discard chunks that end before the
//! first record that could possibly overlap the query start. Offsets are
//! assumed to grow with file order, which holds for any coordinate-sorted
//! stream.

use super::{BinningScheme, VirtualOffset};
use crate::error::{IndexError, Result};

/// Frozen linear index for one reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearIndex {
    reference_sequence: u32,
    window_width: u64,
    entries: Vec<Option<VirtualOffset>>,
}

impl LinearIndex {
    pub(crate) fn from_entries(
        reference_sequence: u32,
        window_width: u64,
        entries: Vec<Option<VirtualOffset>>,
    ) -> Self {
        LinearIndex {
            reference_sequence,
            window_width,
            entries,
        }
    }

    /// Reference sequence this index covers.
    pub fn reference_sequence(&self) -> u32 {
        self.reference_sequence
    }

    /// Width in bases of each window.
    pub fn window_width(&self) -> u64 {
        self.window_width
    }

    /// Per-window offsets; `None` means no data.
    pub fn entries(&self) -> &[Option<VirtualOffset>] {
        &self.entries
    }

    /// Number of windows recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no window was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-bound offset for `window`, or `None` when unset or beyond the
    /// last observed window.
    pub fn min_offset_for(&self, window: usize) -> Option<VirtualOffset> {
        self.entries.get(window).copied().flatten()
    }

    /// Lower-bound offset for the window containing `position`.
    pub fn min_offset_at(&self, position: u64) -> Option<VirtualOffset> {
        self.min_offset_for((position / self.window_width) as usize)
    }
}

/// Mutable linear index under construction for one reference sequence.
#[derive(Debug, Clone)]
pub struct LinearIndexBuilder {
    reference_sequence: u32,
    scheme: BinningScheme,
    entries: Vec<Option<VirtualOffset>>,
}

impl LinearIndexBuilder {
    /// Start an empty linear index using the scheme's base window width.
    pub fn new(reference_sequence: u32, scheme: BinningScheme) -> Self {
        LinearIndexBuilder {
            reference_sequence,
            scheme,
            entries: Vec::new(),
        }
    }

    /// Record a placed record spanning `[start, end)` at `record_offset`.
    ///
    /// Every window the record touches is lowered to `record_offset` if
    /// unset or larger. Windows skipped while growing take the last known
    /// minimum: no later record can start in them.
    pub fn observe(
        &mut self,
        reference_sequence: u32,
        start: u64,
        end: u64,
        record_offset: VirtualOffset,
    ) -> Result<()> {
        if reference_sequence != self.reference_sequence {
            return Err(IndexError::UnsortedInput {
                reference_sequence: self.reference_sequence,
                previous: u64::from(self.reference_sequence),
                current: u64::from(reference_sequence),
            });
        }
        self.scheme.check_interval(start, end)?;

        let first = self.scheme.window_of(start);
        let last = self.scheme.window_of(end - 1);

        if self.entries.len() <= last {
            if self.entries.len() < first {
                let carried = self.entries.last().copied().flatten();
                self.entries.resize(first, carried);
            }
            self.entries.resize(last + 1, None);
        }

        for entry in &mut self.entries[first..=last] {
            if entry.map_or(true, |current| record_offset < current) {
                *entry = Some(record_offset);
            }
        }

        Ok(())
    }

    /// Forward-fill remaining gaps with the last known minimum and freeze.
    ///
    /// Leading windows before the first record stay unset. A zero offset is
    /// written to disk as "unset", so it is stored that way too.
    pub fn finalize(self) -> LinearIndex {
        let mut entries = self.entries;
        let mut carried = None;
        for entry in &mut entries {
            match *entry {
                Some(offset) => carried = Some(offset),
                None => *entry = carried,
            }
            *entry = entry.filter(|offset| !offset.is_zero());
        }

        log::debug!(
            "finalized linear index for reference {}: {} windows",
            self.reference_sequence,
            entries.len()
        );

        LinearIndex {
            reference_sequence: self.reference_sequence,
            window_width: self.scheme.base_window_width(),
            entries,
        }
    }
}
