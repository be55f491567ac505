//! Region query planning.
//!
//! Turns a genomic interval into the merged list of chunks a reader must
//! scan. The plan is sound: every record overlapping the interval lies in
//! one of the returned chunks. It may also cover records that turn out not
//! to overlap once decoded, so callers still filter by position.

use super::{coalesce, BaiIndex, Chunk};
use crate::error::Result;

/// Read-only planner over a frozen index.
///
/// Borrowing is all it needs, so any number of planners can run on
/// separate threads against the same [`BaiIndex`].
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner<'a> {
    index: &'a BaiIndex,
}

impl<'a> QueryPlanner<'a> {
    /// Create a planner over `index`.
    pub fn new(index: &'a BaiIndex) -> Self {
        QueryPlanner { index }
    }

    /// Chunks to scan for records overlapping `[start, end)`.
    ///
    /// # Arguments
    ///
    /// * `reference_sequence` - Reference sequence index (0-based)
    /// * `start` - Start position (0-based, inclusive)
    /// * `end` - End position (0-based, exclusive)
    ///
    /// Fails with `InvalidInterval` when `start >= end` and with
    /// `OutOfRange` when `end` exceeds the scheme's span. A reference with
    /// no index entry yields an empty plan.
    pub fn plan(&self, reference_sequence: u32, start: u64, end: u64) -> Result<Vec<Chunk>> {
        let scheme = self.index.scheme();
        let candidates = scheme.bins_overlapping(start, end)?;

        let Some(reference) = self.index.reference(reference_sequence) else {
            log::trace!("no index data for reference {}", reference_sequence);
            return Ok(Vec::new());
        };

        // Collect chunks from overlapping bins
        let mut chunks = reference.bin_index().chunks_in(&candidates);

        // Nothing overlapping the query starts before the linear lower bound
        if let Some(lower) = reference
            .linear_index()
            .min_offset_for(scheme.window_of(start))
        {
            chunks.retain(|chunk| chunk.end() > lower);
        }

        let merged = coalesce(chunks);
        log::trace!(
            "planned {}:{}-{} -> {} chunks from {} candidate bins",
            reference_sequence,
            start,
            end,
            merged.len(),
            candidates.len()
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::index::{BinningScheme, IndexBuilder, IndexRecord, VirtualOffset};

    fn record(start: u64, end: u64, from: u64, to: u64) -> IndexRecord {
        IndexRecord::new(
            0,
            start,
            end,
            VirtualOffset::from_raw(from),
            VirtualOffset::from_raw(to),
        )
    }

    fn raw_ranges(chunks: &[Chunk]) -> Vec<(u64, u64)> {
        chunks
            .iter()
            .map(|c| (c.start().as_raw(), c.end().as_raw()))
            .collect()
    }

    #[test]
    fn test_plan_excludes_distant_bin() {
        let scheme = BinningScheme::new(3, 100).unwrap();
        let index = IndexBuilder::with_scheme(scheme)
            .build(vec![
                record(100, 200, 0, 50),
                record(150, 300, 50, 120),
                record(1000, 1100, 120, 160),
            ])
            .unwrap();

        let chunks = QueryPlanner::new(&index).plan(0, 120, 160).unwrap();
        assert_eq!(raw_ranges(&chunks), vec![(0, 120)]);
    }

    #[test]
    fn test_linear_index_prunes_early_chunks() {
        let w = 16384;
        let index = IndexBuilder::new()
            .build(vec![
                // Crosses a window boundary, so it lands in level-4 bin 585
                record(w - 10, w + 10, 100, 200),
                record(3 * w, 3 * w + 10, 300, 400),
                record(3 * w + 5, 3 * w + 20, 400, 500),
            ])
            .unwrap();

        let chunks = index.query(0, 3 * w + 1, 3 * w + 2).unwrap();
        assert_eq!(raw_ranges(&chunks), vec![(300, 500)]);

        // Querying the spanning record's own window keeps it
        let chunks = index.query(0, w, w + 1).unwrap();
        assert_eq!(raw_ranges(&chunks), vec![(100, 200)]);
    }

    #[test]
    fn test_plan_rejects_bad_intervals() {
        let index = IndexBuilder::new().build(Vec::new()).unwrap();
        let planner = QueryPlanner::new(&index);
        assert!(matches!(
            planner.plan(0, 10, 10),
            Err(IndexError::InvalidInterval { .. })
        ));
        assert!(matches!(
            planner.plan(0, 20, 10),
            Err(IndexError::InvalidInterval { .. })
        ));
        assert!(matches!(
            planner.plan(0, 0, (1 << 29) + 1),
            Err(IndexError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_reference_is_empty() {
        let index = IndexBuilder::new()
            .build(vec![record(100, 200, 10, 50)])
            .unwrap();
        assert!(index.query(7, 0, 1000).unwrap().is_empty());
    }
}
