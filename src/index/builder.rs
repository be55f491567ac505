//! Whole-file index construction from a coordinate-sorted record stream.

use rayon::prelude::*;

use super::{BaiIndex, BinningScheme, ReferenceIndex, ReferenceIndexBuilder, VirtualOffset};
use crate::error::{IndexError, Result};

/// Most references a BAI file can hold: `n_ref` is a signed 32-bit count.
pub const MAX_REFERENCE_COUNT: usize = i32::MAX as usize;

/// One placed alignment record as seen by the indexer.
///
/// The external reader supplies the genomic span and the virtual offsets
/// bracketing the record's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    /// Reference sequence id (0-based)
    pub reference_sequence: u32,
    /// Alignment start (0-based, inclusive)
    pub start: u64,
    /// Alignment end (0-based, exclusive)
    pub end: u64,
    /// Virtual offset of the first byte of the record
    pub start_offset: VirtualOffset,
    /// Virtual offset just past the record
    pub end_offset: VirtualOffset,
}

impl IndexRecord {
    /// Create a new record.
    pub fn new(
        reference_sequence: u32,
        start: u64,
        end: u64,
        start_offset: VirtualOffset,
        end_offset: VirtualOffset,
    ) -> Self {
        IndexRecord {
            reference_sequence,
            start,
            end,
            start_offset,
            end_offset,
        }
    }
}

/// Builds a [`BaiIndex`] from records sorted by (reference, start).
///
/// Any error aborts the build: once [`IndexBuilder::push`] has failed, every
/// later call and [`IndexBuilder::finish`] report
/// [`IndexError::BuildAborted`] instead of producing a partial index.
///
/// # Example
///
/// ```
/// use bamdex::{IndexBuilder, IndexRecord, VirtualOffset};
///
/// # fn main() -> bamdex::Result<()> {
/// let records = vec![
///     IndexRecord::new(0, 100, 200, VirtualOffset::new(0, 0), VirtualOffset::new(0, 50)),
///     IndexRecord::new(0, 150, 300, VirtualOffset::new(0, 50), VirtualOffset::new(0, 120)),
/// ];
/// let index = IndexBuilder::new().build(records)?;
/// let chunks = index.query(0, 120, 160)?;
/// assert_eq!(chunks.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    scheme: BinningScheme,
    threads: usize,
    reference_count: usize,
    finished: Vec<ReferenceIndex>,
    current: Option<ReferenceIndexBuilder>,
    unplaced_unmapped: Option<u64>,
    aborted: Option<u32>,
}

impl IndexBuilder {
    /// Builder using the BAI binning scheme.
    pub fn new() -> Self {
        Self::with_scheme(BinningScheme::bai())
    }

    /// Builder using a custom binning scheme.
    pub fn with_scheme(scheme: BinningScheme) -> Self {
        IndexBuilder {
            scheme,
            threads: rayon::current_num_threads(),
            reference_count: 0,
            finished: Vec::new(),
            current: None,
            unplaced_unmapped: None,
            aborted: None,
        }
    }

    /// Cap the worker threads used by [`IndexBuilder::build_parallel`].
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Emit at least `count` references, padding with empty ones.
    ///
    /// References without records still need an entry on disk.
    pub fn with_reference_count(mut self, count: usize) -> Self {
        self.reference_count = count;
        self
    }

    /// Binning scheme used for every reference.
    pub fn scheme(&self) -> BinningScheme {
        self.scheme
    }

    /// Count records without coordinates, written as the trailing counter.
    pub fn add_unplaced_unmapped(&mut self, count: u64) {
        *self.unplaced_unmapped.get_or_insert(0) += count;
    }

    /// Index the next record of the sorted stream.
    pub fn push(&mut self, record: IndexRecord) -> Result<()> {
        if let Some(reference_sequence) = self.aborted {
            return Err(IndexError::BuildAborted { reference_sequence });
        }

        let result = self.route(record);
        if result.is_err() {
            log::debug!(
                "aborting index build on reference {}",
                record.reference_sequence
            );
            self.aborted = Some(record.reference_sequence);
            self.current = None;
        }
        result
    }

    fn route(&mut self, record: IndexRecord) -> Result<()> {
        if record.reference_sequence as usize >= MAX_REFERENCE_COUNT {
            return Err(IndexError::OutOfRange {
                position: u64::from(record.reference_sequence),
                max_span: MAX_REFERENCE_COUNT as u64,
            });
        }

        let current = match self.current.take() {
            Some(builder) if builder.reference_sequence() == record.reference_sequence => builder,
            Some(builder) if builder.reference_sequence() > record.reference_sequence => {
                return Err(IndexError::UnsortedInput {
                    reference_sequence: builder.reference_sequence(),
                    previous: u64::from(builder.reference_sequence()),
                    current: u64::from(record.reference_sequence),
                });
            }
            previous => {
                if let Some(builder) = previous {
                    self.finished.push(builder.finalize());
                }
                self.pad_to(record.reference_sequence as usize);
                ReferenceIndexBuilder::new(record.reference_sequence, self.scheme)
            }
        };

        let current = self.current.insert(current);
        current.push(
            record.start,
            record.end,
            record.start_offset,
            record.end_offset,
        )
    }

    fn pad_to(&mut self, count: usize) {
        while self.finished.len() < count {
            let reference_sequence = self.finished.len() as u32;
            self.finished
                .push(ReferenceIndex::empty(reference_sequence, self.scheme));
        }
    }

    /// Finalize the last reference and freeze the whole index.
    pub fn finish(mut self) -> Result<BaiIndex> {
        if let Some(reference_sequence) = self.aborted {
            return Err(IndexError::BuildAborted { reference_sequence });
        }

        check_reference_count(self.reference_count)?;
        if let Some(builder) = self.current.take() {
            self.finished.push(builder.finalize());
        }
        self.pad_to(self.reference_count);

        log::debug!("index built for {} references", self.finished.len());
        Ok(BaiIndex::new(
            self.scheme,
            self.finished,
            self.unplaced_unmapped,
        ))
    }

    /// Index a whole sorted stream and freeze the result.
    pub fn build<I>(mut self, records: I) -> Result<BaiIndex>
    where
        I: IntoIterator<Item = IndexRecord>,
    {
        for record in records {
            self.push(record)?;
        }
        self.finish()
    }

    /// Build references concurrently, one worker per reference.
    ///
    /// `per_reference[i]` holds the sorted records of reference `i`. Falls
    /// back to a sequential build if the thread pool cannot be created.
    ///
    /// Fails with [`IndexError::BuildAborted`] after a failed
    /// [`IndexBuilder::push`], and with [`IndexError::InvalidConfig`] when
    /// records were already pushed: the two build modes do not mix.
    pub fn build_parallel(self, per_reference: Vec<Vec<IndexRecord>>) -> Result<BaiIndex> {
        if let Some(reference_sequence) = self.aborted {
            return Err(IndexError::BuildAborted { reference_sequence });
        }
        if self.current.is_some() || !self.finished.is_empty() {
            return Err(IndexError::InvalidConfig(
                "parallel build cannot continue a streaming build".to_string(),
            ));
        }
        check_reference_count(per_reference.len().max(self.reference_count))?;

        let scheme = self.scheme;
        let build_one = |(idx, records): (usize, Vec<IndexRecord>)| -> Result<ReferenceIndex> {
            let mut builder = ReferenceIndexBuilder::new(idx as u32, scheme);
            for record in records {
                if record.reference_sequence != idx as u32 {
                    return Err(IndexError::UnsortedInput {
                        reference_sequence: idx as u32,
                        previous: idx as u64,
                        current: u64::from(record.reference_sequence),
                    });
                }
                builder.push(
                    record.start,
                    record.end,
                    record.start_offset,
                    record.end_offset,
                )?;
            }
            Ok(builder.finalize())
        };

        let references: Vec<ReferenceIndex> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
        {
            Ok(pool) => pool.install(|| {
                per_reference
                    .into_par_iter()
                    .enumerate()
                    .map(build_one)
                    .collect::<Result<Vec<_>>>()
            })?,
            Err(err) => {
                log::debug!("thread pool unavailable ({}), building sequentially", err);
                per_reference
                    .into_iter()
                    .enumerate()
                    .map(build_one)
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let mut builder = IndexBuilder {
            finished: references,
            ..self
        };
        builder.pad_to(builder.reference_count);
        Ok(BaiIndex::new(
            builder.scheme,
            builder.finished,
            builder.unplaced_unmapped,
        ))
    }
}

fn check_reference_count(count: usize) -> Result<()> {
    if count > MAX_REFERENCE_COUNT {
        return Err(IndexError::InvalidConfig(format!(
            "{} references exceed the BAI limit of {}",
            count, MAX_REFERENCE_COUNT
        )));
    }
    Ok(())
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
