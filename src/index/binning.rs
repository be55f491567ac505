//! Hierarchical bin numbering.
//!
//! A reference sequence of at most [`BinningScheme::max_span`] bases is
//! partitioned into `L` levels. Level `k` holds `8^k` equal bins, so level 0
//! is a single bin covering everything and level `L - 1` has bins exactly one
//! base window wide. Bin numbers at level `k` start at `(8^k - 1) / 7`, which
//! keeps numbers unique across levels.
//!
//! The default scheme is the one used by BAI and TBI:
//!
//! | Level | Bins  | Bin width | Bin numbers   |
//! |-------|-------|-----------|---------------|
//! | 0     | 1     | 512 Mbp   | 0             |
//! | 1     | 8     | 64 Mbp    | 1-8           |
//! | 2     | 64    | 8 Mbp     | 9-72          |
//! | 3     | 512   | 1 Mbp     | 73-584        |
//! | 4     | 4096  | 128 Kbp   | 585-4680      |
//! | 5     | 32768 | 16 Kbp    | 4681-37449    |
//!
//! Spans are computed by division rather than bit shifts, so the base window
//! width may be any positive value. Small schemes are handy for exhaustive
//! testing.

use crate::error::{IndexError, Result};

/// Number of levels in the BAI binning scheme.
pub const BAI_LEVEL_COUNT: u32 = 6;

/// Width in bases of the finest BAI bin and of each linear index window.
pub const BAI_WINDOW_WIDTH: u64 = 1 << 14;

/// Deepest hierarchy whose bin numbers still fit in a `u32`.
pub const MAX_LEVEL_COUNT: u32 = 10;

/// A fixed hierarchical partition of a reference sequence into bins.
///
/// # Example
///
/// ```
/// use bamdex::BinningScheme;
///
/// let scheme = BinningScheme::default();
/// assert_eq!(scheme.max_span(), 1 << 29);
/// assert_eq!(scheme.bin_for(100, 200).unwrap(), 4681);
/// assert!(scheme.bins_overlapping(100, 200).unwrap().contains(&4681));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinningScheme {
    level_count: u32,
    base_window_width: u64,
    max_span: u64,
}

impl BinningScheme {
    /// Create a scheme with `level_count` levels whose finest bins are
    /// `base_window_width` bases wide.
    ///
    /// Fails with [`IndexError::InvalidConfig`] when the level count is
    /// outside `1..=10`, the width is zero, or the total span overflows `u64`.
    pub fn new(level_count: u32, base_window_width: u64) -> Result<Self> {
        if level_count == 0 || level_count > MAX_LEVEL_COUNT {
            return Err(IndexError::InvalidConfig(format!(
                "level count must be between 1 and {}, got {}",
                MAX_LEVEL_COUNT, level_count
            )));
        }
        if base_window_width == 0 {
            return Err(IndexError::InvalidConfig(
                "base window width must be positive".to_string(),
            ));
        }

        let max_span = 8u64
            .checked_pow(level_count - 1)
            .and_then(|bins| bins.checked_mul(base_window_width))
            .ok_or_else(|| {
                IndexError::InvalidConfig(format!(
                    "{} levels of {}-base windows overflow the addressable span",
                    level_count, base_window_width
                ))
            })?;

        Ok(BinningScheme {
            level_count,
            base_window_width,
            max_span,
        })
    }

    /// The BAI/TBI scheme: 6 levels, 16 Kbp finest bins, 512 Mbp span.
    pub fn bai() -> Self {
        BinningScheme {
            level_count: BAI_LEVEL_COUNT,
            base_window_width: BAI_WINDOW_WIDTH,
            max_span: BAI_WINDOW_WIDTH << (3 * (BAI_LEVEL_COUNT - 1)),
        }
    }

    /// Number of levels in the hierarchy.
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Width of the finest bins, also the linear index window size.
    pub fn base_window_width(&self) -> u64 {
        self.base_window_width
    }

    /// Largest exclusive end coordinate the scheme can place.
    pub fn max_span(&self) -> u64 {
        self.max_span
    }

    /// Total number of bins across all levels.
    pub fn bin_count(&self) -> u32 {
        level_offset(self.level_count)
    }

    /// Highest valid bin number.
    pub fn max_bin(&self) -> u32 {
        self.bin_count() - 1
    }

    /// True when `bin` names a bin of this scheme.
    pub fn is_valid_bin(&self, bin: u32) -> bool {
        bin <= self.max_bin()
    }

    /// Linear index window holding `position`.
    pub fn window_of(&self, position: u64) -> usize {
        (position / self.base_window_width) as usize
    }

    /// Width in bases of each bin at `level`.
    fn level_width(&self, level: u32) -> u64 {
        self.base_window_width * 8u64.pow(self.level_count - 1 - level)
    }

    /// Level holding `bin`, or `None` for numbers beyond [`Self::max_bin`].
    pub fn level_of(&self, bin: u32) -> Option<u32> {
        (0..self.level_count).find(|&level| bin < level_offset(level + 1))
    }

    /// Half-open genomic span `[start, end)` covered by `bin`.
    pub fn bin_span(&self, bin: u32) -> Option<(u64, u64)> {
        let level = self.level_of(bin)?;
        let width = self.level_width(level);
        let index = u64::from(bin - level_offset(level));
        Some((index * width, (index + 1) * width))
    }

    /// Smallest bin fully containing `[start, end)`.
    ///
    /// Checks containment from the finest level upward; level 0 contains
    /// every valid interval.
    pub fn bin_for(&self, start: u64, end: u64) -> Result<u32> {
        self.check_interval(start, end)?;
        let last = end - 1;

        for level in (1..self.level_count).rev() {
            let width = self.level_width(level);
            if start / width == last / width {
                return Ok(level_offset(level) + (start / width) as u32);
            }
        }

        Ok(0)
    }

    /// Every bin, across all levels, whose span overlaps `[start, end)`.
    ///
    /// Returned in ascending bin order without duplicates.
    pub fn bins_overlapping(&self, start: u64, end: u64) -> Result<Vec<u32>> {
        self.check_interval(start, end)?;
        let last = end - 1;

        let mut bins = Vec::new();
        for level in 0..self.level_count {
            let width = self.level_width(level);
            let offset = level_offset(level);
            let first_bin = offset + (start / width) as u32;
            let last_bin = offset + (last / width) as u32;
            bins.extend(first_bin..=last_bin);
        }

        Ok(bins)
    }

    /// Validate a half-open interval against this scheme.
    pub fn check_interval(&self, start: u64, end: u64) -> Result<()> {
        if start >= end {
            return Err(IndexError::InvalidInterval { start, end });
        }
        if end > self.max_span {
            return Err(IndexError::OutOfRange {
                position: end,
                max_span: self.max_span,
            });
        }
        Ok(())
    }
}

impl Default for BinningScheme {
    fn default() -> Self {
        Self::bai()
    }
}

/// First bin number at `level`: `(8^level - 1) / 7`.
fn level_offset(level: u32) -> u32 {
    ((1u64 << (3 * level)) - 1) as u32 / 7
}
