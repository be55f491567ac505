//! BGZF virtual file offsets.

use std::fmt;

use crate::error::{IndexError, Result};

/// Largest compressed offset representable in the high 48 bits.
pub const MAX_COMPRESSED_OFFSET: u64 = (1 << 48) - 1;

/// Virtual file offset in BGZF format.
///
/// A 64-bit value combining:
/// - Bits 63-16: Compressed file offset (byte position of the BGZF block)
/// - Bits 15-0: Uncompressed offset within the decompressed block
///
/// Ordering is lexicographic on (compressed, uncompressed), which is exactly
/// the ordering of the packed 64-bit value.
///
/// # Example
///
/// ```
/// # use bamdex::VirtualOffset;
/// let offset = VirtualOffset::new(1024, 512);
/// assert_eq!(offset.compressed_offset(), 1024);
/// assert_eq!(offset.uncompressed_offset(), 512);
/// assert!(offset < VirtualOffset::new(1025, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualOffset(u64);

impl VirtualOffset {
    /// The zero offset, used on disk to mean "no data".
    pub const ZERO: VirtualOffset = VirtualOffset(0);

    /// Create a new virtual offset from compressed and uncompressed components.
    ///
    /// `compressed` must fit in 48 bits. Debug builds panic otherwise;
    /// release builds discard the high bits. Use [`VirtualOffset::try_new`]
    /// for offsets that are not known to be in range.
    pub const fn new(compressed: u64, uncompressed: u16) -> Self {
        debug_assert!(
            compressed <= MAX_COMPRESSED_OFFSET,
            "compressed offset exceeds 48 bits"
        );
        VirtualOffset(((compressed & MAX_COMPRESSED_OFFSET) << 16) | uncompressed as u64)
    }

    /// Checked variant of [`VirtualOffset::new`].
    ///
    /// Fails with [`IndexError::OutOfRange`] when `compressed` does not fit
    /// in 48 bits.
    pub fn try_new(compressed: u64, uncompressed: u16) -> Result<Self> {
        if compressed > MAX_COMPRESSED_OFFSET {
            return Err(IndexError::OutOfRange {
                position: compressed,
                max_span: MAX_COMPRESSED_OFFSET + 1,
            });
        }
        Ok(Self::new(compressed, uncompressed))
    }

    /// Create from raw 64-bit value.
    pub const fn from_raw(value: u64) -> Self {
        VirtualOffset(value)
    }

    /// Get raw 64-bit value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Get compressed file offset (high 48 bits).
    pub const fn compressed_offset(self) -> u64 {
        self.0 >> 16
    }

    /// Get uncompressed offset within block (low 16 bits).
    pub const fn uncompressed_offset(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// True for the on-disk "unset" marker.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for VirtualOffset {
    fn from(value: u64) -> Self {
        VirtualOffset(value)
    }
}

impl From<VirtualOffset> for u64 {
    fn from(offset: VirtualOffset) -> Self {
        offset.0
    }
}

impl fmt::Display for VirtualOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.compressed_offset(), self.uncompressed_offset())
    }
}
