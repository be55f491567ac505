//! Bit-exact encoding of the per-reference index block.
//!
//! # Format
//!
//! ```text
//! n_bin[4]          Number of bins (int32)
//! For each bin:
//!   bin[4]          Bin number (uint32)
//!   n_chunk[4]      Number of chunks (int32)
//!   For each chunk:
//!     chunk_beg[8]  Virtual offset (uint64)
//!     chunk_end[8]  Virtual offset (uint64)
//! n_intv[4]         Number of linear index windows (int32)
//! For each window:
//!   ioffset[8]      Virtual offset (uint64, 0 = no data)
//! ```
//!
//! All integers are little-endian. Bins are written in stored order, so
//! decoding then encoding a block reproduces it byte for byte.

use std::io::{self, Read, Write};

use super::{
    Bin, BinIndex, BinKey, BinningScheme, Chunk, LinearIndex, ReferenceIndex, VirtualOffset,
};
use crate::error::{IndexError, Result};

/// Upper bound on speculative allocation from counts read off disk.
const PREALLOC_LIMIT: usize = 1 << 12;

/// Decode one reference block.
pub fn read_reference<R: Read>(
    reader: &mut R,
    scheme: &BinningScheme,
    reference_sequence: u32,
) -> Result<ReferenceIndex> {
    let n_bin = read_count(reader, "bin")?;
    let mut bins = Vec::with_capacity(n_bin.min(PREALLOC_LIMIT));

    for _ in 0..n_bin {
        let bin_number = read_u32(reader)?;
        if !scheme.is_valid_bin(bin_number) {
            return Err(IndexError::malformed(format!(
                "bin {} exceeds maximum {} on reference {}",
                bin_number,
                scheme.max_bin(),
                reference_sequence
            )));
        }

        let n_chunk = read_count(reader, "chunk")?;
        let mut chunks = Vec::with_capacity(n_chunk.min(PREALLOC_LIMIT));
        for _ in 0..n_chunk {
            let chunk_beg = VirtualOffset::from_raw(read_u64(reader)?);
            let chunk_end = VirtualOffset::from_raw(read_u64(reader)?);
            let chunk = Chunk::new(chunk_beg, chunk_end).map_err(|_| {
                IndexError::malformed(format!(
                    "chunk begin {:#x} not before end {:#x} in bin {}",
                    chunk_beg.as_raw(),
                    chunk_end.as_raw(),
                    bin_number
                ))
            })?;
            chunks.push(chunk);
        }

        bins.push(Bin::with_chunks(
            BinKey::new(reference_sequence, bin_number),
            chunks,
        ));
    }
    let bin_index = BinIndex::from_bins(reference_sequence, bins)?;

    let n_intv = read_count(reader, "interval")?;
    let mut entries = Vec::with_capacity(n_intv.min(PREALLOC_LIMIT));
    for _ in 0..n_intv {
        let offset = VirtualOffset::from_raw(read_u64(reader)?);
        entries.push((!offset.is_zero()).then_some(offset));
    }
    let linear_index =
        LinearIndex::from_entries(reference_sequence, scheme.base_window_width(), entries);

    Ok(ReferenceIndex::new(bin_index, linear_index))
}

/// Encode one reference block.
pub fn write_reference<W: Write>(writer: &mut W, reference: &ReferenceIndex) -> Result<()> {
    let bins = reference.bin_index().bins();
    write_count(writer, bins.len(), "bin")?;

    for bin in bins {
        writer.write_all(&bin.bin_number().to_le_bytes())?;
        write_count(writer, bin.chunks().len(), "chunk")?;
        for chunk in bin.chunks() {
            writer.write_all(&chunk.start().as_raw().to_le_bytes())?;
            writer.write_all(&chunk.end().as_raw().to_le_bytes())?;
        }
    }

    let entries = reference.linear_index().entries();
    write_count(writer, entries.len(), "interval")?;
    for entry in entries {
        let raw = entry.map_or(0, VirtualOffset::as_raw);
        writer.write_all(&raw.to_le_bytes())?;
    }

    Ok(())
}

// Helper functions for binary data (little-endian)

/// `read_exact` that reports a short read as a truncated index.
pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(IndexError::malformed(
            format!("truncated index: expected {} more bytes", buf.len()),
        )),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a signed 32-bit count, rejecting negatives.
pub(crate) fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count = read_i32(reader)?;
    usize::try_from(count)
        .map_err(|_| IndexError::malformed(format!("invalid {} count: {}", what, count)))
}

/// Write a count as signed 32-bit, refusing counts the format cannot hold.
pub(crate) fn write_count<W: Write>(writer: &mut W, count: usize, what: &str) -> Result<()> {
    let count = i32::try_from(count).map_err(|_| {
        IndexError::malformed(format!("{} count {} does not fit in int32", what, count))
    })?;
    writer.write_all(&count.to_le_bytes())?;
    Ok(())
}
