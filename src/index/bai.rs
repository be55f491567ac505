//! The whole-file BAI index.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::codec::{read_count, read_exact, read_reference, write_count, write_reference};
use super::{BinningScheme, Chunk, QueryPlanner, ReferenceIndex};
use crate::error::{IndexError, Result};

/// BAI file format magic string
pub const BAI_MAGIC: &[u8; 4] = b"BAI\x01";

/// BAI (BAM Index) structure.
///
/// Owns the frozen binning and linear index of every reference sequence.
/// Nothing mutates it after construction, so a shared reference can serve
/// queries from any number of threads.
///
/// # Example
///
/// ```no_run
/// use bamdex::BaiIndex;
///
/// # fn main() -> bamdex::Result<()> {
/// let index = BaiIndex::from_path("alignments.bam.bai")?;
/// println!("Index covers {} references", index.references().len());
///
/// let chunks = index.query(0, 1_000_000, 1_001_000)?;
/// println!("Need to read {} chunks", chunks.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BaiIndex {
    scheme: BinningScheme,
    references: Vec<ReferenceIndex>,
    unplaced_unmapped: Option<u64>,
}

impl BaiIndex {
    pub(crate) fn new(
        scheme: BinningScheme,
        references: Vec<ReferenceIndex>,
        unplaced_unmapped: Option<u64>,
    ) -> Self {
        BaiIndex {
            scheme,
            references,
            unplaced_unmapped,
        }
    }

    /// Binning scheme shared by every reference.
    pub fn scheme(&self) -> BinningScheme {
        self.scheme
    }

    /// Index data for each reference sequence.
    pub fn references(&self) -> &[ReferenceIndex] {
        &self.references
    }

    /// Index data for one reference sequence.
    pub fn reference(&self, reference_sequence: u32) -> Option<&ReferenceIndex> {
        self.references.get(reference_sequence as usize)
    }

    /// Number of unplaced, unmapped records, if the index records it.
    pub fn unplaced_unmapped(&self) -> Option<u64> {
        self.unplaced_unmapped
    }

    /// Chunks to scan for records overlapping `[start, end)`.
    ///
    /// Shorthand for [`QueryPlanner::plan`].
    pub fn query(&self, reference_sequence: u32, start: u64, end: u64) -> Result<Vec<Chunk>> {
        QueryPlanner::new(self).plan(reference_sequence, start, end)
    }

    /// Deep comparison of every reference and the unplaced counter.
    pub fn same_contents(&self, other: &BaiIndex) -> bool {
        self.scheme == other.scheme
            && self.unplaced_unmapped == other.unplaced_unmapped
            && self.references.len() == other.references.len()
            && self
                .references
                .iter()
                .zip(&other.references)
                .all(|(ours, theirs)| ours.same_contents(theirs))
    }

    /// Load a BAI index from a file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be opened
    /// - File is not a valid BAI format
    /// - Index is corrupted or truncated
    /// - Any bin number exceeds [`BinningScheme::max_bin`]
    ///
    /// # Limitations
    ///
    /// samtools and htslib append a metadata pseudo-bin (37450 under the
    /// BAI scheme) to every reference with data. It is not part of the bin
    /// hierarchy and is rejected as [`IndexError::MalformedIndex`], so
    /// indexes written by those tools do not load. Indexes written by
    /// [`BaiIndex::write`] never contain it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let index = Self::read(&mut reader)?;
        log::debug!(
            "loaded {} references from {}",
            index.references.len(),
            path.as_ref().display()
        );
        Ok(index)
    }

    /// Read a BAI index using the standard binning scheme.
    ///
    /// # Format
    ///
    /// ```text
    /// magic[4]      "BAI\1"
    /// n_ref[4]      Number of reference sequences (int32)
    /// n_ref reference blocks (see the codec module)
    /// n_no_coor[8]  Unplaced unmapped records (uint64, optional)
    /// ```
    ///
    /// Bins above [`BinningScheme::max_bin`], including the samtools
    /// metadata pseudo-bin 37450, fail with [`IndexError::MalformedIndex`].
    /// See [`BaiIndex::from_path`].
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Self::read_with_scheme(reader, BinningScheme::bai())
    }

    /// Read an index laid out like BAI but binned with `scheme`.
    pub fn read_with_scheme<R: Read>(reader: &mut R, scheme: BinningScheme) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_exact(reader, &mut magic)?;
        if &magic != BAI_MAGIC {
            return Err(IndexError::malformed(format!(
                "invalid BAI magic: expected {:?}, got {:?}",
                BAI_MAGIC, magic
            )));
        }

        let n_ref = read_count(reader, "reference")?;
        let mut references = Vec::with_capacity(n_ref.min(1 << 12));
        for reference_sequence in 0..n_ref {
            references.push(read_reference(reader, &scheme, reference_sequence as u32)?);
        }

        let unplaced_unmapped = read_trailing_u64(reader)?;

        Ok(BaiIndex {
            scheme,
            references,
            unplaced_unmapped,
        })
    }

    /// Write the index in BAI layout.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(BAI_MAGIC)?;
        write_count(writer, self.references.len(), "reference")?;
        for reference in &self.references {
            write_reference(writer, reference)?;
        }
        if let Some(count) = self.unplaced_unmapped {
            writer.write_all(&count.to_le_bytes())?;
        }
        Ok(())
    }

    /// Write the index to a file, replacing any existing one.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode the index into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

/// Read the optional trailing counter: absent at a clean end of stream,
/// malformed if the stream stops partway through it.
fn read_trailing_u64<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let mut buf = [0u8; 8];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        8 => Ok(Some(u64::from_le_bytes(buf))),
        n => Err(IndexError::malformed(format!(
            "truncated unplaced read counter: {} of 8 bytes",
            n
        ))),
    }
}
