//! bamdex: random-access index for coordinate-sorted BGZF alignment files
//!
//! # Overview
//!
//! bamdex builds and queries the hierarchical bin/chunk/linear index that
//! lets a reader jump straight to the records overlapping a genomic region
//! instead of scanning a whole BAM file.
//!
//! ## Key Features
//!
//! - **Sound query plans**: every record overlapping a region lies in a returned chunk
//! - **Streaming build**: one pass over a sorted record stream, O(1) amortized per record
//! - **Parallel build**: independent references on a bounded rayon pool
//! - **Bit-exact persistence**: BAI layout, byte-identical re-serialization
//! - **Configurable binning**: any level count and window width, for testing at small scale
//!
//! ## Quick Start
//!
//! Indexes written by bamdex load directly. Indexes written by samtools
//! carry a metadata pseudo-bin that is rejected as malformed; see
//! [`BaiIndex::from_path`].
//!
//! ```no_run
//! use bamdex::BaiIndex;
//!
//! # fn main() -> bamdex::Result<()> {
//! let index = BaiIndex::from_path("alignments.bam.bai")?;
//!
//! // chr1:1,000,000-2,000,000 (reference 0)
//! for chunk in index.query(0, 1_000_000, 2_000_000)? {
//!     println!("scan {} .. {}", chunk.start(), chunk.end());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`index`]: virtual offsets, chunks, binning, builders, query planning and BAI codec
//! - [`error`]: error type and result alias

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod index;

// Re-export commonly used types
pub use error::{IndexError, Result};
pub use index::{
    coalesce, BaiIndex, Bin, BinIndex, BinKey, BinningScheme, Chunk, IndexBuilder, IndexRecord,
    LinearIndex, QueryPlanner, ReferenceIndex, ReferenceIndexBuilder, VirtualOffset,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
