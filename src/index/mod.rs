//! Hierarchical binning index for coordinate-sorted BGZF files.
//!
//! This module builds, stores and queries the BAI-style index that maps a
//! genomic region to the byte ranges holding its records.
//!
//! # Layout
//!
//! Each reference sequence carries two structures:
//!
//! - **Binning index**: every record is filed under the smallest bin of a
//!   fixed hierarchy that contains it, together with the chunk of virtual
//!   offsets where it lives. See [`BinningScheme`] for the numbering.
//! - **Linear index**: for each 16 Kbp window, a lower bound on the offset
//!   of any record overlapping that window.
//!
//! # Virtual File Offsets
//!
//! BGZF virtual offsets combine:
//! - **Compressed offset** (high 48 bits): position of the BGZF block
//! - **Uncompressed offset** (low 16 bits): position inside the decompressed block
//!
//! # Building and Querying
//!
//! ```
//! use bamdex::{IndexBuilder, IndexRecord, VirtualOffset};
//!
//! # fn main() -> bamdex::Result<()> {
//! let vo = VirtualOffset::new;
//! let mut builder = IndexBuilder::new();
//! builder.push(IndexRecord::new(0, 100, 200, vo(0, 10), vo(0, 50)))?;
//! builder.push(IndexRecord::new(0, 150, 300, vo(0, 50), vo(0, 120)))?;
//! builder.push(IndexRecord::new(0, 90_000, 90_100, vo(4096, 0), vo(4096, 40)))?;
//! let index = builder.finish()?;
//!
//! // Only the first two records can overlap 120..160
//! let chunks = index.query(0, 120, 160)?;
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].end(), vo(0, 120));
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! [`BaiIndex::read`] and [`BaiIndex::write`] use the BAI layout. Decoding
//! then encoding an index reproduces it byte for byte.

pub mod bai;
pub mod bin;
pub mod bin_index;
pub mod binning;
pub mod builder;
pub mod chunk;
pub mod codec;
pub mod linear;
pub mod query;
pub mod reference;
pub mod virtual_offset;

pub use bai::{BaiIndex, BAI_MAGIC};
pub use bin::{Bin, BinKey};
pub use bin_index::{BinIndex, BinIndexBuilder};
pub use binning::{BinningScheme, BAI_LEVEL_COUNT, BAI_WINDOW_WIDTH};
pub use builder::{IndexBuilder, IndexRecord, MAX_REFERENCE_COUNT};
pub use chunk::{coalesce, Chunk};
pub use linear::{LinearIndex, LinearIndexBuilder};
pub use query::QueryPlanner;
pub use reference::{ReferenceIndex, ReferenceIndexBuilder};
pub use virtual_offset::VirtualOffset;
