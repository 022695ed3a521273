//! Parallel genomic chunk processing.
//!
//! The [`ParGranges`] executor fans chunks out across a Rayon pool and streams
//! each chunk's results through a bounded crossbeam channel to one consumer.
//! Callers implement [`RegionProcessor`] to define per-chunk work; the chunk
//! list itself comes from [`intervals`] (whole-genome tiling, BED intervals, or
//! a single region).

pub mod intervals;
mod scheduler;
mod types;

pub use intervals::{bed_to_chunks, split_chunks, tile_reference, ReferenceCatalog, RegionSpec};
pub use scheduler::{ParGranges, ParGrangesHandle, RunSummary};
pub use types::{
    RegionChunk, RegionProcessor, CHANNEL_SIZE_MODIFIER, CHUNKSIZE, CHUNKSIZE_STR, EDGE_MARGIN,
    MIN_REFERENCE_LENGTH,
};
