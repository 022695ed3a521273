//! Scanning machinery: alignment records, the sliding-window pileup, the
//! per-chunk scan loop, and the parallel chunk scheduler.

pub mod alignment;
pub mod chunk;
pub mod par_granges;
pub mod pileup;

pub use alignment::{AlignmentRecord, SampleId};
pub use chunk::{scan_chunk, ChunkSummary};
pub use par_granges::{ParGranges, RegionChunk, RegionProcessor};
pub use pileup::PileupWindow;
