use std::fmt;

use lazy_static::lazy_static;

use crate::core::error::Result;

/// Default tile width when the whole genome is scanned.
pub const CHUNKSIZE: u32 = 10_000_000;

/// Bases skipped at the start of each reference sequence when tiling.
pub const EDGE_MARGIN: u32 = 500;

/// Reference sequences shorter than this are not tiled.
pub const MIN_REFERENCE_LENGTH: u32 = 2_000;

/// Result batches buffered in the output channel per worker thread.
pub const CHANNEL_SIZE_MODIFIER: usize = 4;

lazy_static! {
    /// [`CHUNKSIZE`] as a string.
    pub static ref CHUNKSIZE_STR: String = CHUNKSIZE.to_string();
}

/// An independently scheduled genomic interval, 0-based half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionChunk {
    pub tid: u32,
    pub start: u32,
    pub end: u32,
}

impl RegionChunk {
    pub fn new(tid: u32, start: u32, end: u32) -> Self {
        Self { tid, start, end }
    }
}

impl fmt::Display for RegionChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid {}:{}-{}", self.tid, self.start, self.end)
    }
}

/// Trait defining how genomic regions are processed.
pub trait RegionProcessor {
    /// The type handed to the consumer.
    type P: 'static + Send;

    /// Process one chunk, passing results to `emit` as they become ready.
    ///
    /// Non-fatal errors (see [`crate::core::error::WhamError::is_fatal`]) skip the
    /// rest of the chunk; fatal errors stop the whole run.
    fn process_region(&self, chunk: &RegionChunk, emit: &mut dyn FnMut(Self::P)) -> Result<()>;
}
