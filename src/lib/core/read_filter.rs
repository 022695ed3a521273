//! Read filtering primitives applied before an alignment enters a pileup.
//!
//! This module exposes the [`ReadFilter`] trait along with the default
//! mapping-quality based filter.

use crate::engine::alignment::AlignmentRecord;

/// A trait for filtering reads based on various criteria.
///
/// Implementations should return `true` if the read passes the filter and `false` otherwise.
pub trait ReadFilter {
    /// Filter a read based on various criteria.
    fn filter_read(&self, read: &AlignmentRecord) -> bool;
}

/// Keeps mapped reads whose mapping quality reaches a minimum.
pub struct DefaultReadFilter {
    /// The read's mapping quality must be greater than or equal to this value to pass.
    min_mapq: u8,
}

impl DefaultReadFilter {
    /// Create a new [`DefaultReadFilter`] with the specified criteria.
    pub fn new(min_mapq: u8) -> Self {
        Self { min_mapq }
    }
}

impl Default for DefaultReadFilter {
    /// MAPQ 0 reads carry no placement information and are never admitted.
    fn default() -> Self {
        Self::new(1)
    }
}

impl ReadFilter for DefaultReadFilter {
    #[inline(always)]
    fn filter_read(&self, read: &AlignmentRecord) -> bool {
        read.is_mapped && read.mapq > 0 && read.mapq >= self.min_mapq
    }
}
