//! Sliding-window pileup over a single chunk.
//!
//! [`PileupWindow`] holds every admitted alignment whose span still reaches the
//! scan coordinate. The coordinate only moves forward; alignments are admitted
//! once their start has been reached and purged once their end falls behind.

use std::collections::VecDeque;

use crate::engine::alignment::AlignmentRecord;

#[derive(Debug)]
pub struct PileupWindow {
    position: i64,
    reads: VecDeque<AlignmentRecord>,
    admitted: u64,
}

impl PileupWindow {
    pub fn new(position: i64) -> Self {
        Self {
            position,
            reads: VecDeque::new(),
            admitted: 0,
        }
    }

    /// Current 0-based scan coordinate.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Add an alignment whose start has been reached by the scan.
    ///
    /// Reads arrive per sample in coordinate order but interleave across
    /// samples, so insertion keeps the window sorted by start.
    pub fn admit(&mut self, record: AlignmentRecord) {
        debug_assert!(record.start <= self.position);
        let idx = self
            .reads
            .iter()
            .rposition(|held| held.start <= record.start)
            .map_or(0, |i| i + 1);
        self.reads.insert(idx, record);
        self.admitted += 1;
    }

    /// Drop every alignment whose end lies behind the scan coordinate.
    ///
    /// Returns the number of purged alignments.
    pub fn purge_past(&mut self) -> usize {
        let before = self.reads.len();
        let position = self.position;
        self.reads.retain(|read| read.end >= position);
        before - self.reads.len()
    }

    /// True when a held alignment has a clipped end meeting the reference at
    /// exactly the scan coordinate.
    pub fn triggers_score(&self) -> bool {
        let position = self.position;
        self.live_reads()
            .any(|read| read.clip_breakpoints().any(|bp| bp == position))
    }

    #[inline]
    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip forward over coordinates with no coverage.
    pub fn jump_to(&mut self, position: i64) {
        debug_assert!(self.reads.is_empty());
        if position > self.position {
            self.position = position;
        }
    }

    /// Alignments that have started at or before the scan coordinate.
    pub fn live_reads(&self) -> impl Iterator<Item = &AlignmentRecord> {
        let position = self.position;
        self.reads.iter().filter(move |read| read.start <= position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Total alignments admitted over the window's lifetime.
    pub fn admitted(&self) -> u64 {
        self.admitted
    }
}
