//! Alignment records as seen by the pileup.
//!
//! [`AlignmentRecord`] is a small owned view of a BAM record holding only what
//! breakpoint scanning needs: coordinates, clip lengths at either end of the
//! CIGAR, mapping quality, pairing flags, insert size, and the sample the read
//! came from. Keeping it independent of `rust_htslib` lets the pileup and the
//! scorers run on synthetic reads in tests.

use rust_htslib::bam::record::{Cigar, Record};
use smartstring::alias::String as CompactString;

/// Index of a sample in the run's sample catalog.
pub type SampleId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    pub sample: SampleId,
    pub name: CompactString,
    /// 0-based leftmost aligned reference base.
    pub start: i64,
    /// 0-based exclusive end of the aligned block.
    pub end: i64,
    /// Length of a leading soft/hard clip, 0 when the CIGAR starts aligned.
    pub leading_clip: u32,
    /// Length of a trailing soft/hard clip, 0 when the CIGAR ends aligned.
    pub trailing_clip: u32,
    pub mapq: u8,
    pub is_mapped: bool,
    pub is_mate_mapped: bool,
    pub is_reverse: bool,
    pub is_mate_reverse: bool,
    pub is_first_mate: bool,
    pub insert_size: i64,
    /// Stored query length (hard-clipped bases excluded).
    pub length: u32,
}

#[inline]
fn clip_len(op: Option<&Cigar>) -> u32 {
    match op {
        Some(Cigar::SoftClip(len)) | Some(Cigar::HardClip(len)) => *len,
        _ => 0,
    }
}

impl AlignmentRecord {
    /// Convert an htslib record read from `sample`'s file.
    pub fn from_bam(record: &Record, sample: SampleId) -> Self {
        let cigar = record.cigar();
        let mut ops = cigar.iter();
        let first = ops.next();
        let leading_clip = clip_len(first);
        let trailing_clip = clip_len(ops.last());
        let start = record.pos();
        let end = if first.is_none() {
            start + 1
        } else {
            cigar.end_pos()
        };
        AlignmentRecord {
            sample,
            name: CompactString::from(String::from_utf8_lossy(record.qname()).as_ref()),
            start,
            end,
            leading_clip,
            trailing_clip,
            mapq: record.mapq(),
            is_mapped: !record.is_unmapped(),
            is_mate_mapped: !record.is_mate_unmapped(),
            is_reverse: record.is_reverse(),
            is_mate_reverse: record.is_mate_reverse(),
            is_first_mate: record.is_first_in_template(),
            insert_size: record.insert_size(),
            length: record.seq_len() as u32,
        }
    }

    /// Reference coordinates at which this read's clipped ends meet the alignment.
    ///
    /// A leading clip breaks at `start`, a trailing clip at `end`.
    pub fn clip_breakpoints(&self) -> impl Iterator<Item = i64> {
        let leading = (self.leading_clip > 0).then_some(self.start);
        let trailing = (self.trailing_clip > 0).then_some(self.end);
        leading.into_iter().chain(trailing)
    }

    #[inline]
    pub fn is_clipped(&self) -> bool {
        self.leading_clip > 0 || self.trailing_clip > 0
    }

    #[inline]
    pub fn clipped_bases(&self) -> u64 {
        self.leading_clip as u64 + self.trailing_clip as u64
    }

    /// Clipped bases relative to the stored read length.
    pub fn clipped_fraction(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        self.clipped_bases() as f64 / self.length as f64
    }

    /// Both mates aligned to the same strand.
    #[inline]
    pub fn is_same_strand_pair(&self) -> bool {
        self.is_mate_mapped && self.is_reverse == self.is_mate_reverse
    }

    pub fn builder<S: AsRef<str>>(
        sample: SampleId,
        name: S,
        start: i64,
        end: i64,
    ) -> AlignmentRecordBuilder {
        AlignmentRecordBuilder {
            record: AlignmentRecord {
                sample,
                name: CompactString::from(name.as_ref()),
                start,
                end,
                leading_clip: 0,
                trailing_clip: 0,
                mapq: 60,
                is_mapped: true,
                is_mate_mapped: true,
                is_reverse: false,
                is_mate_reverse: true,
                is_first_mate: true,
                insert_size: 300,
                length: (end - start).max(0) as u32,
            },
        }
    }
}

/// Builder for synthetic reads; defaults describe a properly paired,
/// forward-strand first mate with MAPQ 60 and a 300 bp insert.
#[derive(Debug, Clone)]
pub struct AlignmentRecordBuilder {
    record: AlignmentRecord,
}

impl AlignmentRecordBuilder {
    pub fn mapq(mut self, mapq: u8) -> Self {
        self.record.mapq = mapq;
        self
    }

    pub fn leading_clip(mut self, len: u32) -> Self {
        self.record.leading_clip = len;
        self.record.length += len;
        self
    }

    pub fn trailing_clip(mut self, len: u32) -> Self {
        self.record.trailing_clip = len;
        self.record.length += len;
        self
    }

    pub fn insert_size(mut self, insert_size: i64) -> Self {
        self.record.insert_size = insert_size;
        self
    }

    pub fn unmapped(mut self) -> Self {
        self.record.is_mapped = false;
        self
    }

    pub fn mate_unmapped(mut self) -> Self {
        self.record.is_mate_mapped = false;
        self
    }

    pub fn strands(mut self, reverse: bool, mate_reverse: bool) -> Self {
        self.record.is_reverse = reverse;
        self.record.is_mate_reverse = mate_reverse;
        self
    }

    pub fn second_mate(mut self) -> Self {
        self.record.is_first_mate = false;
        self
    }

    pub fn build(self) -> AlignmentRecord {
        self.record
    }
}
