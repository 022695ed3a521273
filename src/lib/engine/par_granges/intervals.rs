//! Building the chunk list: uniform tiles, BED intervals, or a single region.

use std::path::Path;

use bio::io::bed;
use log::warn;
use rust_htslib::bam::HeaderView;
use rust_lapper::{Interval, Lapper};
use rustc_hash::FxHashMap;

use super::types::{RegionChunk, EDGE_MARGIN, MIN_REFERENCE_LENGTH};
use crate::core::error::{Result, WhamError};

/// Reference sequence names and lengths from an alignment header.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    names: Vec<String>,
    lengths: Vec<u32>,
    index: FxHashMap<String, u32>,
}

impl ReferenceCatalog {
    pub fn from_header(header: &HeaderView) -> Result<Self> {
        let mut entries = Vec::with_capacity(header.target_count() as usize);
        for tid in 0..header.target_count() {
            let name = String::from_utf8_lossy(header.tid2name(tid)).into_owned();
            let len = header
                .target_len(tid)
                .ok_or_else(|| WhamError::Config(format!("Missing target length for TID {}", tid)))?;
            let len = u32::try_from(len).map_err(|_| {
                WhamError::Config(format!("Target length overflow for TID {}", tid))
            })?;
            entries.push((name, len));
        }
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for (name, len) in entries {
            let name = name.into();
            catalog
                .index
                .insert(name.clone(), catalog.names.len() as u32);
            catalog.names.push(name);
            catalog.lengths.push(len);
        }
        catalog
    }

    pub fn tid(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    pub fn name(&self, tid: u32) -> Option<&str> {
        self.names.get(tid as usize).map(String::as_str)
    }

    pub fn length(&self, tid: u32) -> Option<u32> {
        self.lengths.get(tid as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Same sequence names and lengths in the same order.
    pub fn matches(&self, other: &ReferenceCatalog) -> bool {
        self.names == other.names && self.lengths == other.lengths
    }

    /// `name:start-end` for log and error messages.
    pub fn describe(&self, chunk: &RegionChunk) -> String {
        format!(
            "{}:{}-{}",
            self.name(chunk.tid).unwrap_or("?"),
            chunk.start,
            chunk.end
        )
    }
}

/// Tile every reference sequence into `chunksize` pieces.
///
/// The first [`EDGE_MARGIN`] bases are skipped and sequences shorter than
/// [`MIN_REFERENCE_LENGTH`] are left out entirely.
pub fn tile_reference(catalog: &ReferenceCatalog, chunksize: u32) -> Vec<RegionChunk> {
    let chunksize = chunksize.max(1);
    let mut chunks = Vec::new();
    for tid in 0..catalog.len() as u32 {
        let len = catalog.length(tid).unwrap_or(0);
        if len < MIN_REFERENCE_LENGTH {
            warn!(
                "{} is too short to scan: {}",
                catalog.name(tid).unwrap_or("?"),
                len
            );
            continue;
        }
        let mut start = EDGE_MARGIN;
        while start < len - EDGE_MARGIN {
            let end = start.saturating_add(chunksize).min(len);
            chunks.push(RegionChunk::new(tid, start, end));
            start = start.saturating_add(chunksize);
        }
        if start < len {
            chunks.push(RegionChunk::new(tid, start, len));
        }
    }
    chunks
}

/// One chunk per BED interval, optionally merging overlaps per sequence.
///
/// Intervals on sequences missing from the catalog are skipped with a warning.
pub fn bed_to_chunks<P: AsRef<Path>>(
    catalog: &ReferenceCatalog,
    bed_file: P,
    merge: bool,
) -> Result<Vec<RegionChunk>> {
    let mut bed_reader = bed::Reader::from_file(bed_file.as_ref())
        .map_err(|e| WhamError::Config(format!("Unable to open BED {}: {}", bed_file.as_ref().display(), e)))?;
    let mut intervals: Vec<Vec<Interval<u32, ()>>> = vec![vec![]; catalog.len()];
    for (i, record) in bed_reader.records().enumerate() {
        let record =
            record.map_err(|e| WhamError::Parse(format!("BED record {} is invalid: {}", i, e)))?;
        let Some(tid) = catalog.tid(record.chrom()) else {
            warn!(
                "BED record {} on '{}' not found in BAM header, skipping",
                i,
                record.chrom()
            );
            continue;
        };
        let start = u32::try_from(record.start()).map_err(|_| {
            WhamError::Parse(format!("BED record {} is invalid: unable to parse start", i))
        })?;
        let stop = u32::try_from(record.end()).map_err(|_| {
            WhamError::Parse(format!("BED record {} is invalid: unable to parse stop", i))
        })?;
        if stop < start {
            return Err(WhamError::Parse(format!(
                "BED record {} is invalid: stop < start",
                i
            )));
        }
        if stop == start {
            continue;
        }
        intervals[tid as usize].push(Interval {
            start,
            stop,
            val: (),
        });
    }

    let mut chunks = Vec::new();
    for (tid, ivs) in intervals.into_iter().enumerate() {
        let mut lapper = Lapper::new(ivs);
        if merge {
            lapper.merge_overlaps();
        }
        chunks.extend(
            lapper
                .iter()
                .map(|iv| RegionChunk::new(tid as u32, iv.start, iv.stop)),
        );
    }
    Ok(chunks)
}

/// Cut chunks longer than `chunksize` into consecutive pieces.
pub fn split_chunks(chunks: Vec<RegionChunk>, chunksize: u32) -> Vec<RegionChunk> {
    let chunksize = chunksize.max(1);
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let mut start = chunk.start;
        while start < chunk.end {
            let end = start.saturating_add(chunksize).min(chunk.end);
            out.push(RegionChunk::new(chunk.tid, start, end));
            start = end;
        }
    }
    out
}

/// A `seqid:start-end` region as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    pub seqid: String,
    pub start: u32,
    pub end: u32,
}

impl std::str::FromStr for RegionSpec {
    type Err = WhamError;

    fn from_str(region: &str) -> Result<Self> {
        let invalid = |reason: &str| WhamError::InvalidRegion {
            region: region.to_string(),
            reason: reason.to_string(),
        };
        let (seqid, span) = region
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected seqid:start-end"))?;
        if seqid.is_empty() {
            return Err(invalid("missing sequence name"));
        }
        let (start, end) = span
            .split_once('-')
            .ok_or_else(|| invalid("expected start-end"))?;
        let parse = |value: &str| -> Result<u32> {
            value
                .trim()
                .replace(',', "")
                .parse::<u32>()
                .map_err(|_| invalid("coordinates must be non-negative integers"))
        };
        let (start, end) = (parse(start)?, parse(end)?);
        if end <= start {
            return Err(invalid("end must be greater than start"));
        }
        Ok(RegionSpec {
            seqid: seqid.to_string(),
            start,
            end,
        })
    }
}

impl RegionSpec {
    /// Resolve against the header; an unknown sequence name is a configuration error.
    pub fn to_chunk(&self, catalog: &ReferenceCatalog) -> Result<RegionChunk> {
        let tid = catalog.tid(&self.seqid).ok_or_else(|| WhamError::InvalidRegion {
            region: format!("{}:{}-{}", self.seqid, self.start, self.end),
            reason: "sequence not found in BAM header".to_string(),
        })?;
        let len = catalog.length(tid).unwrap_or(u32::MAX);
        let end = self.end.min(len);
        if end <= self.start {
            return Err(WhamError::InvalidRegion {
                region: format!("{}:{}-{}", self.seqid, self.start, self.end),
                reason: format!("start lies beyond sequence length {}", len),
            });
        }
        Ok(RegionChunk::new(tid, self.start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::from_entries(vec![
            ("chr1", 25_000_000u32),
            ("chrUn", 1_500),
            ("chr2", 12_000),
        ])
    }

    #[test]
    fn split_keeps_pieces_contiguous() {
        let pieces = split_chunks(
            vec![RegionChunk::new(0, 100, 350), RegionChunk::new(2, 0, 50)],
            100,
        );
        assert_eq!(
            pieces,
            vec![
                RegionChunk::new(0, 100, 200),
                RegionChunk::new(0, 200, 300),
                RegionChunk::new(0, 300, 350),
                RegionChunk::new(2, 0, 50),
            ]
        );
    }

    #[test]
    fn tiles_skip_short_sequences_and_margin() {
        let chunks = tile_reference(&catalog(), 10_000_000);
        assert_eq!(
            chunks,
            vec![
                RegionChunk::new(0, 500, 10_000_500),
                RegionChunk::new(0, 10_000_500, 20_000_500),
                RegionChunk::new(0, 20_000_500, 25_000_000),
                RegionChunk::new(2, 500, 12_000),
            ]
        );
    }

    #[test]
    fn tiles_cover_tail_with_small_chunks() {
        let cat = ReferenceCatalog::from_entries(vec![("chrS", 2_300u32)]);
        let chunks = tile_reference(&cat, 1_000);
        assert_eq!(
            chunks,
            vec![
                RegionChunk::new(0, 500, 1_500),
                RegionChunk::new(0, 1_500, 2_300),
            ]
        );
    }

    #[test]
    fn parses_region_strings() {
        let spec: RegionSpec = "chr1:1,000-2000".parse().unwrap();
        assert_eq!(
            spec,
            RegionSpec {
                seqid: "chr1".into(),
                start: 1000,
                end: 2000
            }
        );
        let hla: RegionSpec = "HLA-A*01:01:01:01:10-20".parse().unwrap();
        assert_eq!(hla.seqid, "HLA-A*01:01:01:01");

        for bad in ["chr1", "chr1:100", "chr1:200-100", ":1-2", "chr1:a-b"] {
            assert!(bad.parse::<RegionSpec>().is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn region_resolves_against_catalog() {
        let cat = catalog();
        let spec: RegionSpec = "chr2:100-50000".parse().unwrap();
        assert_eq!(spec.to_chunk(&cat).unwrap(), RegionChunk::new(2, 100, 12_000));
        let missing: RegionSpec = "chr9:1-10".parse().unwrap();
        assert!(missing.to_chunk(&cat).unwrap_err().is_fatal());
    }

    #[test]
    fn bed_intervals_become_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.bed");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chr1\t100\t200").unwrap();
        writeln!(file, "chr1\t150\t300").unwrap();
        writeln!(file, "chrZ\t1\t10").unwrap();
        writeln!(file, "chr2\t5\t50").unwrap();
        drop(file);

        let cat = catalog();
        let unmerged = bed_to_chunks(&cat, &path, false).unwrap();
        assert_eq!(unmerged.len(), 3);
        let merged = bed_to_chunks(&cat, &path, true).unwrap();
        assert_eq!(
            merged,
            vec![RegionChunk::new(0, 100, 300), RegionChunk::new(2, 5, 50)]
        );
    }
}
