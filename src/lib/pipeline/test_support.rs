//! BAM fixtures for pipeline tests.

use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use rust_htslib::bam::{self, record::CigarString, Record};

/// A read to place in a fixture BAM.
#[derive(Debug, Clone)]
pub struct FixtureRead {
    pub name: &'static str,
    pub tid: i32,
    pub pos: i64,
    pub cigar: &'static str,
    pub mapq: u8,
    pub insert_size: i64,
}

impl FixtureRead {
    pub fn new(name: &'static str, tid: i32, pos: i64, cigar: &'static str) -> Self {
        Self {
            name,
            tid,
            pos,
            cigar,
            mapq: 60,
            insert_size: 300,
        }
    }
}

/// Write a coordinate-sorted, indexed BAM and return its path.
///
/// Reads are written as first mates of properly paired, forward-strand pairs.
pub fn write_bam(
    dir: &Path,
    name: &str,
    references: &[(&str, u32)],
    sort_order: Option<&str>,
    reads: &[FixtureRead],
) -> PathBuf {
    let path = dir.join(name);
    let mut header = bam::Header::new();
    let mut hd = bam::header::HeaderRecord::new(b"HD");
    hd.push_tag(b"VN", &"1.6");
    if let Some(order) = sort_order {
        hd.push_tag(b"SO", &order);
    }
    header.push_record(&hd);
    for (seq, len) in references {
        let mut sq = bam::header::HeaderRecord::new(b"SQ");
        sq.push_tag(b"SN", seq);
        sq.push_tag(b"LN", len);
        header.push_record(&sq);
    }

    let mut sorted = reads.to_vec();
    sorted.sort_by_key(|r| (r.tid, r.pos));
    {
        let mut writer = bam::Writer::from_path(&path, &header, bam::Format::Bam).unwrap();
        for read in &sorted {
            let cigar = CigarString::try_from(read.cigar).unwrap();
            let qlen = cigar
                .iter()
                .filter(|op| op.char() == 'M' || op.char() == 'I' || op.char() == 'S')
                .map(|op| op.len() as usize)
                .sum::<usize>();
            let seq = vec![b'A'; qlen];
            let qual = vec![30u8; qlen];
            let mut record = Record::new();
            record.set(read.name.as_bytes(), Some(&cigar), &seq, &qual);
            record.set_tid(read.tid);
            record.set_pos(read.pos);
            record.set_mapq(read.mapq);
            record.set_flags(0x1 | 0x2 | 0x20 | 0x40);
            record.set_mtid(read.tid);
            record.set_mpos(read.pos + read.insert_size - 100);
            record.set_insert_size(read.insert_size);
            writer.write(&record).unwrap();
        }
    }
    if sort_order.is_some() {
        bam::index::build(&path, None, bam::index::Type::Bai, 1).unwrap();
    }
    path
}
