//! Scoring of one triggered coordinate across the whole cohort.

use std::collections::BTreeMap;

use smartstring::alias::String as CompactString;

use crate::breakpoint::cohort::CohortTest;
use crate::breakpoint::evidence::SampleSiteRecord;
use crate::breakpoint::insert_size::InsertSizeStats;
use crate::breakpoint::sample::{Cohort, SampleCatalog};
use crate::core::error::{Result, WhamError};
use crate::engine::pileup::PileupWindow;

/// Read-only state shared by every worker for the length of a run.
#[derive(Debug)]
pub struct ScanContext {
    samples: SampleCatalog,
    insert_stats: Vec<InsertSizeStats>,
}

impl ScanContext {
    pub fn new(samples: SampleCatalog, insert_stats: Vec<InsertSizeStats>) -> Result<Self> {
        if samples.len() != insert_stats.len() {
            return Err(WhamError::Config(format!(
                "{} samples but {} insert-size profiles",
                samples.len(),
                insert_stats.len()
            )));
        }
        Ok(Self {
            samples,
            insert_stats,
        })
    }

    pub fn samples(&self) -> &SampleCatalog {
        &self.samples
    }
}

/// A site kept for output.
#[derive(Debug, Clone)]
pub struct SiteCall {
    pub chrom: CompactString,
    /// 0-based scan coordinate.
    pub position: i64,
    /// Supporting clip coordinates and their read counts, summed over samples.
    pub clusters: BTreeMap<i64, usize>,
    pub cohort: CohortTest,
    /// One record per sample, in catalog order.
    pub samples: Vec<SampleSiteRecord>,
}

/// Score the window's current coordinate.
///
/// Returns `None` when no supporting cluster sits on the coordinate itself or
/// when no sample receives a non-reference call.
pub fn score_site(ctx: &ScanContext, chrom: &str, window: &PileupWindow) -> Result<Option<SiteCall>> {
    let mut records = vec![SampleSiteRecord::new(); ctx.samples.len()];
    for read in window.live_reads() {
        let (record, stats) = records
            .get_mut(read.sample)
            .zip(ctx.insert_stats.get(read.sample))
            .ok_or_else(|| {
                WhamError::Scoring(format!(
                    "read {} belongs to unknown sample {}",
                    read.name, read.sample
                ))
            })?;
        record.load(read, stats);
    }

    let mut clusters = BTreeMap::new();
    for record in records.iter_mut() {
        record.resolve_clusters(&mut clusters);
    }
    if !clusters.contains_key(&window.position()) {
        return Ok(None);
    }

    let mut any_non_ref = false;
    for record in records.iter_mut() {
        any_non_ref |= record.genotype().genotype.is_non_ref();
    }
    if !any_non_ref {
        return Ok(None);
    }

    let genotypes_of = |cohort: Cohort| {
        ctx.samples
            .iter()
            .zip(records.iter())
            .filter(move |(sample, _)| sample.cohort == cohort)
            .map(|(_, record)| record.call.genotype)
    };
    let cohort = CohortTest::from_genotypes(
        genotypes_of(Cohort::Target),
        genotypes_of(Cohort::Background),
    );

    Ok(Some(SiteCall {
        chrom: CompactString::from(chrom),
        position: window.position(),
        clusters,
        cohort,
        samples: records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::genotype::Genotype;
    use crate::engine::alignment::AlignmentRecord;

    fn context() -> ScanContext {
        let samples = SampleCatalog::new(&["t.bam"], &["b.bam"]).unwrap();
        let stats = InsertSizeStats {
            mean: 300.0,
            stddev: 30.0,
            pairs: 100,
            ..Default::default()
        };
        ScanContext::new(samples, vec![stats; 2]).unwrap()
    }

    fn window_at(position: i64, reads: Vec<AlignmentRecord>) -> PileupWindow {
        let mut window = PileupWindow::new(position);
        for read in reads {
            window.admit(read);
        }
        window
    }

    fn clipped(sample: usize, name: &str) -> AlignmentRecord {
        AlignmentRecord::builder(sample, name, 1000, 1100)
            .leading_clip(30)
            .build()
    }

    fn plain(sample: usize, name: &str) -> AlignmentRecord {
        AlignmentRecord::builder(sample, name, 950, 1050).build()
    }

    #[test]
    fn scores_a_shared_breakpoint() {
        let ctx = context();
        let window = window_at(
            1000,
            vec![
                plain(0, "t3"),
                plain(1, "b3"),
                clipped(0, "t1"),
                clipped(0, "t2"),
                clipped(1, "b1"),
                clipped(1, "b2"),
            ],
        );
        let site = score_site(&ctx, "chr1", &window).unwrap().unwrap();
        assert_eq!(site.position, 1000);
        assert_eq!(site.clusters.get(&1000), Some(&4));
        assert!(site.samples.iter().all(|s| s.support));
        assert_eq!(site.samples[0].call.genotype, Genotype::Het);
        assert_eq!(site.cohort.target.samples, 1);
        assert_eq!(site.cohort.background.samples, 1);
    }

    #[test]
    fn shallow_samples_are_discarded() {
        let ctx = context();
        let window = window_at(
            1000,
            vec![clipped(0, "t1"), clipped(0, "t2"), clipped(1, "b1"), clipped(1, "b2")],
        );
        assert!(score_site(&ctx, "chr1", &window).unwrap().is_none());
    }

    #[test]
    fn cluster_elsewhere_does_not_score_here() {
        let ctx = context();
        let window = window_at(
            1000,
            vec![
                clipped(0, "t1"),
                AlignmentRecord::builder(0, "t2", 990, 1080)
                    .trailing_clip(10)
                    .build(),
                AlignmentRecord::builder(0, "t3", 990, 1080)
                    .trailing_clip(10)
                    .build(),
                plain(0, "t4"),
            ],
        );
        assert!(score_site(&ctx, "chr1", &window).unwrap().is_none());
    }

    #[test]
    fn isolated_alternate_read_needs_another_sample_cluster() {
        let ctx = context();
        let mut reads: Vec<_> = (0..9).map(|i| plain(0, &format!("t{}", i))).collect();
        reads.push(
            AlignmentRecord::builder(0, "t_alt", 1000, 1100)
                .leading_clip(30)
                .mate_unmapped()
                .build(),
        );
        let alone = window_at(1000, reads.clone());
        assert!(score_site(&ctx, "chr1", &alone).unwrap().is_none());

        reads.extend([clipped(1, "b1"), clipped(1, "b2"), plain(1, "b3")]);
        let together = window_at(1000, reads);
        let site = score_site(&ctx, "chr1", &together).unwrap().unwrap();
        assert!(!site.samples[0].support);
        assert_eq!(site.samples[0].call.n_alt, 0);
        assert_eq!(site.samples[0].call.genotype, Genotype::HomRef);
        assert!(site.samples[1].support);
        assert_eq!(site.clusters.get(&1000), Some(&2));
    }

    #[test]
    fn unknown_sample_is_a_scoring_error() {
        let ctx = context();
        let window = window_at(1000, vec![clipped(5, "x")]);
        let err = score_site(&ctx, "chr1", &window).unwrap_err();
        assert!(matches!(err, WhamError::Scoring(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn context_rejects_mismatched_profiles() {
        let samples = SampleCatalog::new(&["t.bam"], &["b.bam"]).unwrap();
        assert!(ScanContext::new(samples, vec![InsertSizeStats::default()]).is_err());
    }
}
