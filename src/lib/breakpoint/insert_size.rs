//! Insert-size profiling.
//!
//! A single sequential pass over the head of each alignment file estimates the
//! insert-size distribution of properly mapped pairs. The resulting
//! [`InsertSizeStats`] snapshot is computed once per sample before any region
//! is scanned and is read-only afterwards.

use std::path::Path;

use log::{info, warn};
use rust_htslib::bam::{self, Read};
use serde::Serialize;

use crate::breakpoint::sample::{Sample, SampleCatalog};
use crate::core::error::Result;
use crate::core::retry::RetryPolicy;
use crate::engine::alignment::{AlignmentRecord, SampleId};

/// Qualifying pairs after which profiling stops.
pub const MAX_PROFILE_PAIRS: usize = 100_000;
/// A read whose absolute insert reaches this ends the profiling pass.
pub const MAX_PROFILE_INSERT: i64 = 10_000;
/// Distance from the mean, in standard deviations, that marks an insert as anomalous.
pub const ANOMALOUS_INSERT_SDS: f64 = 3.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InsertSizeStats {
    pub mean: f64,
    pub stddev: f64,
    pub lower_quartile: f64,
    pub upper_quartile: f64,
    /// Number of first-mate, both-mapped pairs that contributed.
    pub pairs: usize,
    /// Mean fraction of read length lost to clipping over mapped reads.
    pub clipped_fraction: f64,
}

impl InsertSizeStats {
    /// Fewer than two pairs leave the standard deviation undefined.
    pub fn is_usable(&self) -> bool {
        self.pairs >= 2
    }

    /// Whether `insert_size` lies more than three standard deviations from the mean.
    ///
    /// Always false for an unusable profile.
    pub fn is_anomalous(&self, insert_size: i64) -> bool {
        if !self.is_usable() {
            return false;
        }
        (insert_size.abs() as f64 - self.mean).abs() > ANOMALOUS_INSERT_SDS * self.stddev
    }
}

/// Streaming accumulator behind [`estimate`].
#[derive(Debug, Default)]
pub struct InsertSizeProfiler {
    inserts: Vec<f64>,
    clipped_fraction_sum: f64,
    mapped_reads: u64,
    done: bool,
}

impl InsertSizeProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next record in file order.
    ///
    /// Returns `false` once profiling is complete; later records are ignored.
    pub fn observe(&mut self, read: &AlignmentRecord) -> bool {
        if self.done {
            return false;
        }
        if read.insert_size.abs() >= MAX_PROFILE_INSERT {
            self.done = true;
            return false;
        }
        if read.is_mapped {
            self.mapped_reads += 1;
            self.clipped_fraction_sum += read.clipped_fraction();
            if read.is_first_mate && read.is_mate_mapped {
                self.inserts.push(read.insert_size.abs() as f64);
            }
        }
        if self.inserts.len() >= MAX_PROFILE_PAIRS {
            self.done = true;
        }
        !self.done
    }

    pub fn finish(mut self) -> InsertSizeStats {
        let pairs = self.inserts.len();
        let clipped_fraction = if self.mapped_reads == 0 {
            0.0
        } else {
            self.clipped_fraction_sum / self.mapped_reads as f64
        };
        if pairs == 0 {
            return InsertSizeStats {
                clipped_fraction,
                ..Default::default()
            };
        }

        let n = pairs as f64;
        let mean = self.inserts.iter().sum::<f64>() / n;
        let stddev = if pairs < 2 {
            0.0
        } else {
            let ss: f64 = self.inserts.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        };

        self.inserts.sort_by(|a, b| a.total_cmp(b));
        InsertSizeStats {
            mean,
            stddev,
            lower_quartile: quantile(&self.inserts, 0.25),
            upper_quartile: quantile(&self.inserts, 0.75),
            pairs,
            clipped_fraction,
        }
    }
}

/// Linearly interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Profile records in file order until the pair or insert cap is hit.
pub fn estimate<I>(records: I) -> Result<InsertSizeStats>
where
    I: IntoIterator<Item = Result<AlignmentRecord>>,
{
    let mut profiler = InsertSizeProfiler::new();
    for record in records {
        if !profiler.observe(&record?) {
            break;
        }
    }
    Ok(profiler.finish())
}

/// Profile the head of one alignment file; no index is needed.
pub fn estimate_from_bam(
    path: &Path,
    sample: SampleId,
    retry: &RetryPolicy,
) -> Result<InsertSizeStats> {
    let mut reader = retry.run(path, || bam::Reader::from_path(path))?;
    let records = reader
        .records()
        .map(|r| r.map(|rec| AlignmentRecord::from_bam(&rec, sample)).map_err(Into::into));
    estimate(records)
}

fn log_profile(sample: &Sample, stats: &InsertSizeStats) {
    info!(
        "{}: insert mean {:.2}, sd {:.2}, {} pairs",
        sample.label(),
        stats.mean,
        stats.stddev,
        stats.pairs
    );
    info!(
        "{}: mean clipped fraction {:.4}",
        sample.label(),
        stats.clipped_fraction
    );
    if !stats.is_usable() {
        warn!(
            "{}: too few mapped pairs for an insert-size profile; anomalous-insert evidence disabled",
            sample.label()
        );
    }
}

/// Profile every sample in catalog order.
pub fn profile_samples(samples: &SampleCatalog, retry: &RetryPolicy) -> Result<Vec<InsertSizeStats>> {
    samples
        .iter()
        .map(|sample| {
            let stats = estimate_from_bam(&sample.path, sample.id, retry)?;
            log_profile(sample, &stats);
            Ok(stats)
        })
        .collect()
}
