//! Per-sample evidence gathered at a candidate site.
//!
//! Every live read of a sample is loaded into a [`SampleSiteRecord`]: read-level
//! flags for discordant pairing, plus clip-coordinate clusters of read names.
//! A cluster backed by at least [`MIN_CLUSTER_READS`] distinct reads marks the
//! sample as supporting and forces its members to be counted as alternate.

use std::collections::{BTreeMap, BTreeSet};

use smartstring::alias::String as CompactString;

use crate::breakpoint::genotype::{call_genotype, GenotypeCall, ReadObservation};
use crate::breakpoint::insert_size::InsertSizeStats;
use crate::engine::alignment::AlignmentRecord;

/// Distinct reads a clip coordinate needs before it counts as support.
pub const MIN_CLUSTER_READS: usize = 2;

/// Read names grouped by clip coordinate (0-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMap {
    buckets: BTreeMap<i64, BTreeSet<CompactString>>,
}

impl ClusterMap {
    pub fn register(&mut self, coordinate: i64, read_name: &str) {
        self.buckets
            .entry(coordinate)
            .or_default()
            .insert(CompactString::from(read_name));
    }

    /// Distinct reads clipped at `coordinate`.
    pub fn support_at(&self, coordinate: i64) -> usize {
        self.buckets.get(&coordinate).map_or(0, BTreeSet::len)
    }

    /// Coordinates meeting the support threshold, with their members.
    pub fn supporting(&self) -> impl Iterator<Item = (i64, &BTreeSet<CompactString>)> {
        self.buckets
            .iter()
            .filter(|(_, names)| names.len() >= MIN_CLUSTER_READS)
            .map(|(&coordinate, names)| (coordinate, names))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadState {
    mapq: u8,
    alternate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SampleSiteRecord {
    /// Alignments loaded, duplicates of a read name included.
    pub n_reads: u32,
    pub mapped_pairs: u32,
    pub mate_missing: u32,
    pub same_strand: u32,
    pub n_above_avg_insert: u32,
    pub clipped_bases: u64,
    pub mapqs: Vec<u8>,
    /// At least one cluster in this sample met the support threshold.
    pub support: bool,
    pub call: GenotypeCall,
    reads: BTreeMap<CompactString, ReadState>,
    clusters: ClusterMap,
}

impl SampleSiteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one live alignment of this sample.
    pub fn load(&mut self, read: &AlignmentRecord, insert: &InsertSizeStats) {
        self.n_reads += 1;
        self.mapqs.push(read.mapq);
        self.clipped_bases += read.clipped_bases();

        for coordinate in read.clip_breakpoints() {
            self.clusters.register(coordinate, &read.name);
        }

        let mut alternate = false;
        if !read.is_mate_mapped {
            self.mate_missing += 1;
            alternate = true;
        } else if read.is_mapped {
            self.mapped_pairs += 1;
            if read.is_same_strand_pair() {
                self.same_strand += 1;
                alternate = true;
            }
            if insert.is_anomalous(read.insert_size) {
                self.n_above_avg_insert += 1;
                alternate = true;
            }
        }

        self.reads.insert(
            read.name.clone(),
            ReadState {
                mapq: read.mapq,
                alternate,
            },
        );
    }

    /// Fold supporting clusters into the read flags and the site-wide tally.
    ///
    /// Call once after every read has been loaded. `site_clusters` maps each
    /// supporting coordinate to the number of reads clipped there, summed over
    /// samples.
    pub fn resolve_clusters(&mut self, site_clusters: &mut BTreeMap<i64, usize>) {
        for (coordinate, names) in self.clusters.supporting() {
            self.support = true;
            *site_clusters.entry(coordinate).or_insert(0) += names.len();
            for name in names {
                if let Some(state) = self.reads.get_mut(name) {
                    state.alternate = true;
                }
            }
        }
    }

    /// Distinct reads as classified for the likelihood model.
    ///
    /// A flagged read only counts as alternate in a supporting sample.
    pub fn observations(&self) -> impl Iterator<Item = ReadObservation> + '_ {
        let support = self.support;
        self.reads.values().map(move |state| ReadObservation {
            mapq: state.mapq,
            alternate: state.alternate && support,
        })
    }

    pub fn genotype(&mut self) -> &GenotypeCall {
        self.call = call_genotype(self.n_reads, self.observations());
        &self.call
    }

    pub fn clusters(&self) -> &ClusterMap {
        &self.clusters
    }

    pub fn distinct_reads(&self) -> usize {
        self.reads.len()
    }
}
