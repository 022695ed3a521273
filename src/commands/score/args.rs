use std::path::PathBuf;

use structopt::StructOpt;
use wham_lib::engine::par_granges::{self, RegionSpec};

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "score")]
pub struct ScoreArgs {
    /// Target alignment files, sorted and indexed (comma separated or repeated).
    #[structopt(long, short = "t", required = true, use_delimiter = true, parse(from_os_str))]
    pub target: Vec<PathBuf>,

    /// Background alignment files, sorted and indexed (comma separated or repeated).
    #[structopt(long, short = "b", use_delimiter = true, parse(from_os_str))]
    pub background: Vec<PathBuf>,

    /// Scan a single region, `seqid:start-end` (0-based, half-open).
    #[structopt(long, short = "r", conflicts_with = "bed")]
    pub region: Option<RegionSpec>,

    /// Scan the intervals of a BED file instead of the whole genome.
    #[structopt(long, short = "e", parse(from_os_str))]
    pub bed: Option<PathBuf>,

    /// Merge overlapping BED intervals so no site is reported twice.
    #[structopt(long = "merge-regions")]
    pub merge_regions: bool,

    /// Number of worker threads (default: all CPUs).
    #[structopt(long, short = "x")]
    pub threads: Option<usize>,

    /// Bases per scheduled chunk.
    #[structopt(long, short = "c", default_value = par_granges::CHUNKSIZE_STR.as_str())]
    pub chunksize: u32,

    /// Minimum mapping quality for a read to enter the pileup.
    #[structopt(long = "min-mapq", short = "q", default_value = "1")]
    pub min_mapq: u8,

    /// Output path (default: stdout). A `.gz` suffix writes BGZF.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,
}

/// Normalised configuration derived from [`ScoreArgs`].
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub target: Vec<PathBuf>,
    pub background: Vec<PathBuf>,
    pub region: Option<RegionSpec>,
    pub bed: Option<PathBuf>,
    pub merge_regions: bool,
    pub threads: usize,
    pub chunksize: u32,
    pub min_mapq: u8,
    pub output: Option<PathBuf>,
}

impl From<ScoreArgs> for ScoreConfig {
    fn from(args: ScoreArgs) -> ScoreConfig {
        ScoreConfig {
            target: args.target,
            background: args.background,
            region: args.region,
            bed: args.bed,
            merge_regions: args.merge_regions,
            threads: args.threads.unwrap_or_else(num_cpus::get),
            chunksize: args.chunksize,
            min_mapq: args.min_mapq,
            output: args.output,
        }
    }
}
