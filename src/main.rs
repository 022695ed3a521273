//! WHAM - clipped-read breakpoint scanner
//!
//! Scans sorted, indexed alignment files for coordinates where several reads
//! end in a soft/hard clip, genotypes every sample at those coordinates and
//! reports a likelihood-ratio statistic contrasting a target cohort with a
//! background cohort.
//!
//! # Tools
//!
//! - `score`: scan for breakpoints and write VCF-like calls
//! - `profile`: report per-sample insert-size statistics only
//!
//! # Usage
//!
//! ```bash
//! # Whole genome, two targets against one background
//! wham score -t tumor1.bam,tumor2.bam -b normal.bam > calls.txt
//!
//! # One region, eight threads, compressed output
//! wham score -t tumor.bam -r chr1:1000000-2000000 -x 8 -o calls.txt.gz
//!
//! # Insert-size profile only
//! wham profile -t tumor.bam -b normal.bam -o inserts.tsv
//! ```

extern crate wham_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;
use wham_lib::utils;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Structural-variant breakpoint scanning from clipped reads
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Scan alignments for clipped-read breakpoints and score them
    Score(commands::ScoreArgs),
    /// Estimate per-sample insert-size statistics
    Profile(commands::ProfileArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Score(args) => commands::run_score(args)?,
            Subcommand::Profile(args) => commands::run_profile(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
