mod args;

use anyhow::Result;
use log::info;
use serde::Serialize;
use wham_lib::breakpoint::{profile_samples, Cohort, InsertSizeStats, Sample, SampleCatalog};
use wham_lib::core::retry::RetryPolicy;
use wham_lib::utils;

use crate::commands::common;

pub use args::{ProfileArgs, ProfileConfig};

/// One output row per sample.
#[derive(Debug, Serialize)]
struct ProfileRow {
    sample: String,
    cohort: Cohort,
    mean: f64,
    stddev: f64,
    lower_quartile: f64,
    upper_quartile: f64,
    pairs: usize,
    clipped_fraction: f64,
    usable: bool,
}

impl ProfileRow {
    fn new(sample: &Sample, stats: &InsertSizeStats) -> Self {
        ProfileRow {
            sample: sample.label(),
            cohort: sample.cohort,
            mean: stats.mean,
            stddev: stats.stddev,
            lower_quartile: stats.lower_quartile,
            upper_quartile: stats.upper_quartile,
            pairs: stats.pairs,
            clipped_fraction: stats.clipped_fraction,
            usable: stats.is_usable(),
        }
    }
}

/// Execute the `profile` command: insert-size statistics only.
pub fn run_profile(args: ProfileArgs) -> Result<()> {
    let config: ProfileConfig = args.into();
    let threads = utils::determine_allowed_cpus(config.threads)?;
    let samples = SampleCatalog::new(&config.target, &config.background)?;
    let stats = profile_samples(&samples, &RetryPolicy::default())?;

    if let Some(path) = &config.output {
        utils::make_parent_dirs(path)?;
    }
    let mut writer = utils::get_writer(
        &config.output,
        common::wants_bgzip(config.output.as_deref()),
        true,
        threads,
        6,
    )?;
    for (sample, stats) in samples.iter().zip(stats.iter()) {
        writer.serialize(ProfileRow::new(sample, stats))?;
    }
    writer.flush()?;
    info!("Profiled {} files", samples.len());
    Ok(())
}
