mod args;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use wham_lib::breakpoint::{profile_samples, vcf, SampleCatalog, ScanContext};
use wham_lib::core::read_filter::DefaultReadFilter;
use wham_lib::core::retry::RetryPolicy;
use wham_lib::engine::{par_granges, ParGranges};
use wham_lib::pipeline::{validate_inputs, BreakpointProcessor};
use wham_lib::utils;

use crate::commands::common;

pub use args::{ScoreArgs, ScoreConfig};

/// Execute the `score` command end-to-end.
pub fn run_score(args: ScoreArgs) -> Result<()> {
    let config: ScoreConfig = args.into();
    let threads = utils::determine_allowed_cpus(config.threads)?;
    let retry = RetryPolicy::default();

    let samples = SampleCatalog::new(&config.target, &config.background)?;
    info!(
        "Scoring {} target and {} background files",
        config.target.len(),
        config.background.len()
    );
    let references = validate_inputs(&samples, &retry)?;
    let chunks = common::select_chunks(
        &references,
        config.region.as_ref(),
        config.bed.as_deref(),
        config.merge_regions,
        config.chunksize,
    )?;

    let insert_stats = profile_samples(&samples, &retry)?;

    if let Some(path) = &config.output {
        utils::make_parent_dirs(path)?;
    }
    let mut out = utils::get_output(
        &config.output,
        common::wants_bgzip(config.output.as_deref()),
        threads,
        6,
    )?;
    vcf::write_header(&mut out, &samples)?;

    let context = Arc::new(ScanContext::new(samples, insert_stats)?);
    let processor = BreakpointProcessor::new(
        context,
        Arc::new(references),
        DefaultReadFilter::new(config.min_mapq),
        retry,
    );

    let handle = ParGranges::new(
        chunks,
        Some(threads),
        Some(par_granges::CHANNEL_SIZE_MODIFIER),
        processor,
    )?
    .process()?;
    for batch in handle.receiver().iter() {
        out.write_all(batch.as_bytes())?;
    }
    let summary = handle.join()?;
    out.flush()?;

    if summary.chunks_failed > 0 {
        warn!(
            "{} of {} chunks failed and were skipped",
            summary.chunks_failed, summary.chunks_total
        );
    }
    info!("WHAM finished normally");
    Ok(())
}
