//! Input header checks run before any work is scheduled.

use log::{debug, warn};
use rust_htslib::bam::{self, HeaderView, Read};

use crate::breakpoint::sample::{Sample, SampleCatalog};
use crate::core::error::{Result, WhamError};
use crate::core::retry::RetryPolicy;
use crate::engine::par_granges::intervals::ReferenceCatalog;

/// Value of the `SO` tag on the `@HD` line, if any.
pub fn sort_order(header: &HeaderView) -> Option<String> {
    let text = String::from_utf8_lossy(header.as_bytes());
    text.lines()
        .find(|line| line.starts_with("@HD"))
        .and_then(|line| {
            line.split('\t')
                .find_map(|field| field.strip_prefix("SO:"))
                .map(str::to_string)
        })
}

fn check_sample(sample: &Sample, header: &HeaderView) -> Result<ReferenceCatalog> {
    match sort_order(header) {
        None => return Err(WhamError::UnsortedInput(sample.label())),
        Some(order) if order != "coordinate" => {
            warn!("{} declares sort order '{}'", sample.label(), order);
        }
        Some(_) => {}
    }
    ReferenceCatalog::from_header(header)
}

/// Check every input's header and return the shared reference catalog.
///
/// Each file must declare a sort order, and all files must describe the same
/// reference sequences.
pub fn validate_inputs(samples: &SampleCatalog, retry: &RetryPolicy) -> Result<ReferenceCatalog> {
    let mut shared: Option<(ReferenceCatalog, String)> = None;
    for sample in samples.iter() {
        let reader = retry.run(&sample.path, || bam::Reader::from_path(&sample.path))?;
        let references = check_sample(sample, reader.header())?;
        debug!(
            "{}: {} reference sequences",
            sample.label(),
            references.len()
        );
        match &shared {
            None => shared = Some((references, sample.label())),
            Some((first, first_label)) if !first.matches(&references) => {
                return Err(WhamError::Config(format!(
                    "{} and {} do not share the same reference sequences",
                    first_label,
                    sample.label()
                )));
            }
            Some(_) => {}
        }
    }
    shared
        .map(|(references, _)| references)
        .ok_or_else(|| WhamError::Config("no alignment files given".to_string()))
}
