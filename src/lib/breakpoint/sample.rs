//! Samples taking part in a run and the cohort each belongs to.

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::core::error::{Result, WhamError};
use crate::engine::alignment::SampleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Target,
    Background,
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::Target => write!(f, "target"),
            Cohort::Background => write!(f, "background"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: SampleId,
    pub path: PathBuf,
    pub cohort: Cohort,
}

impl Sample {
    /// Column name used in the output header.
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }
}

/// Ordered set of samples: every target first, then every background.
///
/// A sample's [`SampleId`] is its index here, and output columns follow the
/// same order.
#[derive(Debug, Clone, Default)]
pub struct SampleCatalog {
    samples: Vec<Sample>,
}

impl SampleCatalog {
    pub fn new<P: AsRef<Path>>(target: &[P], background: &[P]) -> Result<Self> {
        if target.is_empty() {
            return Err(WhamError::Config(
                "at least one target alignment file is required".to_string(),
            ));
        }

        let mut seen = FxHashSet::default();
        let mut samples = Vec::with_capacity(target.len() + background.len());
        let tagged = target
            .iter()
            .map(|p| (p, Cohort::Target))
            .chain(background.iter().map(|p| (p, Cohort::Background)));
        for (path, cohort) in tagged {
            let path = path.as_ref().to_path_buf();
            if !seen.insert(path.clone()) {
                return Err(WhamError::Config(format!(
                    "{} was given more than once",
                    path.display()
                )));
            }
            samples.push(Sample {
                id: samples.len(),
                path,
                cohort,
            });
        }
        Ok(Self { samples })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn get(&self, id: SampleId) -> Option<&Sample> {
        self.samples.get(id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cohort_size(&self, cohort: Cohort) -> usize {
        self.samples.iter().filter(|s| s.cohort == cohort).count()
    }
}
