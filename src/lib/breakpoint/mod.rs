//! Breakpoint evidence, genotyping and the cohort test.

pub mod cohort;
pub mod evidence;
pub mod genotype;
pub mod insert_size;
pub mod sample;
pub mod site;
pub mod vcf;

pub use cohort::{AlleleCounts, CohortTest};
pub use evidence::{ClusterMap, SampleSiteRecord};
pub use genotype::{call_genotype, Genotype, GenotypeCall, ReadObservation};
pub use insert_size::{estimate, estimate_from_bam, profile_samples, InsertSizeStats};
pub use sample::{Cohort, Sample, SampleCatalog};
pub use site::{score_site, ScanContext, SiteCall};
