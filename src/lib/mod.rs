//! WHAM: clipped-read breakpoint scanning
//!
//! Finds reference coordinates where several independent reads end in a
//! soft/hard clip, genotypes every sample there, and contrasts a target cohort
//! against a background cohort with a likelihood-ratio test.
//!
//! # Modules
//!
//! - [`core`]: errors, IO helpers, thread-pool sizing, read filtering and retries
//! - [`engine`]: alignment records, the sliding-window pileup, the chunk scan loop
//!   and the parallel region scheduler
//! - [`breakpoint`]: insert-size profiling, evidence clustering, genotype
//!   likelihoods, the cohort test and output formatting
//! - [`pipeline`]: header validation and the region processor run by the scheduler
//! - [`utils`]: shorthand re-exports of common helpers

pub mod breakpoint;
pub mod core;
pub mod engine;
pub mod pipeline;
pub mod utils;
