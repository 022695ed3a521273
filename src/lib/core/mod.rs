//! Shared plumbing: errors, IO, thread counts, read filtering, retries.

pub mod concurrency;
pub mod error;
pub mod errors;
pub mod fs;
pub mod io;
pub mod read_filter;
pub mod retry;
