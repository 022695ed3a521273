//! Shorthand re-exports of the helpers the command layer uses most.

pub use crate::core::concurrency::determine_allowed_cpus;
pub use crate::core::errors::is_broken_pipe;
pub use crate::core::fs::{is_bgzipped, make_parent_dirs};
pub use crate::core::io::{get_output, get_writer};
