pub mod header;
pub mod region_processor;

#[cfg(test)]
pub(crate) mod test_support;

pub use header::{sort_order, validate_inputs};
pub use region_processor::{BreakpointProcessor, OUTPUT_FLUSH_BYTES};
