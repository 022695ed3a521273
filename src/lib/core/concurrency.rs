use crate::core::error::{Result, WhamError};
use log::warn;

/// Validate and normalize a requested CPU count.
pub fn determine_allowed_cpus(desired: usize) -> Result<usize> {
    if desired == 0 {
        Err(WhamError::Config("Too few threads selected. Min 1".to_string()))
    } else if desired > num_cpus::get() {
        warn!(
            "Specified more threads ({}) than are available ({}), proceeding anyway",
            desired,
            num_cpus::get()
        );
        Ok(desired)
    } else {
        Ok(desired)
    }
}
