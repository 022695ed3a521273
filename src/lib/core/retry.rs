//! Bounded retry with backoff for opening alignment files.
//!
//! Many workers opening the same BAM and index at once can see transient
//! failures on shared filesystems, so opens are retried a fixed number of times
//! before the failure is reported as [`WhamError::ResourceAcquisition`].

use crate::core::error::{Result, WhamError};
use log::debug;
use std::fmt::Display;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Attempts made before an open is treated as fatal.
pub const MAX_OPEN_ATTEMPTS: u32 = 500;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_OPEN_ATTEMPTS,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, used where latency matters more than contention.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Run `open` until it succeeds or the attempt budget is spent.
    pub fn run<T, E, F>(&self, path: &Path, mut open: F) -> Result<T>
    where
        E: Display,
        F: FnMut() -> std::result::Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut last_message = String::new();
        for attempt in 1..=attempts {
            match open() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    last_message = err.to_string();
                    debug!(
                        "Open attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        path.display(),
                        last_message
                    );
                    if attempt < attempts && !backoff.is_zero() {
                        thread::sleep(backoff);
                        backoff = std::cmp::min(backoff * 2, self.max_backoff);
                    }
                }
            }
        }
        Err(WhamError::ResourceAcquisition {
            path: path.display().to_string(),
            attempts,
            message: last_message,
        })
    }
}
