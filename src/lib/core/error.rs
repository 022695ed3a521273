//! Error types for the WHAM library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("htslib error: {0}")]
    Hts(#[from] rust_htslib::errors::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid region '{region}': {reason}")]
    InvalidRegion { region: String, reason: String },

    #[error("Unsorted input: {0} has no @HD SO: tag in its header")]
    UnsortedInput(String),

    #[error("Unable to open {path} or its index after {attempts} attempts: {message}")]
    ResourceAcquisition {
        path: String,
        attempts: u32,
        message: String,
    },

    #[error("Region {region} failed: {message}")]
    Chunk { region: String, message: String },

    #[error("Scoring invariant violated: {0}")]
    Scoring(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl WhamError {
    /// Per-chunk failures only cost that chunk's output; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WhamError::Chunk { .. })
    }

    pub fn chunk<S: Into<String>, M: ToString>(region: S, message: M) -> Self {
        WhamError::Chunk {
            region: region.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WhamError>;
