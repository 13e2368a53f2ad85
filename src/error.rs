//! Error types for the crate's I/O boundaries.
//!
//! The simulation itself never fails; only loading tuning data and touching
//! the best-score store can.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading or parsing a [`crate::Config`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while reading or writing the best score
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("best score file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
