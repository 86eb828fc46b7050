//! Error types for bench-tables
//!
//! Every variant names the offending file (or directory) and the reason, so a
//! batch run can abort with a message the user can act on.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bench-tables error types
#[derive(Error, Debug)]
pub enum Error {
    /// Filename does not decode to the expected integer tuple
    #[error("Malformed filename '{file}': {reason}")]
    MalformedFilename {
        /// File name as found in the directory
        file: String,
        /// Which token was missing or non-numeric
        reason: String,
    },

    /// Data file missing, empty, or without the expected column
    #[error("Unreadable file {}: {reason}", .path.display())]
    UnreadableFile {
        /// Path of the data file
        path: PathBuf,
        /// What went wrong while reading it
        reason: String,
    },

    /// A statistic that needs at least two samples was requested on fewer
    #[error("Degenerate sample in '{file}': {samples} sample(s), confidence interval needs at least 2")]
    DegenerateSample {
        /// File the series came from (empty for a bare series)
        file: String,
        /// Number of samples available
        samples: usize,
    },

    /// Input directory missing or not listable
    #[error("Unreadable directory {}: {source}", .path.display())]
    UnreadableDirectory {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// No eligible benchmark files were found
    #[error("No benchmark files found in {}", .path.display())]
    EmptyDirectory {
        /// Directory that was scanned
        path: PathBuf,
    },

    /// Invalid configuration or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Attach a file name to an error raised on a bare series.
    #[must_use]
    pub fn in_file(self, name: &str) -> Self {
        match self {
            Self::DegenerateSample { samples, .. } => Self::DegenerateSample {
                file: name.to_string(),
                samples,
            },
            Self::InvalidInput(reason) => Self::InvalidInput(format!("'{name}': {reason}")),
            other => other,
        }
    }
}
