//! Per-run sample series read from one benchmark CSV file
//!
//! Each benchmark file has a header row and one row per experiment run. The
//! loader keeps a single numeric column (by default `time`) in file order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column holding elapsed time in the harness output
pub const DEFAULT_TIME_COLUMN: &str = "time";

/// Ordered, non-empty sequence of per-run measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    values: Vec<f64>,
}

impl SampleSeries {
    /// Wrap already-loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `values` is empty or holds a
    /// non-finite number.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidInput("sample series is empty".to_string()));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "sample series contains non-finite value {v}"
            )));
        }
        Ok(Self { values })
    }

    /// Measurements in file order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true for a constructed series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean (unscaled), accumulated as a running mean so large
    /// cycle counts do not overflow an intermediate sum.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.values
            .iter()
            .enumerate()
            .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64)
    }
}

/// Read column `column` of the CSV file at `path`.
///
/// # Errors
///
/// Returns [`Error::UnreadableFile`] if the file cannot be opened, has no
/// such column, contains a non-numeric value in that column, or has no data
/// rows.
pub fn load_samples<P: AsRef<Path>>(path: P, column: &str) -> Result<SampleSeries> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| unreadable(path, format!("failed to open: {e}")))?;
    read_samples(file, column, path)
}

/// Read column `column` from any CSV source; `path` is used for error messages.
pub(crate) fn read_samples<R: Read>(reader: R, column: &str, path: &Path) -> Result<SampleSeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| unreadable(path, format!("failed to read header: {e}")))?;
    let col_idx = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| unreadable(path, format!("no '{column}' column in header")))?;

    let mut values = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| unreadable(path, format!("row {}: {e}", row_idx + 1)))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = record.get(col_idx).unwrap_or_default();
        let value = field.parse::<f64>().map_err(|_| {
            unreadable(
                path,
                format!("row {}: '{column}' value '{field}' is not a number", row_idx + 1),
            )
        })?;
        if !value.is_finite() {
            return Err(unreadable(
                path,
                format!("row {}: '{column}' value '{field}' is not finite", row_idx + 1),
            ));
        }
        values.push(value);
    }

    if values.is_empty() {
        return Err(unreadable(path, format!("no rows in '{column}' column")));
    }

    Ok(SampleSeries { values })
}

fn unreadable(path: &Path, reason: String) -> Error {
    Error::UnreadableFile {
        path: path.to_path_buf(),
        reason,
    }
}
