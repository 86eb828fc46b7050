//! Directory scan → filename decode → per-file statistic → sorted table
//!
//! ## Failure policy
//!
//! A bad file is a hard failure for the whole aggregation by default
//! ([`FilePolicy::Abort`]): no partial table is produced. Callers that want
//! to tolerate stray files in a results directory can opt into
//! [`FilePolicy::SkipMalformedNames`], which skips (and logs) files whose
//! *name* does not match the layout. Files that match the layout but whose
//! *data* is bad always abort.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bench_tables::aggregate::{aggregate, AggregationContext};
//! use bench_tables::layout::TokenLayout;
//!
//! let ctx = AggregationContext::builder("results/mt", 2.4e9)
//!     .layout(TokenLayout::thread_page_sweep())
//!     .build()?;
//! let table = aggregate(&ctx)?;
//! for record in table.records() {
//!     println!("{:?} -> {:.3} ms", record.params(), record.value());
//! }
//! # Ok::<(), bench_tables::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layout::TokenLayout;
use crate::samples::{load_samples, DEFAULT_TIME_COLUMN};
use crate::stats::{summarize, validate_frequency, StatisticMode};
use crate::table::{AggregatedRecord, ResultTable};
use crate::{Error, Result};

/// What to do with a file whose name does not match the token layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilePolicy {
    /// Abort the whole aggregation on the first bad file.
    #[default]
    Abort,
    /// Skip files whose name fails to decode, with a warning.
    SkipMalformedNames,
}

/// Parameters of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAggregationContext")]
pub struct AggregationContext {
    input_dir: PathBuf,
    frequency_hz: f64,
    layout: TokenLayout,
    column: String,
    mode: StatisticMode,
    policy: FilePolicy,
}

#[derive(Deserialize)]
struct RawAggregationContext {
    input_dir: PathBuf,
    frequency_hz: f64,
    layout: TokenLayout,
    column: String,
    mode: StatisticMode,
    policy: FilePolicy,
}

impl TryFrom<RawAggregationContext> for AggregationContext {
    type Error = Error;

    fn try_from(raw: RawAggregationContext) -> Result<Self> {
        AggregationContextBuilder::new(raw.input_dir, raw.frequency_hz)
            .layout(raw.layout)
            .column(raw.column)
            .mode(raw.mode)
            .policy(raw.policy)
            .build()
    }
}

impl AggregationContext {
    /// Create a builder with the required fields.
    ///
    /// Defaults: thread/page layout, `time` column, mean only, abort on
    /// bad files.
    #[must_use]
    pub fn builder(input_dir: impl Into<PathBuf>, frequency_hz: f64) -> AggregationContextBuilder {
        AggregationContextBuilder::new(input_dir, frequency_hz)
    }

    /// Directory holding the benchmark files.
    #[must_use]
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Processor frequency used to rescale into milliseconds.
    #[must_use]
    pub const fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Filename token layout.
    #[must_use]
    pub const fn layout(&self) -> &TokenLayout {
        &self.layout
    }

    /// Name of the sample column.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Statistics computed per file.
    #[must_use]
    pub const fn mode(&self) -> StatisticMode {
        self.mode
    }

    /// Handling of files with undecodable names.
    #[must_use]
    pub const fn policy(&self) -> FilePolicy {
        self.policy
    }
}

/// Builder for `AggregationContext`.
#[derive(Debug)]
pub struct AggregationContextBuilder {
    input_dir: PathBuf,
    frequency_hz: f64,
    layout: TokenLayout,
    column: String,
    mode: StatisticMode,
    policy: FilePolicy,
}

impl AggregationContextBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>, frequency_hz: f64) -> Self {
        Self {
            input_dir: input_dir.into(),
            frequency_hz,
            layout: TokenLayout::thread_page_sweep(),
            column: DEFAULT_TIME_COLUMN.to_string(),
            mode: StatisticMode::Mean,
            policy: FilePolicy::Abort,
        }
    }

    /// Set the filename token layout.
    #[must_use]
    pub fn layout(mut self, layout: TokenLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the sample column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Set the statistic mode.
    #[must_use]
    pub const fn mode(mut self, mode: StatisticMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the malformed-name policy.
    #[must_use]
    pub const fn policy(mut self, policy: FilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the `AggregationContext`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the frequency is not positive and
    /// finite, or the column name is empty.
    pub fn build(self) -> Result<AggregationContext> {
        validate_frequency(self.frequency_hz)?;
        if self.column.trim().is_empty() {
            return Err(Error::InvalidInput("sample column name is empty".to_string()));
        }

        Ok(AggregationContext {
            input_dir: self.input_dir,
            frequency_hz: self.frequency_hz,
            layout: self.layout,
            column: self.column,
            mode: self.mode,
            policy: self.policy,
        })
    }
}

/// Aggregate every regular file directly inside `ctx.input_dir()`.
///
/// Subdirectories and other non-file entries are ignored. Entries are
/// visited in file-name order so the first reported error is stable.
///
/// # Errors
///
/// - [`Error::UnreadableDirectory`] if the directory cannot be listed
/// - [`Error::MalformedFilename`] for an undecodable name (unless skipped by
///   policy)
/// - [`Error::UnreadableFile`] for a missing column, bad value or no rows
/// - [`Error::DegenerateSample`] for a single-sample file in confidence mode
/// - [`Error::EmptyDirectory`] if no record was produced
pub fn aggregate(ctx: &AggregationContext) -> Result<ResultTable> {
    let dir = ctx.input_dir();
    let unreadable = |source| Error::UnreadableDirectory {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .and_then(|listing| listing.collect::<std::io::Result<Vec<_>>>())
        .map_err(unreadable)?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            debug!(path = %path.display(), "ignoring non-file entry");
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let params = match ctx.layout.decode(&name) {
            Ok(params) => params,
            Err(err) if ctx.policy == FilePolicy::SkipMalformedNames => {
                warn!(file = %name, error = %err, "skipping file with undecodable name");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        let samples = load_samples(&path, &ctx.column)?;
        let summary = summarize(&samples, ctx.frequency_hz, ctx.mode).map_err(|e| e.in_file(&name))?;
        debug!(
            file = %name,
            params = ?params,
            samples = summary.samples,
            mean_ms = summary.mean,
            "aggregated benchmark file"
        );

        records.push(AggregatedRecord::new(name, params, summary));
    }

    if records.is_empty() {
        return Err(Error::EmptyDirectory {
            path: dir.to_path_buf(),
        });
    }

    let names = ctx.layout.names().map(str::to_string).collect();
    let table = ResultTable::new(names, records)?;
    info!(
        dir = %dir.display(),
        records = table.len(),
        skipped,
        layout = %ctx.layout,
        "built result table"
    );
    Ok(table)
}

/// Aggregate `dir` with `layout`, mean only, aborting on any bad file.
///
/// # Errors
///
/// See [`aggregate`]; also [`Error::InvalidInput`] for a bad frequency.
pub fn aggregate_directory<P: AsRef<Path>>(
    dir: P,
    frequency_hz: f64,
    layout: TokenLayout,
) -> Result<ResultTable> {
    let ctx = AggregationContext::builder(dir.as_ref(), frequency_hz)
        .layout(layout)
        .build()?;
    aggregate(&ctx)
}
