//! Hand-off of a [`ResultTable`] to downstream consumers (chart renderers,
//! notebooks, dashboards)
//!
//! The table becomes an Arrow `RecordBatch` with this column layout:
//!
//! | column | type | nullable |
//! |---|---|---|
//! | one per parameter | `Int64` | no |
//! | `<value label>` | `Float64` | no |
//! | `samples` | `UInt64` | no |
//! | `ci_lower`, `ci_upper`, `std_dev` | `Float64` | yes (confidence mode only) |
//!
//! The batch can be written as Parquet, or the table as JSON or CSV. The file
//! format is picked from the output path's extension.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;

use crate::table::ResultTable;
use crate::{Error, Result};

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Apache Parquet (Arrow schema above)
    Parquet,
    /// Pretty-printed JSON of the whole table
    Json,
    /// Headered CSV, one row per record
    Csv,
}

impl ExportFormat {
    /// Pick a format from the file extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing or unknown extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("parquet") => Ok(Self::Parquet),
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::InvalidInput(format!(
                "cannot infer output format from '{}' (expected .parquet, .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// Convert the table into an Arrow record batch.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled.
pub fn to_record_batch(table: &ResultTable) -> Result<RecordBatch> {
    let records = table.records();
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for (idx, name) in table.parameter_names().iter().enumerate() {
        fields.push(Field::new(name, DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from_iter_values(
            records.iter().map(|r| r.params()[idx]),
        )));
    }

    fields.push(Field::new(table.value_label(), DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(
        records.iter().map(|r| r.value()),
    )));

    fields.push(Field::new("samples", DataType::UInt64, false));
    columns.push(Arc::new(UInt64Array::from_iter_values(
        records.iter().map(|r| r.summary().samples as u64),
    )));

    if table.has_confidence() {
        let lower: Float64Array = records
            .iter()
            .map(|r| r.summary().confidence.map(|c| c.lower))
            .collect();
        let upper: Float64Array = records
            .iter()
            .map(|r| r.summary().confidence.map(|c| c.upper))
            .collect();
        let std_dev: Float64Array = records.iter().map(|r| r.summary().std_dev).collect();

        for (name, array) in [("ci_lower", lower), ("ci_upper", upper), ("std_dev", std_dev)] {
            fields.push(Field::new(name, DataType::Float64, true));
            columns.push(Arc::new(array));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Write the table as a single-batch Parquet file.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parquet`] if the file cannot be written.
pub fn write_parquet<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write the table (metadata and records) as pretty JSON.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Json`] if the file cannot be written.
pub fn write_json<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(writer, table)?;
    Ok(())
}

/// Write the table as headered CSV, columns as in [`to_record_batch`].
///
/// # Errors
///
/// Returns [`Error::Csv`] if the file cannot be written.
pub fn write_csv<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let with_ci = table.has_confidence();
    let mut wtr = csv::WriterBuilder::new().from_path(path.as_ref())?;

    let mut header: Vec<&str> = table.parameter_names().iter().map(String::as_str).collect();
    header.push(table.value_label());
    header.push("samples");
    if with_ci {
        header.extend(["ci_lower", "ci_upper", "std_dev"]);
    }
    wtr.write_record(&header)?;

    for record in table.records() {
        let summary = record.summary();
        let mut row: Vec<String> = record.params().iter().map(ToString::to_string).collect();
        row.push(summary.mean.to_string());
        row.push(summary.samples.to_string());
        if with_ci {
            let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
            row.push(opt(summary.confidence.map(|c| c.lower)));
            row.push(opt(summary.confidence.map(|c| c.upper)));
            row.push(opt(summary.std_dev));
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `table` to `path` in the format given by its extension.
///
/// # Errors
///
/// See [`ExportFormat::from_path`] and the per-format writers.
pub fn write_table<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<ExportFormat> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Parquet => write_parquet(table, path)?,
        ExportFormat::Json => write_json(table, path)?,
        ExportFormat::Csv => write_csv(table, path)?,
    }
    Ok(format)
}

/// Insert `suffix` between the file stem and extension of `base`.
///
/// `out/plot.csv` with `_pages` becomes `out/plot_pages.csv`.
#[must_use]
pub fn facet_output_path(base: &Path, suffix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    base.with_file_name(file_name)
}
