//! Result table - one aggregated record per benchmark file
//!
//! ## Ordering
//!
//! Records are always sorted ascending by their parameter tuple
//! (lexicographic: first parameter primary, second secondary, ...). Every
//! transform below returns a table that keeps this order. Ties on the full
//! tuple fall back to the source file name so the order is deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::Summary;
use crate::{Error, Result};

/// Default label of the statistic column
pub const DEFAULT_VALUE_LABEL: &str = "time";

/// Decoded parameters of one benchmark file plus its summary statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    file: String,
    params: Vec<i64>,
    summary: Summary,
}

impl AggregatedRecord {
    /// Create a record for `file`.
    #[must_use]
    pub fn new(file: impl Into<String>, params: Vec<i64>, summary: Summary) -> Self {
        Self {
            file: file.into(),
            params,
            summary,
        }
    }

    /// Source file name.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Decoded parameters, in layout order.
    #[must_use]
    pub fn params(&self) -> &[i64] {
        &self.params
    }

    /// Statistic computed from the file's samples.
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Rescaled mean (milliseconds).
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.summary.mean
    }
}

/// Sorted table of aggregated records.
///
/// Deserializing goes through [`ResultTable::new`], so a loaded table is
/// checked and sorted like a freshly built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResultTable")]
pub struct ResultTable {
    parameter_names: Vec<String>,
    value_label: String,
    built_at: DateTime<Utc>,
    records: Vec<AggregatedRecord>,
}

#[derive(Deserialize)]
struct RawResultTable {
    parameter_names: Vec<String>,
    value_label: String,
    built_at: DateTime<Utc>,
    records: Vec<AggregatedRecord>,
}

impl TryFrom<RawResultTable> for ResultTable {
    type Error = Error;

    fn try_from(raw: RawResultTable) -> Result<Self> {
        let mut table = Self::new(raw.parameter_names, raw.records)?;
        table.value_label = raw.value_label;
        table.built_at = raw.built_at;
        Ok(table)
    }
}

impl ResultTable {
    /// Build a table; records are sorted by parameter tuple.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a record's parameter count does not
    /// match `parameter_names`.
    pub fn new(parameter_names: Vec<String>, records: Vec<AggregatedRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.params.len() != parameter_names.len()) {
            return Err(Error::InvalidInput(format!(
                "record for '{}' has {} parameter(s), table has {}",
                bad.file,
                bad.params.len(),
                parameter_names.len()
            )));
        }

        let mut table = Self {
            parameter_names,
            value_label: DEFAULT_VALUE_LABEL.to_string(),
            built_at: Utc::now(),
            records,
        };
        table.sort();
        Ok(table)
    }

    fn sort(&mut self) {
        self.records
            .sort_by(|a, b| a.params.cmp(&b.params).then_with(|| a.file.cmp(&b.file)));
    }

    /// Parameter column names, in sort priority.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Label of the statistic column.
    #[must_use]
    pub fn value_label(&self) -> &str {
        &self.value_label
    }

    /// When the table was built.
    #[must_use]
    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Records in ascending parameter order.
    #[must_use]
    pub fn records(&self) -> &[AggregatedRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if any record carries a confidence interval.
    #[must_use]
    pub fn has_confidence(&self) -> bool {
        self.records.iter().any(|r| r.summary.confidence.is_some())
    }

    /// Values of parameter column `name`, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<i64>> {
        let idx = self.parameter_index(name).ok()?;
        Some(self.records.iter().map(|r| r.params[idx]).collect())
    }

    /// Statistic values, in row order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(AggregatedRecord::value).collect()
    }

    /// Rename the statistic column (e.g. to a chart axis label).
    #[must_use]
    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = label.into();
        self
    }

    /// Add `delta` to parameter `name` in every record.
    ///
    /// Used to turn zero-based thread indices into thread counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the table has no such parameter or
    /// a shifted value overflows.
    pub fn offset_parameter(mut self, name: &str, delta: i64) -> Result<Self> {
        let idx = self.parameter_index(name)?;
        for record in &mut self.records {
            record.params[idx] = record.params[idx].checked_add(delta).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "offsetting '{name}' by {delta} overflows in '{}'",
                    record.file
                ))
            })?;
        }
        self.sort();
        Ok(self)
    }

    /// Keep records whose parameter `name` satisfies `keep`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the table has no such parameter.
    pub fn retain<F>(mut self, name: &str, mut keep: F) -> Result<Self>
    where
        F: FnMut(i64) -> bool,
    {
        let idx = self.parameter_index(name)?;
        self.records.retain(|r| keep(r.params[idx]));
        Ok(self)
    }

    /// Keep records whose parameter `name` is a power of two (1, 2, 4, ...),
    /// optionally no larger than `max`.
    ///
    /// `retain_powers_of_two("threads", Some(16))` keeps 1, 2, 4, 8 and 16.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the table has no such parameter.
    pub fn retain_powers_of_two(self, name: &str, max: Option<i64>) -> Result<Self> {
        self.retain(name, |v| {
            v > 0 && (v & (v - 1)) == 0 && max.map_or(true, |max| v <= max)
        })
    }

    /// Split into one sub-table per distinct value of parameter `name`.
    ///
    /// This is the per-panel split of a faceted chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the table has no such parameter.
    pub fn facets(&self, name: &str) -> Result<BTreeMap<i64, Self>> {
        let idx = self.parameter_index(name)?;
        let mut groups: BTreeMap<i64, Vec<AggregatedRecord>> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry(record.params[idx])
                .or_default()
                .push(record.clone());
        }

        Ok(groups
            .into_iter()
            .map(|(key, records)| {
                let facet = Self {
                    parameter_names: self.parameter_names.clone(),
                    value_label: self.value_label.clone(),
                    built_at: self.built_at,
                    records,
                };
                (key, facet)
            })
            .collect())
    }

    fn parameter_index(&self, name: &str) -> Result<usize> {
        self.parameter_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "no parameter '{name}' in table (have: {})",
                    self.parameter_names.join(", ")
                ))
            })
    }
}
