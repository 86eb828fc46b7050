//! Per-file statistics: mean, 95% Student-t interval, standard deviation
//!
//! Raw measurements are cycle/tick counts. Every reported figure is rescaled
//! into milliseconds with the processor frequency:
//!
//! ```text
//! ms = value / frequency_hz * 1000
//! ```
//!
//! The interval is the two-sided `mean ± t(0.975, n-1) · s / √n`, with `s`
//! the sample standard deviation (n−1 denominator).

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::samples::SampleSeries;
use crate::{Error, Result};

/// Confidence level of the reported interval
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Which statistics to compute per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatisticMode {
    /// Mean only
    #[default]
    Mean,
    /// Mean plus 95% confidence interval and standard deviation
    MeanWithConfidence,
}

/// Two-sided confidence bounds around the mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Distance from the mean to either bound.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

/// Representative statistic of one sample series, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Rescaled mean
    pub mean: f64,
    /// Number of samples the statistic was computed from
    pub samples: usize,
    /// Rescaled 95% interval (confidence mode only)
    pub confidence: Option<ConfidenceInterval>,
    /// Rescaled sample standard deviation (confidence mode only)
    pub std_dev: Option<f64>,
}

/// Summarize `samples` into milliseconds using `frequency_hz`.
///
/// # Errors
///
/// - [`Error::InvalidInput`] if `frequency_hz` is not finite and positive,
///   or a statistic overflows `f64`
/// - [`Error::DegenerateSample`] if confidence output is requested on a
///   single-sample series (zero degrees of freedom)
#[allow(clippy::cast_precision_loss)]
pub fn summarize(samples: &SampleSeries, frequency_hz: f64, mode: StatisticMode) -> Result<Summary> {
    validate_frequency(frequency_hz)?;

    let to_ms = |v: f64| v / frequency_hz * 1000.0;
    let n = samples.len();
    let mean = samples.mean();

    let (confidence, std_dev) = match mode {
        StatisticMode::Mean => (None, None),
        StatisticMode::MeanWithConfidence => {
            if n < 2 {
                return Err(Error::DegenerateSample {
                    file: String::new(),
                    samples: n,
                });
            }
            let s = sample_std_dev(samples.values(), mean);
            let sem = s / (n as f64).sqrt();
            let t = t_critical_value(CONFIDENCE_LEVEL, (n - 1) as f64)?;
            let interval = ConfidenceInterval {
                lower: to_ms(t.mul_add(-sem, mean)),
                upper: to_ms(t.mul_add(sem, mean)),
            };
            (Some(interval), Some(to_ms(s)))
        }
    };

    let summary = Summary {
        mean: to_ms(mean),
        samples: n,
        confidence,
        std_dev,
    };
    ensure_finite(&summary)?;
    Ok(summary)
}

/// Reject frequencies that would produce NaN or infinite statistics.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] unless `frequency_hz` is finite and > 0.
pub fn validate_frequency(frequency_hz: f64) -> Result<()> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "frequency must be a positive number of Hz, got {frequency_hz}"
        )))
    }
}

#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Two-sided critical value of Student's t distribution: the
/// `0.5 + level / 2` quantile with `df` degrees of freedom.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `df` is not positive.
pub fn t_critical_value(level: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
        Error::InvalidInput(format!("Student-t with {df} degrees of freedom: {e}"))
    })?;
    Ok(dist.inverse_cdf(0.5 + level / 2.0))
}

fn ensure_finite(summary: &Summary) -> Result<()> {
    let bounds = summary.confidence.map(|c| [c.lower, c.upper]);
    let all_finite = summary.mean.is_finite()
        && summary.std_dev.map_or(true, f64::is_finite)
        && bounds.map_or(true, |b| b.iter().all(|v| v.is_finite()));
    if all_finite {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "statistics over {} sample(s) overflow f64",
            summary.samples
        )))
    }
}
