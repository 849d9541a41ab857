//! Descriptive statistics
//!
//! Scalar summaries over a single column of data. NaN values are filtered
//! before computation, matching the cleaning behavior of the pipeline.

use crate::errors::{StatsError, StatsResult};

/// Scalar summary of one variable
#[derive(Debug, Clone)]
pub struct Summary {
    /// Number of non-NaN observations
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Sample variance (n - 1 denominator)
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

/// Summarize a column of data
///
/// # Arguments
/// * `data` - Observations; NaN entries are skipped
pub fn summarize(data: &[f64]) -> StatsResult<Summary> {
    let mut clean: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
    let n = clean.len();

    if n == 0 {
        return Err(StatsError::EmptyInput { field: "data" });
    }

    let sum: f64 = clean.iter().sum();
    let mean = sum / n as f64;

    let variance = if n > 1 {
        clean.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    clean.sort_by(|a, b| a.total_cmp(b));
    let median = if n % 2 == 1 {
        clean[n / 2]
    } else {
        (clean[n / 2 - 1] + clean[n / 2]) / 2.0
    };

    Ok(Summary {
        n,
        mean,
        median,
        std_dev: variance.sqrt(),
        variance,
        min: clean[0],
        max: clean[n - 1],
        sum,
    })
}

/// Ratio of two sums, e.g. red cards per game within a group.
///
/// A zero denominator propagates NaN rather than raising: an empty group
/// produces a NaN rate that flows into the printed report, and the run
/// continues.
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Share of observations strictly greater than zero
pub fn share_positive(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().filter(|&&x| x > 0.0).count() as f64 / data.len() as f64
}
