//! Categorical tests
//!
//! - Chi-square test of independence on an R x C contingency table

use super::ChiSquareResult;
use crate::{StatsError, StatsResult};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Options for chi-square test
#[derive(Debug, Clone)]
pub struct ChiSquareOptions {
    /// Apply Yates' continuity correction (2x2 tables only)
    pub correction: bool,
}

impl Default for ChiSquareOptions {
    fn default() -> Self {
        Self { correction: true }
    }
}

/// Chi-square test for independence
///
/// Tests whether two categorical variables are independent.
///
/// # Arguments
/// * `table` - Contingency table (rows x columns of counts)
/// * `options` - Test options
pub fn chisq_test(
    table: &[Vec<usize>],
    options: &ChiSquareOptions,
) -> StatsResult<ChiSquareResult> {
    if table.is_empty() {
        return Err(StatsError::InvalidInput("Empty contingency table".into()));
    }

    let n_rows = table.len();
    let n_cols = table[0].len();
    for (i, row) in table.iter().enumerate() {
        if row.len() != n_cols {
            return Err(StatsError::DimensionMismatchMsg(format!(
                "Row {} has different number of columns",
                i
            )));
        }
    }

    if n_rows < 2 || n_cols < 2 {
        return Err(StatsError::InsufficientDataMsg(
            "Chi-square test requires at least a 2x2 table".into(),
        ));
    }

    let row_totals: Vec<f64> = table
        .iter()
        .map(|row| row.iter().map(|&c| c as f64).sum())
        .collect();
    let col_totals: Vec<f64> = (0..n_cols)
        .map(|j| table.iter().map(|row| row[j] as f64).sum())
        .collect();
    let total: f64 = row_totals.iter().sum();

    if row_totals.iter().any(|&t| t == 0.0) || col_totals.iter().any(|&t| t == 0.0) {
        return Err(StatsError::InsufficientDataMsg(
            "Contingency table has an empty row or column".into(),
        ));
    }

    let yates = options.correction && n_rows == 2 && n_cols == 2;

    let mut statistic = 0.0;
    for i in 0..n_rows {
        for j in 0..n_cols {
            let observed = table[i][j] as f64;
            let expected = row_totals[i] * col_totals[j] / total;
            let mut diff = (observed - expected).abs();
            if yates {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff * diff / expected;
        }
    }

    let df = (n_rows - 1) * (n_cols - 1);
    let dist = ChiSquared::new(df as f64)
        .map_err(|e| StatsError::InvalidInput(e.to_string()))?;
    let p_value = 1.0 - dist.cdf(statistic);

    Ok(ChiSquareResult {
        statistic,
        p_value,
        df,
        method: "Chi-square test for independence".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chisq_independent_table() {
        // Perfectly proportional rows: statistic 0, p = 1
        let table = vec![vec![10, 20], vec![20, 40]];
        let opts = ChiSquareOptions { correction: false };
        let result = chisq_test(&table, &opts).unwrap();

        assert!(result.statistic.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert_eq!(result.df, 1);
    }

    #[test]
    fn test_chisq_known_value() {
        // Classic example: chi2 = 240*(50*30-20*140)^2/(70*170*190*50)
        let table = vec![vec![50, 20], vec![140, 30]];
        let opts = ChiSquareOptions { correction: false };
        let result = chisq_test(&table, &opts).unwrap();

        let expected = 240.0 * (50.0 * 30.0 - 20.0 * 140.0_f64).powi(2)
            / (70.0 * 170.0 * 190.0 * 50.0);
        assert!((result.statistic - expected).abs() < 1e-9);
        assert!(result.p_value > 0.0 && result.p_value < 1.0);
    }

    #[test]
    fn test_chisq_yates_shrinks_statistic() {
        let table = vec![vec![12, 5], vec![7, 14]];
        let uncorrected = chisq_test(&table, &ChiSquareOptions { correction: false }).unwrap();
        let corrected = chisq_test(&table, &ChiSquareOptions { correction: true }).unwrap();

        assert!(corrected.statistic < uncorrected.statistic);
        assert!(corrected.p_value > uncorrected.p_value);
    }

    #[test]
    fn test_chisq_strong_association() {
        let table = vec![vec![100, 5], vec![3, 90]];
        let result = chisq_test(&table, &ChiSquareOptions::default()).unwrap();
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_chisq_empty_column_rejected() {
        let table = vec![vec![10, 0], vec![20, 0]];
        assert!(chisq_test(&table, &ChiSquareOptions::default()).is_err());
    }

    #[test]
    fn test_chisq_ragged_table_rejected() {
        let table = vec![vec![1, 2], vec![3]];
        assert!(chisq_test(&table, &ChiSquareOptions::default()).is_err());
    }
}
