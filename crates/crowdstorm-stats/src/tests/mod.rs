//! Statistical hypothesis testing
//!
//! - Distributional tests (normality)
//! - Nonparametric tests (Mann-Whitney U)
//! - Categorical tests (chi-square independence)
//! - Rank correlation (Spearman)

pub mod categorical;
pub mod nonparametric;

/// Alternative hypothesis for two-sided / one-sided tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

/// Generic test result structure for all statistical tests
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test statistic (U, K², z, etc.)
    pub statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Degrees of freedom (f64::NAN if not applicable)
    pub df: f64,
    /// Total sample size
    pub n: usize,
    /// Group 1 sample size (for two-sample tests)
    pub n1: usize,
    /// Group 2 sample size (for two-sample tests)
    pub n2: usize,
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Test method/name
    pub method: String,
}

/// Chi-square test result
#[derive(Debug, Clone)]
pub struct ChiSquareResult {
    /// Chi-square statistic
    pub statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Degrees of freedom
    pub df: usize,
    /// Method name
    pub method: String,
}

/// Correlation test result
#[derive(Debug, Clone)]
pub struct CorrelationResult {
    /// Correlation coefficient
    pub r: f64,
    /// Test statistic
    pub statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Sample size
    pub n: usize,
    /// Method name
    pub method: String,
}

/// Filter NaN values from a slice
fn filter_nan(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Assign average ranks (1-based), with tied values receiving the mean of
/// the ranks they span. Returns the rank vector and the tie-correction
/// term sum(t^3 - t) over tie groups.
fn average_ranks(data: &[f64]) -> (Vec<f64>, f64) {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; n];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && data[order[j + 1]] == data[order[i]] {
            j += 1;
        }
        // Positions i..=j share the same value
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        let t = (j - i + 1) as f64;
        tie_term += t * t * t - t;
        i = j + 1;
    }

    (ranks, tie_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_ranks_no_ties() {
        let (ranks, tie_term) = average_ranks(&[30.0, 10.0, 20.0]);
        assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
        assert_eq!(tie_term, 0.0);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let (ranks, tie_term) = average_ranks(&[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
        // one tie group of size 2: 2^3 - 2 = 6
        assert_eq!(tie_term, 6.0);
    }

    #[test]
    fn test_average_ranks_all_tied() {
        let (ranks, tie_term) = average_ranks(&[5.0, 5.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 2.0, 2.0]);
        assert_eq!(tie_term, 24.0);
    }
}
