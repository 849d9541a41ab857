//! Nonparametric statistical tests
//!
//! - Mann-Whitney U test (Wilcoxon rank-sum)

use super::{average_ranks, filter_nan, Alternative, TestResult};
use crate::{StatsError, StatsResult};
use statrs::distribution::{ContinuousCDF, Normal};

/// Options for Mann-Whitney U test
#[derive(Debug, Clone)]
pub struct MannWhitneyOptions {
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Apply continuity correction to the normal approximation
    pub continuity_correction: bool,
}

impl Default for MannWhitneyOptions {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            continuity_correction: true,
        }
    }
}

/// Mann-Whitney U test (Wilcoxon rank-sum test)
///
/// Nonparametric test for comparing two independent samples, using the
/// normal approximation with tie correction. The reported statistic is
/// U for the first group.
pub fn mann_whitney_u(
    group1: &[f64],
    group2: &[f64],
    options: &MannWhitneyOptions,
) -> StatsResult<TestResult> {
    let g1 = filter_nan(group1);
    let g2 = filter_nan(group2);

    if g1.is_empty() || g2.is_empty() {
        return Err(StatsError::InsufficientDataMsg(
            "Mann-Whitney U test requires at least 1 observation per group".into(),
        ));
    }

    let n1 = g1.len();
    let n2 = g2.len();
    let n = n1 + n2;

    let mut combined = Vec::with_capacity(n);
    combined.extend_from_slice(&g1);
    combined.extend_from_slice(&g2);
    let (ranks, tie_term) = average_ranks(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;

    let mean_u = (n1 * n2) as f64 / 2.0;
    let nf = n as f64;
    let var_u =
        (n1 * n2) as f64 / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));

    // All observations tied: the distributions are identical by
    // construction, nothing to reject.
    if var_u <= 0.0 {
        return Ok(TestResult {
            statistic: u1,
            p_value: 1.0,
            df: f64::NAN,
            n,
            n1,
            n2,
            alternative: options.alternative,
            method: "Mann-Whitney U test".into(),
        });
    }

    let sd = var_u.sqrt();
    let cc = if options.continuity_correction { 0.5 } else { 0.0 };
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| StatsError::InvalidInput(e.to_string()))?;

    let p_value = match options.alternative {
        Alternative::TwoSided => {
            let z = ((u1 - mean_u).abs() - cc).max(0.0) / sd;
            (2.0 * (1.0 - normal.cdf(z))).min(1.0)
        }
        Alternative::Greater => {
            let z = (u1 - mean_u - cc) / sd;
            1.0 - normal.cdf(z)
        }
        Alternative::Less => {
            let z = (u1 - mean_u + cc) / sd;
            normal.cdf(z)
        }
    };

    Ok(TestResult {
        statistic: u1,
        p_value,
        df: f64::NAN,
        n,
        n1,
        n2,
        alternative: options.alternative,
        method: "Mann-Whitney U test".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mann_whitney_separated_groups() {
        let g1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let g2 = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0];
        let opts = MannWhitneyOptions::default();
        let result = mann_whitney_u(&g1, &g2, &opts).unwrap();

        assert!(result.p_value < 0.05);
        // Group 1 entirely below group 2: U1 = 0
        assert_eq!(result.statistic, 0.0);
    }

    #[test]
    fn test_mann_whitney_identical_groups_not_significant() {
        // Identical distributions must not produce a false positive.
        let g1 = vec![0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 0.0];
        let g2 = g1.clone();
        let opts = MannWhitneyOptions::default();
        let result = mann_whitney_u(&g1, &g2, &opts).unwrap();

        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_mann_whitney_all_tied() {
        let g1 = vec![0.0; 5];
        let g2 = vec![0.0; 7];
        let opts = MannWhitneyOptions::default();
        let result = mann_whitney_u(&g1, &g2, &opts).unwrap();

        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_mann_whitney_empty_group() {
        let opts = MannWhitneyOptions::default();
        assert!(mann_whitney_u(&[], &[1.0], &opts).is_err());
    }

    #[test]
    fn test_mann_whitney_u_statistic_known_value() {
        // Hand-computed: ranks of g1 in {1,2,3} vs g2 {4,5}: R1 = 6,
        // U1 = 6 - 3*4/2 = 0.
        let g1 = vec![1.0, 2.0, 3.0];
        let g2 = vec![4.0, 5.0];
        let opts = MannWhitneyOptions {
            continuity_correction: false,
            ..Default::default()
        };
        let result = mann_whitney_u(&g1, &g2, &opts).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.n1, 3);
        assert_eq!(result.n2, 2);
    }
}
