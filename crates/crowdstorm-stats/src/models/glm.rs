//! Generalized Linear Models - Poisson and Negative Binomial count regression
//!
//! Both families use the log link and are fit by iteratively reweighted
//! least squares (IRLS) on faer matrices. A fit that fails to converge
//! within the iteration budget is not an error: the result carries
//! `converged = false` along with the last iterate's coefficients, and the
//! caller decides how loudly to warn.

use crate::errors::{StatsError, StatsResult};
use crate::types::{GlmFitResult, GlmInferenceResult, NegBinomialOptions, PoissonOptions};
use faer::prelude::*;
use faer::Mat;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::gamma::ln_gamma;

/// Bound on the linear predictor, keeping exp(eta) finite
const ETA_BOUND: f64 = 30.0;
/// Floor on fitted means, keeping IRLS weights positive
const MU_FLOOR: f64 = 1e-10;

/// Combined GLM result with optional inference
#[derive(Debug, Clone)]
pub struct GlmResult {
    pub core: GlmFitResult,
    pub inference: Option<GlmInferenceResult>,
}

#[derive(Debug, Clone, Copy)]
enum Family {
    Poisson,
    NegBinomial { alpha: f64 },
}

impl Family {
    fn irls_weight(&self, mu: f64) -> f64 {
        match self {
            Family::Poisson => mu,
            Family::NegBinomial { alpha } => mu / (1.0 + alpha * mu),
        }
    }

    fn deviance(&self, y: &[f64], mu: &[f64]) -> f64 {
        let mut dev = 0.0;
        for (&yi, &mi) in y.iter().zip(mu.iter()) {
            let mi = mi.max(MU_FLOOR);
            let lhs = if yi > 0.0 { yi * (yi / mi).ln() } else { 0.0 };
            let rhs = match self {
                Family::Poisson => yi - mi,
                Family::NegBinomial { alpha } => {
                    (yi + 1.0 / alpha) * ((1.0 + alpha * yi) / (1.0 + alpha * mi)).ln()
                }
            };
            dev += lhs - rhs;
        }
        2.0 * dev
    }

    fn log_likelihood(&self, y: &[f64], mu: &[f64]) -> f64 {
        let mut ll = 0.0;
        for (&yi, &mi) in y.iter().zip(mu.iter()) {
            let mi = mi.max(MU_FLOOR);
            ll += match self {
                Family::Poisson => yi * mi.ln() - mi - ln_gamma(yi + 1.0),
                Family::NegBinomial { alpha } => {
                    let inv_a = 1.0 / alpha;
                    let base = ln_gamma(yi + inv_a) - ln_gamma(inv_a) - ln_gamma(yi + 1.0)
                        - (yi + inv_a) * (1.0 + alpha * mi).ln();
                    if yi > 0.0 {
                        base + yi * (alpha * mi).ln()
                    } else {
                        base
                    }
                }
            };
        }
        ll
    }
}

/// Fit a Poisson regression model (for count data)
///
/// # Arguments
/// * `y` - Response variable (counts, must be non-negative)
/// * `x` - Feature matrix (n observations x p features, column-major)
/// * `options` - Fitting options
pub fn fit_poisson(y: &[f64], x: &[Vec<f64>], options: &PoissonOptions) -> StatsResult<GlmResult> {
    validate_inputs(y, x)?;
    check_nonnegative(y, "Poisson regression requires non-negative response values")?;

    let (yv, xm, n_features) = prepare(y, x, options.fit_intercept)?;
    let fit = irls(
        &yv,
        &xm,
        Family::Poisson,
        options.max_iterations,
        options.tolerance,
    )?;

    // Pearson dispersion as an overdispersion diagnostic
    let p_total = xm.ncols();
    let dispersion = if yv.len() > p_total {
        let pearson: f64 = yv
            .iter()
            .zip(fit.mu.iter())
            .map(|(&yi, &mi)| (yi - mi) * (yi - mi) / mi.max(MU_FLOOR))
            .sum();
        Some(pearson / (yv.len() - p_total) as f64)
    } else {
        None
    };

    Ok(assemble(
        &yv,
        fit,
        Family::Poisson,
        n_features,
        options.fit_intercept,
        p_total,
        dispersion,
        options.compute_inference,
        options.confidence_level,
    )?)
}

/// Fit a Negative Binomial (NB2) regression model (for overdispersed counts)
///
/// The dispersion parameter alpha is taken from the options if provided,
/// otherwise estimated by the method of moments from a Poisson pre-fit.
pub fn fit_negbinomial(
    y: &[f64],
    x: &[Vec<f64>],
    options: &NegBinomialOptions,
) -> StatsResult<GlmResult> {
    validate_inputs(y, x)?;
    check_nonnegative(
        y,
        "Negative Binomial regression requires non-negative response values",
    )?;

    let (yv, xm, n_features) = prepare(y, x, options.fit_intercept)?;

    let alpha = match options.alpha {
        Some(a) => {
            if a <= 0.0 {
                return Err(StatsError::InvalidValue {
                    field: "alpha",
                    message: "dispersion parameter must be positive".to_string(),
                });
            }
            a
        }
        None => {
            let pre = irls(
                &yv,
                &xm,
                Family::Poisson,
                options.max_iterations,
                options.tolerance,
            )?;
            moment_alpha(&yv, &pre.mu)
        }
    };

    let family = Family::NegBinomial { alpha };
    let fit = irls(&yv, &xm, family, options.max_iterations, options.tolerance)?;

    let p_total = xm.ncols();
    Ok(assemble(
        &yv,
        fit,
        family,
        n_features,
        options.fit_intercept,
        // alpha counts as an estimated parameter in the AIC
        p_total + 1,
        Some(alpha),
        options.compute_inference,
        options.confidence_level,
    )?)
}

/// Method-of-moments estimate of the NB2 dispersion from Poisson residuals
fn moment_alpha(y: &[f64], mu: &[f64]) -> f64 {
    let num: f64 = y
        .iter()
        .zip(mu.iter())
        .map(|(&yi, &mi)| (yi - mi) * (yi - mi) - mi)
        .sum();
    let den: f64 = mu.iter().map(|&mi| mi * mi).sum();
    if den > 0.0 {
        (num / den).clamp(1e-8, 1e6)
    } else {
        1e-8
    }
}

struct IrlsFit {
    beta: Vec<f64>,
    mu: Vec<f64>,
    iterations: u32,
    converged: bool,
    covariance: Mat<f64>,
}

fn irls(
    y: &[f64],
    x: &Mat<f64>,
    family: Family,
    max_iterations: u32,
    tolerance: f64,
) -> StatsResult<IrlsFit> {
    let n = y.len();
    let p = x.ncols();

    let mut eta: Vec<f64> = y.iter().map(|&v| (v + 0.5).ln()).collect();
    let mut beta = vec![0.0; p];
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..max_iterations {
        iterations = iter + 1;

        let mu: Vec<f64> = eta.iter().map(|&e| e.exp().max(MU_FLOOR)).collect();
        let weights: Vec<f64> = mu.iter().map(|&m| family.irls_weight(m)).collect();
        // Working response for the log link
        let z: Vec<f64> = (0..n).map(|i| eta[i] + (y[i] - mu[i]) / mu[i]).collect();

        let mut xtwx = Mat::<f64>::zeros(p, p);
        let mut xtwz = Mat::<f64>::zeros(p, 1);
        for i in 0..n {
            let wi = weights[i];
            for a in 0..p {
                let xa = x[(i, a)];
                xtwz[(a, 0)] += wi * xa * z[i];
                for b in 0..p {
                    xtwx[(a, b)] += wi * xa * x[(i, b)];
                }
            }
        }

        let lu = xtwx.partial_piv_lu();
        let solution = lu.solve(&xtwz);
        let new_beta: Vec<f64> = (0..p).map(|k| solution[(k, 0)]).collect();
        if new_beta.iter().any(|b| !b.is_finite()) {
            return Err(StatsError::SingularMatrix);
        }

        let delta = new_beta
            .iter()
            .zip(beta.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        beta = new_beta;

        for i in 0..n {
            let mut e = 0.0;
            for k in 0..p {
                e += x[(i, k)] * beta[k];
            }
            eta[i] = e.clamp(-ETA_BOUND, ETA_BOUND);
        }

        if iter > 0 && delta < tolerance {
            converged = true;
            break;
        }
    }

    let mu: Vec<f64> = eta.iter().map(|&e| e.exp().max(MU_FLOOR)).collect();

    // Coefficient covariance (X' W X)^-1 at the final weights
    let weights: Vec<f64> = mu.iter().map(|&m| family.irls_weight(m)).collect();
    let mut xtwx = Mat::<f64>::zeros(p, p);
    for i in 0..n {
        let wi = weights[i];
        for a in 0..p {
            let xa = wi * x[(i, a)];
            for b in 0..p {
                xtwx[(a, b)] += xa * x[(i, b)];
            }
        }
    }
    let lu = xtwx.partial_piv_lu();
    let eye = Mat::<f64>::identity(p, p);
    let covariance = lu.solve(&eye);

    Ok(IrlsFit {
        beta,
        mu,
        iterations,
        converged,
        covariance,
    })
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    y: &[f64],
    fit: IrlsFit,
    family: Family,
    n_features: usize,
    fit_intercept: bool,
    aic_params: usize,
    dispersion: Option<f64>,
    compute_inference: bool,
    confidence_level: f64,
) -> StatsResult<GlmResult> {
    let n = y.len();
    let residual_deviance = family.deviance(y, &fit.mu);

    let ybar = y.iter().sum::<f64>() / n as f64;
    let mu0 = vec![ybar.max(MU_FLOOR); n];
    let null_deviance = family.deviance(y, &mu0);
    let pseudo_r_squared = if null_deviance > 0.0 {
        1.0 - residual_deviance / null_deviance
    } else {
        0.0
    };

    let log_likelihood = family.log_likelihood(y, &fit.mu);
    let aic = -2.0 * log_likelihood + 2.0 * aic_params as f64;

    let offset = usize::from(fit_intercept);
    let intercept = fit_intercept.then(|| fit.beta[0]);
    let coefficients: Vec<f64> = fit.beta[offset..].to_vec();

    let inference = if compute_inference {
        Some(wald_inference(
            &fit.beta,
            &fit.covariance,
            offset,
            confidence_level,
        )?)
    } else {
        None
    };

    let core = GlmFitResult {
        coefficients,
        intercept,
        null_deviance,
        residual_deviance,
        pseudo_r_squared,
        aic,
        log_likelihood,
        n_observations: n,
        n_features,
        iterations: fit.iterations,
        converged: fit.converged,
        dispersion,
    };

    Ok(GlmResult { core, inference })
}

fn wald_inference(
    beta: &[f64],
    covariance: &Mat<f64>,
    offset: usize,
    confidence_level: f64,
) -> StatsResult<GlmInferenceResult> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| StatsError::InvalidInput(e.to_string()))?;
    let z_crit = normal.inverse_cdf(0.5 + confidence_level / 2.0);

    let p = beta.len();
    let mut std_errors = Vec::with_capacity(p - offset);
    let mut z_values = Vec::with_capacity(p - offset);
    let mut p_values = Vec::with_capacity(p - offset);
    let mut ci_lower = Vec::with_capacity(p - offset);
    let mut ci_upper = Vec::with_capacity(p - offset);

    for j in offset..p {
        let var = covariance[(j, j)];
        let se = if var.is_finite() && var > 0.0 {
            var.sqrt()
        } else {
            f64::NAN
        };
        let z = beta[j] / se;
        let pv = if z.is_finite() {
            (2.0 * (1.0 - normal.cdf(z.abs()))).min(1.0)
        } else {
            f64::NAN
        };
        std_errors.push(se);
        z_values.push(z);
        p_values.push(pv);
        ci_lower.push(beta[j] - z_crit * se);
        ci_upper.push(beta[j] + z_crit * se);
    }

    Ok(GlmInferenceResult {
        std_errors,
        z_values,
        p_values,
        ci_lower,
        ci_upper,
        confidence_level,
    })
}

// Helper functions

fn validate_inputs(y: &[f64], x: &[Vec<f64>]) -> StatsResult<()> {
    if y.is_empty() {
        return Err(StatsError::EmptyInput { field: "y" });
    }
    if x.is_empty() {
        return Err(StatsError::EmptyInput { field: "x" });
    }

    let n_obs = y.len();
    for col in x.iter() {
        if col.len() != n_obs {
            return Err(StatsError::DimensionMismatch {
                y_len: n_obs,
                x_rows: col.len(),
            });
        }
    }
    Ok(())
}

fn check_nonnegative(y: &[f64], message: &str) -> StatsResult<()> {
    for &val in y.iter() {
        if val < 0.0 {
            return Err(StatsError::InvalidValue {
                field: "y",
                message: message.to_string(),
            });
        }
    }
    Ok(())
}

fn get_valid_indices(y: &[f64], x: &[Vec<f64>]) -> Vec<usize> {
    let n_obs = y.len();
    (0..n_obs)
        .filter(|&i| {
            y[i].is_finite() && x.iter().all(|col| col[i].is_finite())
        })
        .collect()
}

/// Filter invalid rows and convert to a faer matrix with an optional
/// leading intercept column. Returns (response, design, n_features).
fn prepare(
    y: &[f64],
    x: &[Vec<f64>],
    fit_intercept: bool,
) -> StatsResult<(Vec<f64>, Mat<f64>, usize)> {
    let n_features = x.len();

    let valid_indices = get_valid_indices(y, x);
    if valid_indices.is_empty() {
        return Err(StatsError::NoValidData);
    }

    let n_valid = valid_indices.len();
    let min_obs = if fit_intercept {
        n_features + 1
    } else {
        n_features
    };
    if n_valid <= min_obs {
        return Err(StatsError::InsufficientData {
            rows: n_valid,
            cols: n_features,
        });
    }

    let offset = usize::from(fit_intercept);
    let yv: Vec<f64> = valid_indices.iter().map(|&i| y[i]).collect();
    let xm = Mat::from_fn(n_valid, n_features + offset, |i, j| {
        if fit_intercept && j == 0 {
            1.0
        } else {
            x[j - offset][valid_indices[i]]
        }
    });

    Ok((yv, xm, n_features))
}
