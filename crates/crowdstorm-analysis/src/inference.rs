//! Hypothesis tests and count-regression models
//!
//! Runs the inferential battery over the cleaned table: normality checks
//! on the raw rater columns, inter-rater agreement, the light/dark
//! rank-sum comparison, the red-card contingency test, and the Poisson /
//! Negative Binomial fits of `red_cards ~ skin_tone + games`. A model
//! that fails to converge is reported with a warning, not an error.

use crowdstorm_stats::models::{fit_negbinomial, fit_poisson, DesignMatrix, GlmResult};
use crowdstorm_stats::tests::categorical::{chisq_test, ChiSquareOptions};
use crowdstorm_stats::tests::correlation::spearman;
use crowdstorm_stats::tests::distributional::{dagostino_k_squared_detailed, DAgostinoResult};
use crowdstorm_stats::tests::nonparametric::{mann_whitney_u, MannWhitneyOptions};
use crowdstorm_stats::tests::{ChiSquareResult, CorrelationResult, TestResult};
use crowdstorm_stats::{NegBinomialOptions, PoissonOptions};
use log::{info, warn};

use crate::data::Dataset;
use crate::{AnalysisError, Result};

/// The reportable slice of one count-model fit: the skin-tone
/// coefficient and its inference, plus fit diagnostics
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub name: &'static str,
    pub coefficient: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    /// Incidence rate ratio, exp(coefficient)
    pub irr: f64,
    pub converged: bool,
    pub iterations: u32,
    pub aic: f64,
    pub pseudo_r_squared: f64,
    pub n_observations: usize,
    pub dispersion: Option<f64>,
}

impl ModelSummary {
    fn extract(name: &'static str, term: &str, design: &DesignMatrix, fit: &GlmResult) -> Result<ModelSummary> {
        let idx = design.position(term).ok_or_else(|| {
            AnalysisError::Data(format!("Model '{}' has no term '{}'", name, term))
        })?;
        let inference = fit.inference.as_ref().ok_or_else(|| {
            AnalysisError::Data(format!("Model '{}' was fit without inference", name))
        })?;

        if !fit.core.converged {
            warn!(
                "{} did not converge after {} iterations; reporting the partial fit",
                name, fit.core.iterations
            );
        }

        let coefficient = fit.core.coefficients[idx];
        Ok(ModelSummary {
            name,
            coefficient,
            std_error: inference.std_errors[idx],
            z_value: inference.z_values[idx],
            p_value: inference.p_values[idx],
            irr: coefficient.exp(),
            converged: fit.core.converged,
            iterations: fit.core.iterations,
            aic: fit.core.aic,
            pseudo_r_squared: fit.core.pseudo_r_squared,
            n_observations: fit.core.n_observations,
            dispersion: fit.core.dispersion,
        })
    }

    /// Multiplicative effect as a percentage change in expected count
    pub fn effect_percent(&self) -> f64 {
        (self.irr - 1.0) * 100.0
    }
}

/// All inferential outputs of the pipeline
#[derive(Debug, Clone)]
pub struct Inference {
    pub normality_rater1: DAgostinoResult,
    pub normality_rater2: DAgostinoResult,
    pub rater_agreement: CorrelationResult,
    pub mann_whitney: TestResult,
    pub chi_square: ChiSquareResult,
    pub poisson: ModelSummary,
    pub negbinomial: ModelSummary,
    /// Expanded model with bias-proxy covariates and interactions, fit on
    /// the subset of rows where both proxies are present
    pub interaction: Option<ModelSummary>,
    /// Response mean and variance, the overdispersion motivation
    pub red_card_mean: f64,
    pub red_card_variance: f64,
}

/// Run the full inferential battery
pub fn run(dataset: &Dataset) -> Result<Inference> {
    info!("Running hypothesis tests on {} observations", dataset.len());

    let rater1 = dataset.rater1();
    let rater2 = dataset.rater2();
    let normality_rater1 = dagostino_k_squared_detailed(&rater1)?;
    let normality_rater2 = dagostino_k_squared_detailed(&rater2)?;
    let rater_agreement = spearman(&rater1, &rater2)?;

    let (light, dark) = dataset.red_cards_by_group();
    let mann_whitney = mann_whitney_u(&light, &dark, &MannWhitneyOptions::default())?;

    let chi_square = chisq_test(&dataset.red_card_crosstab(), &ChiSquareOptions::default())?;

    let red_cards = dataset.red_cards();
    let red_summary = crowdstorm_stats::descriptive::summarize(&red_cards)?;

    let mut design = DesignMatrix::new(dataset.len());
    design.push("skin_tone", dataset.skin_tones())?;
    design.push("games", dataset.games())?;

    info!("Fitting Poisson model: red_cards ~ skin_tone + games");
    let poisson_options = PoissonOptions {
        compute_inference: true,
        ..Default::default()
    };
    let poisson_fit = fit_poisson(&red_cards, design.columns(), &poisson_options)?;
    let poisson = ModelSummary::extract("Poisson", "skin_tone", &design, &poisson_fit)?;

    info!("Fitting Negative Binomial model on the same design");
    let negbin_options = NegBinomialOptions {
        compute_inference: true,
        ..Default::default()
    };
    let negbin_fit = fit_negbinomial(&red_cards, design.columns(), &negbin_options)?;
    let negbinomial = ModelSummary::extract("Negative Binomial", "skin_tone", &design, &negbin_fit)?;

    let interaction = fit_interaction_model(dataset)?;

    Ok(Inference {
        normality_rater1,
        normality_rater2,
        rater_agreement,
        mann_whitney,
        chi_square,
        poisson,
        negbinomial,
        interaction,
        red_card_mean: red_summary.mean,
        red_card_variance: red_summary.variance,
    })
}

/// Expanded Poisson model with bias-proxy covariates and skin-tone
/// interactions, on the rows where both proxies are present. Skipped
/// (with a warning) when that subset is too small to fit.
fn fit_interaction_model(dataset: &Dataset) -> Result<Option<ModelSummary>> {
    let rows: Vec<_> = dataset
        .observations
        .iter()
        .filter(|o| o.mean_iat.is_some() && o.mean_exp.is_some())
        .collect();

    // 11 features plus intercept
    if rows.len() < 30 {
        warn!(
            "Only {} rows carry both bias proxies; skipping the interaction model",
            rows.len()
        );
        return Ok(None);
    }

    let col = |f: &dyn Fn(&crate::data::Observation) -> f64| -> Vec<f64> {
        rows.iter().map(|o| f(o)).collect()
    };

    let mut design = DesignMatrix::new(rows.len());
    design.push("skin_tone", col(&|o| o.skin_tone))?;
    design.push("games", col(&|o| o.games as f64))?;
    design.push("goals", col(&|o| o.goals as f64))?;
    design.push("yellow_cards", col(&|o| o.yellow_cards as f64))?;
    design.push("mean_iat", col(&|o| o.mean_iat.unwrap_or(f64::NAN)))?;
    design.push("mean_exp", col(&|o| o.mean_exp.unwrap_or(f64::NAN)))?;
    design.interaction("skin_tone", "games")?;
    design.interaction("skin_tone", "goals")?;
    design.interaction("skin_tone", "yellow_cards")?;
    design.interaction("skin_tone", "mean_iat")?;
    design.interaction("skin_tone", "mean_exp")?;

    let red_cards: Vec<f64> = rows.iter().map(|o| o.red_cards as f64).collect();

    info!(
        "Fitting interaction Poisson model on {} rows with bias proxies",
        rows.len()
    );
    let options = PoissonOptions {
        compute_inference: true,
        ..Default::default()
    };
    let fit = fit_poisson(&red_cards, design.columns(), &options)?;
    let summary = ModelSummary::extract("Poisson (interactions)", "skin_tone", &design, &fit)?;
    Ok(Some(summary))
}

/// Render the inferential section as printable text
pub fn render(inf: &Inference) -> String {
    let mut out = String::new();
    let push = |out: &mut String, line: String| {
        out.push_str(&line);
        out.push('\n');
    };

    push(&mut out, "=== Normality (D'Agostino K-squared) ===".into());
    for (label, r) in [
        ("rater1", &inf.normality_rater1),
        ("rater2", &inf.normality_rater2),
    ] {
        push(
            &mut out,
            format!(
                "{}: K2 = {:.4}, p = {:.4e}{}",
                label,
                r.statistic,
                r.p_value,
                if r.p_value < 0.05 {
                    "  (non-normal; nonparametric tests justified)"
                } else {
                    ""
                }
            ),
        );
    }
    push(
        &mut out,
        format!(
            "Inter-rater agreement (Spearman): rho = {:.4}, p = {:.4e}, n = {}",
            inf.rater_agreement.r, inf.rater_agreement.p_value, inf.rater_agreement.n
        ),
    );
    push(&mut out, String::new());

    push(&mut out, "=== Mann-Whitney U (light vs dark) ===".into());
    push(
        &mut out,
        format!(
            "U = {:.1}, p = {:.4e} (n1 = {}, n2 = {})",
            inf.mann_whitney.statistic,
            inf.mann_whitney.p_value,
            inf.mann_whitney.n1,
            inf.mann_whitney.n2
        ),
    );
    push(&mut out, String::new());

    push(&mut out, "=== Chi-square (dark skin x any red card) ===".into());
    push(
        &mut out,
        format!(
            "chi2 = {:.4}, df = {}, p = {:.4e}",
            inf.chi_square.statistic, inf.chi_square.df, inf.chi_square.p_value
        ),
    );
    push(&mut out, String::new());

    push(&mut out, "=== Count models ===".into());
    push(
        &mut out,
        format!(
            "Response: mean = {:.4}, variance = {:.4}{}",
            inf.red_card_mean,
            inf.red_card_variance,
            if inf.red_card_variance > inf.red_card_mean {
                "  (overdispersed)"
            } else {
                ""
            }
        ),
    );
    let mut models: Vec<&ModelSummary> = vec![&inf.poisson, &inf.negbinomial];
    if let Some(ref m) = inf.interaction {
        models.push(m);
    }
    for m in models {
        push(&mut out, format!("--- {} ---", m.name));
        if !m.converged {
            push(
                &mut out,
                format!(
                    "WARNING: did not converge after {} iterations; partial fit shown",
                    m.iterations
                ),
            );
        }
        push(
            &mut out,
            format!(
                "skin_tone: coef = {:.6}, se = {:.6}, z = {:.3}, p = {:.4e}",
                m.coefficient, m.std_error, m.z_value, m.p_value
            ),
        );
        push(
            &mut out,
            format!(
                "IRR = {:.4} ({:+.1}% expected red cards per unit skin tone)",
                m.irr,
                m.effect_percent()
            ),
        );
        push(
            &mut out,
            format!(
                "AIC = {:.1}, pseudo-R2 = {:.4}, n = {}{}",
                m.aic,
                m.pseudo_r_squared,
                m.n_observations,
                match m.dispersion {
                    Some(d) => format!(", dispersion = {:.4}", d),
                    None => String::new(),
                }
            ),
        );
    }

    out
}
