// ============================================================================
// GLM Types (count-regression models)
// ============================================================================

/// Options for Poisson regression (log link, IRLS)
#[derive(Debug, Clone)]
pub struct PoissonOptions {
    /// Whether to fit an intercept term
    pub fit_intercept: bool,
    /// Maximum iterations for IRLS
    pub max_iterations: u32,
    /// Convergence tolerance on coefficient change
    pub tolerance: f64,
    /// Whether to compute inference statistics
    pub compute_inference: bool,
    /// Confidence level for confidence intervals
    pub confidence_level: f64,
}

impl Default for PoissonOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            max_iterations: 100,
            tolerance: 1e-8,
            compute_inference: false,
            confidence_level: 0.95,
        }
    }
}

/// Options for Negative Binomial (NB2) regression
#[derive(Debug, Clone)]
pub struct NegBinomialOptions {
    /// Whether to fit an intercept term
    pub fit_intercept: bool,
    /// Dispersion parameter (alpha). If None, it is estimated by the
    /// method of moments from a Poisson pre-fit.
    pub alpha: Option<f64>,
    /// Maximum iterations for IRLS
    pub max_iterations: u32,
    /// Convergence tolerance on coefficient change
    pub tolerance: f64,
    /// Whether to compute inference statistics
    pub compute_inference: bool,
    /// Confidence level for confidence intervals
    pub confidence_level: f64,
}

impl Default for NegBinomialOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            alpha: None,
            max_iterations: 100,
            tolerance: 1e-8,
            compute_inference: false,
            confidence_level: 0.95,
        }
    }
}

/// Result from GLM fitting - uses deviance-based metrics instead of R²
#[derive(Debug, Clone)]
pub struct GlmFitResult {
    /// Regression coefficients (excluding intercept)
    pub coefficients: Vec<f64>,
    /// Intercept term (if fitted with intercept)
    pub intercept: Option<f64>,
    /// Null deviance (deviance of intercept-only model)
    pub null_deviance: f64,
    /// Residual deviance (deviance of fitted model)
    pub residual_deviance: f64,
    /// Pseudo R-squared (1 - residual_deviance/null_deviance)
    pub pseudo_r_squared: f64,
    /// AIC (Akaike Information Criterion)
    pub aic: f64,
    /// Log-likelihood of the fitted model
    pub log_likelihood: f64,
    /// Number of observations used
    pub n_observations: usize,
    /// Number of features (excluding intercept)
    pub n_features: usize,
    /// Number of iterations performed
    pub iterations: u32,
    /// Whether IRLS converged within the iteration budget.
    /// A non-converged fit still carries the last iterate's coefficients.
    pub converged: bool,
    /// Dispersion parameter (Pearson dispersion for Poisson, alpha for NB)
    pub dispersion: Option<f64>,
}

/// GLM inference results (Wald statistics)
#[derive(Debug, Clone)]
pub struct GlmInferenceResult {
    /// Standard errors of coefficients (same indexing as `coefficients`)
    pub std_errors: Vec<f64>,
    /// z-statistics for coefficients
    pub z_values: Vec<f64>,
    /// p-values for coefficients
    pub p_values: Vec<f64>,
    /// Lower bound of confidence intervals
    pub ci_lower: Vec<f64>,
    /// Upper bound of confidence intervals
    pub ci_upper: Vec<f64>,
    /// Confidence level used (e.g., 0.95)
    pub confidence_level: f64,
}
