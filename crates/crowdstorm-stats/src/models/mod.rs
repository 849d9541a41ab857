//! Regression models
//!
//! - Design-matrix construction with interaction terms
//! - Poisson and Negative Binomial GLMs fit by IRLS

pub mod design;
pub mod glm;

pub use design::DesignMatrix;
pub use glm::{fit_negbinomial, fit_poisson, GlmResult};
