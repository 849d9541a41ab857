//! crowdstorm-stats: statistics library for the crowdstorm red-card analysis
//!
//! This crate provides the numerical machinery used by the analysis
//! pipeline: descriptive summaries, nonparametric and categorical
//! hypothesis tests, and count-regression models (Poisson, Negative
//! Binomial) fit by IRLS.

pub mod descriptive;
pub mod errors;
pub mod models;
pub mod tests;
pub mod types;

pub use errors::{StatsError, StatsResult};
pub use types::*;
