//! Red-card / skin-tone analysis pipeline
//!
//! A run-once batch pipeline over the crowdstorming player-referee CSV:
//! load and clean the table, print descriptive statistics, run hypothesis
//! tests and count-regression models, render a chart panel, and print a
//! final report.

pub mod data;
pub mod explore;
pub mod inference;
pub mod plots;
pub mod report;

use thiserror::Error;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Statistics error: {0}")]
    Stats(#[from] crowdstorm_stats::StatsError),

    #[error("Plot error: {0}")]
    Plot(#[from] plots::PlotError),

    #[error("Data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
