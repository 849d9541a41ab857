use thiserror::Error;

/// Errors that can occur during statistical computations
#[derive(Error, Debug)]
pub enum StatsError {
    // Input validation errors
    #[error("Empty input: {field} cannot be empty")]
    EmptyInput { field: &'static str },

    #[error("Insufficient data: {rows} rows, {cols} features (need rows > features)")]
    InsufficientData { rows: usize, cols: usize },

    #[error("Insufficient data: {0}")]
    InsufficientDataMsg(String),

    #[error("Dimension mismatch: y has {y_len} elements, X has {x_rows} rows")]
    DimensionMismatch { y_len: usize, x_rows: usize },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatchMsg(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("All rows filtered due to NaN/Inf values")]
    NoValidData,

    // Numerical errors
    #[error("Matrix is singular or near-singular")]
    SingularMatrix,
}

/// Result type for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
