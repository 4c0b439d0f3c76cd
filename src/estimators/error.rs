use thiserror::Error;

/// Simplified `Result` using [`EstimatorError`] as error type
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Error variants from hyperparameter construction or model estimation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f64),
    #[error("cannot fit a model on an empty dataset")]
    EmptyDataset,
    #[error("expected {expected} features, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("non-finite value in the {0}")]
    NonFiniteInput(&'static str),
    #[error("least squares solver failed: {0}")]
    SolverFailure(String),
}
