use ndarray::{Array1, Array2};
use thiserror::Error;


mod impl_datasets;
mod impl_design_matrix;

/// A regression dataset: a dense design matrix of shape `(n_samples, n_features)`
/// and a target vector of length `n_samples`.
///
/// Instances are only built through [`DatasetBase::new`] or
/// [`DatasetBase::from_rows`], which enforce the shape invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<F> {
    design_matrix: Array2<F>,
    targets: Array1<F>,
}

/// Dataset of double-precision values, as decoded from JSON payloads.
pub type Dataset = DatasetBase<f64>;

/// Simplified `Result` using [`DatasetError`] as error type
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Error variants from dataset construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("X must contain at least one row")]
    Empty,
    #[error("X must contain at least one feature column")]
    NoFeatures,
    #[error("row {row} of X has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("X has {rows} rows but y has {targets} values")]
    TargetMismatch { rows: usize, targets: usize },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Shape accessors shared by the design matrices handled by the estimators.
pub trait DesignMatrix {
    fn n_samples(&self) -> usize;
    fn n_features(&self) -> usize;
}
