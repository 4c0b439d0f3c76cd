use crate::datasets::DatasetBase;
use ndarray::{Array1, ArrayView2};

/// Fit trait
///
/// The fittable trait allows an estimator to be fitted to a dataset (a combination
/// of design matrix and targets). More formally, the model estimates coefficients
/// that minimizes an empirical risk (loss function).
pub trait Fit<F, E: std::error::Error> {
    type Object: Predict<F, E>;

    fn fit(&self, dataset: &DatasetBase<F>) -> Result<Self::Object, E>;
}

/// Predict trait
///
/// A fitted model maps every row of a design matrix with the same number of
/// features as the training data to a predicted target.
pub trait Predict<F, E: std::error::Error> {
    fn predict(&self, X: ArrayView2<F>) -> Result<Array1<F>, E>;
}
