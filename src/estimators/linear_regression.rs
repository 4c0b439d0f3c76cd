use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use super::error::{EstimatorError, Result};
use super::hyperparams::{LinearRegressionParams, LinearRegressionValidParams};
use super::traits::{Fit, Predict};
use crate::datasets::DatasetBase;
use crate::Float;

const SVD_MAX_ITERATIONS: usize = 10_000;

/// The ordinary least squares estimator
///
/// Fits `y ≈ Xw + b` by minimizing the residual sum of squares. The solve is
/// carried out in double precision through a singular value decomposition of
/// the (centered) design matrix, which also handles collinear features.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression<F> {
    coefficients: Array1<F>,
    intercept: F,
}

impl<F: Float> LinearRegression<F> {
    /// This method instantiates an ordinary least squares estimator with
    /// default parameters.
    pub fn params() -> LinearRegressionParams<F> {
        LinearRegressionParams::new()
    }

    /// This method is a getter for the coefficients vector.
    pub fn coefficients(&self) -> ArrayView1<F> {
        self.coefficients.view()
    }

    pub fn intercept(&self) -> F {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient of determination R² of the prediction on `dataset`, see
    /// [`r2_score`].
    pub fn score(&self, dataset: &DatasetBase<F>) -> Result<F> {
        let y_pred = self.predict(dataset.design_matrix())?;
        r2_score(dataset.targets(), y_pred.view())
    }
}

/// Coefficient of determination of `y_pred` against `y`.
///
/// A constant target yields `1` for an exact fit and `0` otherwise.
pub fn r2_score<F: Float>(y: ArrayView1<F>, y_pred: ArrayView1<F>) -> Result<F> {
    if y.len() != y_pred.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: y.len(),
            found: y_pred.len(),
        });
    }
    let y_mean = y.mean().ok_or(EstimatorError::EmptyDataset)?;

    let ss_res: F = y
        .iter()
        .zip(y_pred.iter())
        .map(|(&yi, &pi)| (yi - pi) * (yi - pi))
        .sum();
    let ss_tot: F = y.iter().map(|&yi| (yi - y_mean) * (yi - y_mean)).sum();

    if ss_tot == F::zero() {
        return Ok(if ss_res == F::zero() {
            F::one()
        } else {
            F::zero()
        });
    }
    Ok(F::one() - ss_res / ss_tot)
}

impl<F: Float> Predict<F, EstimatorError> for LinearRegression<F> {
    fn predict(&self, X: ArrayView2<F>) -> Result<Array1<F>> {
        if X.ncols() != self.n_features() {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.n_features(),
                found: X.ncols(),
            });
        }
        Ok(X.dot(&self.coefficients) + self.intercept)
    }
}

/// This implements the least squares fit for dense design matrices.
impl<F: Float> Fit<F, EstimatorError> for LinearRegressionValidParams<F> {
    /// If successful, the output of the solver is an instance of
    /// [`LinearRegression`] containing the fitted coefficients and intercept.
    type Object = LinearRegression<F>;

    fn fit(&self, dataset: &DatasetBase<F>) -> Result<Self::Object> {
        let X = dataset.design_matrix();
        let y = dataset.targets();
        let (n_samples, n_features) = X.dim();

        if n_samples == 0 {
            return Err(EstimatorError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(EstimatorError::DimensionMismatch {
                expected: n_samples,
                found: y.len(),
            });
        }

        let (x_offset, y_offset) = if self.fit_intercept() {
            let x_mean = X.mean_axis(Axis(0)).ok_or(EstimatorError::EmptyDataset)?;
            let y_mean = y.mean().ok_or(EstimatorError::EmptyDataset)?;
            (x_mean, y_mean)
        } else {
            (Array1::zeros(n_features), F::zero())
        };

        let a = DMatrix::from_fn(n_samples, n_features, |i, j| {
            to_f64(X[[i, j]] - x_offset[j])
        });
        let b = DVector::from_fn(n_samples, |i, _| to_f64(y[i] - y_offset));
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(EstimatorError::NonFiniteInput("training data"));
        }

        let w = solve_least_squares(a, b, to_f64(self.rcond()))?;
        let coefficients = Array1::from_iter(w.iter().map(|&wj| F::cast(wj)));
        if coefficients.iter().any(|wj| !wj.is_finite()) {
            return Err(EstimatorError::NonFiniteInput("fitted coefficients"));
        }

        let intercept = if self.fit_intercept() {
            y_offset - x_offset.dot(&coefficients)
        } else {
            F::zero()
        };

        Ok(LinearRegression {
            coefficients,
            intercept,
        })
    }
}

/// Minimum-norm solution of `min ||Aw - b||_2`. Singular values below
/// `rcond * s_max` are discarded.
fn solve_least_squares(a: DMatrix<f64>, b: DVector<f64>, rcond: f64) -> Result<DVector<f64>> {
    let svd = a
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| EstimatorError::SolverFailure("SVD did not converge".to_string()))?;
    let s_max = svd.singular_values.iter().cloned().fold(0., f64::max);
    svd.solve(&b, rcond * s_max)
        .map_err(|e| EstimatorError::SolverFailure(e.to_string()))
}

fn to_f64<F: Float>(x: F) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
