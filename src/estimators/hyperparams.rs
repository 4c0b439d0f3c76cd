use super::error::{EstimatorError, Result};
use super::param_guard::ParamGuard;
use super::Float;

/// A verified hyperparameter set ready for the fitting of an ordinary least
/// squares model
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionValidParams<F> {
    fit_intercept: bool,
    rcond: F,
}

impl<F: Float> LinearRegressionValidParams<F> {
    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn rcond(&self) -> F {
        self.rcond
    }
}

/// A hyper-parameter set during construction
///
/// Configures and minimizes the following objective function:
/// ```ignore
/// ||y - Xw - b||^2_2
/// ```
/// Rank-deficient design matrices yield the minimum-norm solution.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionParams<F>(LinearRegressionValidParams<F>);

impl<F: Float> Default for LinearRegressionParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configure and fit an ordinary least squares model
impl<F: Float> LinearRegressionParams<F> {
    /// Create default ordinary least squares hyper parameters
    pub fn new() -> LinearRegressionParams<F> {
        Self(LinearRegressionValidParams {
            fit_intercept: true,
            rcond: F::cast(1e-12),
        })
    }

    /// Whether to estimate an intercept. When disabled the data is assumed
    /// to be centered.
    /// Defaults to `true` if not set.
    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.0.fit_intercept = fit_intercept;
        self
    }

    /// Set the relative cutoff under which singular values of the design
    /// matrix are treated as zero.
    ///
    /// Defaults to `1e-12` if not set.
    pub fn rcond(mut self, rcond: F) -> Self {
        self.0.rcond = rcond;
        self
    }
}

impl<F: Float> ParamGuard for LinearRegressionParams<F> {
    type Checked = LinearRegressionValidParams<F>;
    type Error = EstimatorError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.rcond.is_negative() || !self.0.rcond.is_finite() {
            Err(EstimatorError::InvalidTolerance(
                self.0.rcond.to_f64().unwrap_or(f64::NAN),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
