use super::error::EstimatorError;
use super::hyperparams::LinearRegressionParams;
use super::linear_regression::{r2_score, LinearRegression};
use super::param_guard::ParamGuard;
use super::traits::{Fit, Predict};
use crate::datasets::{Dataset, DatasetBase};
use crate::helpers::test_helpers::{assert_array_all_close, generate_random_data};
use approx::assert_abs_diff_eq;
use ndarray::{array, Array1};

#[test]
fn test_recovers_exact_linear_function() {
    let dataset = Dataset::from_rows(&[vec![1.], vec![2.], vec![3.]], vec![2., 4., 6.]).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();

    assert_abs_diff_eq!(model.coefficients()[0], 2., epsilon = 1e-10);
    assert_abs_diff_eq!(model.intercept(), 0., epsilon = 1e-10);

    let y_pred = model.predict(dataset.design_matrix()).unwrap();
    assert_array_all_close(y_pred.view(), array![2., 4., 6.].view(), 1e-10);
    assert_abs_diff_eq!(model.score(&dataset).unwrap(), 1., epsilon = 1e-12);
}

#[test]
fn test_recovers_intercept() {
    let X = array![[0., 1.], [1., 0.], [2., 3.], [4., 1.], [3., 3.]];
    let w = array![1.5, -0.5];
    let y = X.dot(&w) + 3.;
    let dataset = Dataset::new(X, y).unwrap();

    let model = LinearRegression::params().fit(&dataset).unwrap();
    assert_array_all_close(model.coefficients(), w.view(), 1e-9);
    assert_abs_diff_eq!(model.intercept(), 3., epsilon = 1e-9);
}

#[test]
fn test_without_intercept() {
    let dataset = Dataset::from_rows(&[vec![1.], vec![2.], vec![4.]], vec![3., 5., 9.]).unwrap();
    let model = LinearRegression::params()
        .fit_intercept(false)
        .fit(&dataset)
        .unwrap();
    assert_eq!(model.intercept(), 0.);
    // Least squares slope through the origin: sum(xy) / sum(x^2)
    assert_abs_diff_eq!(model.coefficients()[0], 49. / 21., epsilon = 1e-10);
}

#[test]
fn test_collinear_features_yield_minimum_norm_solution() {
    let dataset = Dataset::from_rows(
        &[vec![1., 1.], vec![2., 2.], vec![3., 3.]],
        vec![1., 2., 3.],
    )
    .unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();

    assert_array_all_close(model.coefficients(), array![0.5, 0.5].view(), 1e-9);
    assert_abs_diff_eq!(model.intercept(), 0., epsilon = 1e-9);
}

#[test]
fn test_single_sample_predicts_its_target() {
    let dataset = Dataset::from_rows(&[vec![4., 2.]], vec![7.]).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();
    assert_array_all_close(model.coefficients(), Array1::zeros(2).view(), 1e-12);
    assert_abs_diff_eq!(model.intercept(), 7., epsilon = 1e-12);
}

#[test]
fn test_residuals_orthogonal_to_features() {
    let (X, y) = generate_random_data(50, 4);
    let dataset = Dataset::new(X.clone(), y.clone()).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();

    let r = &y - &model.predict(X.view()).unwrap();
    assert_abs_diff_eq!(r.sum(), 0., epsilon = 1e-8);
    let Xr = X.t().dot(&r);
    assert_array_all_close(Xr.view(), Array1::zeros(4).view(), 1e-8);
}

#[test]
fn test_fit_is_deterministic() {
    let (X, y) = generate_random_data(30, 3);
    let dataset = Dataset::new(X, y).unwrap();
    let first = LinearRegression::params().fit(&dataset).unwrap();
    let second = LinearRegression::params().fit(&dataset).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_f32_fit() {
    let dataset =
        DatasetBase::<f32>::from_rows(&[vec![1.], vec![2.], vec![3.]], vec![1., 3., 5.]).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();
    assert_abs_diff_eq!(model.coefficients()[0], 2f32, epsilon = 1e-5);
    assert_abs_diff_eq!(model.intercept(), -1f32, epsilon = 1e-5);
}

#[test]
fn test_predict_rejects_wrong_width() {
    let dataset = Dataset::from_rows(&[vec![1.], vec![2.]], vec![1., 2.]).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();
    let err = model.predict(array![[1., 2.]].view()).unwrap_err();
    assert_eq!(
        err,
        EstimatorError::DimensionMismatch {
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn test_invalid_rcond() {
    let params = LinearRegressionParams::<f64>::new().rcond(-1.);
    assert_eq!(
        params.check_ref().unwrap_err(),
        EstimatorError::InvalidTolerance(-1.)
    );

    let dataset = Dataset::from_rows(&[vec![1.], vec![2.]], vec![1., 2.]).unwrap();
    let res: Result<_, EstimatorError> = LinearRegressionParams::new().rcond(f64::NAN).fit(&dataset);
    assert!(res.is_err());
}

#[test]
fn test_score_of_constant_target() {
    let dataset = Dataset::from_rows(&[vec![1.], vec![2.], vec![3.]], vec![5., 5., 5.]).unwrap();
    let model = LinearRegression::params().fit(&dataset).unwrap();
    assert_eq!(model.score(&dataset).unwrap(), 1.);
}

#[test]
fn test_r2_score() {
    let y = array![1., 2., 3., 4.];
    assert_abs_diff_eq!(r2_score(y.view(), y.view()).unwrap(), 1.);
    // Predicting the mean explains nothing.
    let mean = Array1::from_elem(4, 2.5);
    assert_abs_diff_eq!(r2_score(y.view(), mean.view()).unwrap(), 0.);
    assert_eq!(
        r2_score(y.view(), array![1., 2.].view()).unwrap_err(),
        EstimatorError::DimensionMismatch {
            expected: 4,
            found: 2
        }
    );
}
