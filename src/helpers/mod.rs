
/// This module contains the grid helpers used to sample a fitted model over
/// the range covered by the training data.
pub mod grid {
    use crate::Float;
    use ndarray::{Array1, Array2, ArrayView1};
    use ndarray_stats::QuantileExt;

    /// Returns `num` evenly spaced samples over `[start, stop]`. Both end points
    /// are included; a single sample is `start`.
    pub fn linspace<F: Float>(start: F, stop: F, num: usize) -> Array1<F> {
        match num {
            0 => Array1::zeros(0),
            1 => Array1::from_elem(1, start),
            _ => {
                let step = (stop - start) / F::cast(num - 1);
                let mut samples = Array1::from_shape_fn(num, |i| start + step * F::cast(i));
                // Pin the last sample so it does not drift from `stop`.
                samples[num - 1] = stop;
                samples
            }
        }
    }

    /// Coordinate matrices from coordinate vectors with Cartesian ("xy")
    /// indexing: both outputs have shape `(ys.len(), xs.len())`, the first
    /// repeats `xs` along rows and the second repeats `ys` along columns.
    pub fn meshgrid<F: Float>(xs: ArrayView1<F>, ys: ArrayView1<F>) -> (Array2<F>, Array2<F>) {
        let shape = (ys.len(), xs.len());
        let xx = Array2::from_shape_fn(shape, |(_, j)| xs[j]);
        let yy = Array2::from_shape_fn(shape, |(i, _)| ys[i]);
        (xx, yy)
    }

    /// Returns the `(min, max)` pair of a non-empty slice of comparable
    /// values, or `None` when the slice is empty or holds a NaN.
    pub fn min_max<F: Float>(values: ArrayView1<F>) -> Option<(F, F)> {
        let min = *values.min().ok()?;
        let max = *values.max().ok()?;
        Some((min, max))
    }
}

/// This module contains helpers functions to efficiently write tests.
pub mod test_helpers {
    use crate::Float;
    use approx::AbsDiffEq;
    use ndarray::prelude::*;
    use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    pub fn assert_array_all_close<F>(x: ArrayView1<F>, y: ArrayView1<F>, delta: F)
    where
        F: Float + AbsDiffEq<Epsilon = F>,
    {
        assert_eq!(x.len(), y.len());
        for i in 0..x.len() {
            if x[i].abs_diff_ne(&y[i], delta) {
                panic!("x: {}, y: {} ; with precision level {}", x[i], y[i], delta);
            }
        }
    }

    pub fn assert_array2d_all_close<F>(x: ArrayView2<F>, y: ArrayView2<F>, delta: F)
    where
        F: Float + AbsDiffEq<Epsilon = F>,
    {
        assert_eq!(x.dim(), y.dim());
        for ((i, j), &xij) in x.indexed_iter() {
            if xij.abs_diff_ne(&y[[i, j]], delta) {
                panic!(
                    "x: {}, y: {} at ({}, {}) ; with precision level {}",
                    xij,
                    y[[i, j]],
                    i,
                    j,
                    delta
                );
            }
        }
    }

    pub fn fill_random_vector(capacity: usize) -> Vec<f64> {
        let mut r = StdRng::seed_from_u64(42);
        let normal = Normal::new(0., 1.).unwrap();

        let mut data_x: Vec<f64> = Vec::with_capacity(capacity);
        for _ in 0..data_x.capacity() {
            data_x.push(normal.sample(&mut r));
        }
        data_x
    }

    pub fn generate_random_data(n_samples: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
        let data_x = fill_random_vector(n_samples * n_features);
        let data_w = fill_random_vector(n_features);
        let data_e = fill_random_vector(n_samples);
        let X = Array2::from_shape_vec((n_samples, n_features).f(), data_x).unwrap();
        let true_w = Array1::from_shape_vec(n_features, data_w).unwrap();
        let noise = Array1::from_shape_vec(n_samples, data_e).unwrap();
        let y = X.dot(&true_w) + noise;

        (X, y)
    }

    /// Same as [`generate_random_data`] but returns nested rows, the shape of
    /// the `X` field of a request body.
    pub fn generate_random_rows(n_samples: usize, n_features: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let (X, y) = generate_random_data(n_samples, n_features);
        let rows = X.rows().into_iter().map(|row| row.to_vec()).collect();
        (rows, y.to_vec())
    }
}
