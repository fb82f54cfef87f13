// src/covariance.rs

use crate::transforms::center;
use log::warn;
use ndarray::{Array2, ArrayView2};

/// Unbiased sample covariance of the columns of `data`.
///
/// `data` is centered here, then `(Xᶜᵀ · Xᶜ) / (n_samples - 1)` is returned
/// as an `n_features × n_features` symmetric matrix.
///
/// With a single sample the divisor is zero and the result is NaN. With no
/// samples the product is empty and the result is a matrix of zeros. Neither
/// case is special-cased beyond a warning; callers that must avoid them
/// should check `data.nrows() >= 2` first.
pub fn covariance_matrix(data: ArrayView2<f64>) -> Array2<f64> {
    let n_samples = data.nrows();
    match n_samples {
        0 => warn!("Covariance of an empty matrix; returning zeros."),
        1 => warn!("Covariance of a single sample divides by zero; result is not finite."),
        _ => {}
    }
    let centered = center(data);
    let cross = centered.t().dot(&centered);
    // Blocked matrix products may round the two triangles differently.
    let mut cov_matrix = (&cross + &cross.t()) * 0.5;
    cov_matrix /= n_samples as f64 - 1.0;
    cov_matrix
}
