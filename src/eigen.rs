// src/eigen.rs

//! Eigen-decomposition of a covariance matrix, ordered by descending
//! eigenvalue, plus the variance bookkeeping derived from it.

use crate::error::PcaError;
use crate::linalg_backends::{BackendEigh, EighOutput};
use float_cmp::approx_eq;
use log::{trace, warn};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// Eigenpairs sorted from largest to smallest eigenvalue.
///
/// `eigenvectors.column(i)` belongs to `eigenvalues[i]`.
#[derive(Debug, Clone)]
pub struct SortedEigen {
    pub eigenvalues: Array1<f64>,
    pub eigenvectors: Array2<f64>,
}

/// Permutation that sorts `eigenvalues` in descending order.
///
/// The sort is stable, so equal eigenvalues keep their original relative
/// order. NaNs compare equal to everything.
pub fn descending_order(eigenvalues: ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Applies one permutation to both the eigenvalues and the eigenvector columns.
pub fn reorder_eigenpairs(output: &EighOutput, order: &[usize]) -> Result<SortedEigen, PcaError> {
    let k = output.eigenvalues.len();
    if order.len() != k || output.eigenvectors.ncols() != k {
        return Err(PcaError::DimensionMismatch {
            expected: k,
            actual: order.len().min(output.eigenvectors.ncols()),
        });
    }
    if let Some(&bad) = order.iter().find(|&&i| i >= k) {
        return Err(PcaError::ComponentOutOfRange {
            index: bad,
            available: k,
        });
    }
    Ok(SortedEigen {
        eigenvalues: output.eigenvalues.select(Axis(0), order),
        eigenvectors: output.eigenvectors.select(Axis(1), order),
    })
}

/// Decomposes a symmetric covariance matrix and sorts the result.
///
/// Small negative eigenvalues produced by rounding are kept as they are.
pub fn decompose<B: BackendEigh>(
    backend: &B,
    covariance: &Array2<f64>,
) -> Result<SortedEigen, PcaError> {
    let raw = backend.eigh_upper(covariance)?;
    let order = descending_order(raw.eigenvalues.view());
    trace!("Eigenvalue sort permutation: {:?}", order);
    reorder_eigenpairs(&raw, &order)
}

/// `eigenvalue[i] / sum(eigenvalues)` for every component.
pub fn proportion_of_variance(eigenvalues: ArrayView1<f64>) -> Array1<f64> {
    let total = eigenvalues.sum();
    if approx_eq!(f64, total, 0.0, ulps = 2) {
        warn!("Total variance is zero; proportion of variance is not finite.");
    }
    eigenvalues.mapv(|v| v / total)
}

/// Running sum of the proportions, `cum[i] = prop[0] + ... + prop[i]`.
pub fn cumulative_variance(prop_var: ArrayView1<f64>) -> Array1<f64> {
    let mut running = 0.0;
    prop_var
        .iter()
        .map(|&p| {
            running += p;
            running
        })
        .collect()
}
