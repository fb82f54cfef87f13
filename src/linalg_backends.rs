// src/linalg_backends.rs

use crate::error::PcaError;
use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh as NdLinalgEigh, UPLO};

/// Output of a symmetric eigendecomposition.
#[derive(Debug, Clone)]
pub struct EighOutput {
    /// Eigenvalues in whatever order the solver produced them
    /// (ascending for LAPACK).
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
}

/// Symmetric eigendecomposition (similar to LAPACK's DSYEVD).
/// Implementers may assume `matrix` is symmetric and read only its upper triangle.
pub trait BackendEigh {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError>;
}

/// `ndarray-linalg` backend. Which LAPACK it links against is chosen with the
/// `backend_*` Cargo features.
#[derive(Debug, Default, Copy, Clone)]
pub struct NdarrayLinAlgBackend;

impl BackendEigh for NdarrayLinAlgBackend {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError> {
        if matrix.nrows() != matrix.ncols() {
            return Err(PcaError::Decomposition(format!(
                "matrix must be square, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.is_empty() {
            return Ok(EighOutput {
                eigenvalues: Array1::zeros(0),
                eigenvectors: Array2::zeros((0, 0)),
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(PcaError::Decomposition(
                "matrix contains NaN or infinite entries".to_string(),
            ));
        }
        let (eigenvalues, eigenvectors) = matrix
            .eigh(UPLO::Upper)
            .map_err(|e| PcaError::Decomposition(e.to_string()))?;
        Ok(EighOutput {
            eigenvalues,
            eigenvectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn eigh_satisfies_eigen_equation() {
        let m = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 1.0]];
        let out = NdarrayLinAlgBackend.eigh_upper(&m).unwrap();
        for (i, &lambda) in out.eigenvalues.iter().enumerate() {
            let v = out.eigenvectors.column(i);
            assert_abs_diff_eq!(m.dot(&v), &v * lambda, epsilon = 1e-10);
        }
    }

    #[test]
    fn eigh_rejects_non_square() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            NdarrayLinAlgBackend.eigh_upper(&m),
            Err(PcaError::Decomposition(_))
        ));
    }

    #[test]
    fn eigh_rejects_non_finite() {
        let m = array![[1.0, f64::NAN], [f64::NAN, 1.0]];
        assert!(NdarrayLinAlgBackend.eigh_upper(&m).is_err());
    }

    #[test]
    fn eigh_of_empty_matrix_is_empty() {
        let out = NdarrayLinAlgBackend.eigh_upper(&Array2::zeros((0, 0))).unwrap();
        assert!(out.eigenvalues.is_empty());
        assert_eq!(out.eigenvectors.dim(), (0, 0));
    }
}
