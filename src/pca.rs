// src/pca.rs

//! Covariance-based PCA over named dataset variables.
//!
//! [`PcaModel::fit`] selects variables, optionally min-max normalizes them,
//! and eigen-decomposes their covariance matrix. The fitted model is an
//! immutable value; projections ([`Projection`]) and reconstructions are
//! computed from explicit references to it. [`PcaSession`] wraps the same
//! operations for callers who want a fit-then-project workflow on one object.

use crate::covariance::covariance_matrix;
use crate::dataset::Dataset;
use crate::eigen::{cumulative_variance, decompose, proportion_of_variance};
use crate::error::PcaError;
use crate::linalg_backends::{BackendEigh, NdarrayLinAlgBackend};
use crate::plotting::{ElbowPlot, LoadingPlot};
use crate::transforms::{column_stats, denormalize, normalize};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Runtime options for [`PcaModel::fit`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcaOptions {
    /// Min-max normalize each selected variable to [0, 1] before the covariance step.
    pub normalize: bool,
}

/// What is needed to undo the preprocessing of the selected matrix.
///
/// `mins` and `maxs` always describe the selected data in original units.
/// `means` are the column means of the matrix PCA actually ran on: the
/// original data when `normalized` is false, the normalized data otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizationState {
    normalized: bool,
    mins: Array1<f64>,
    maxs: Array1<f64>,
    means: Array1<f64>,
}

impl NormalizationState {
    /// Records min/max/mean of `selected`, then normalizes it if asked and
    /// replaces the means with those of the normalized matrix.
    ///
    /// Returns the state together with the matrix PCA should run on.
    pub fn capture(selected: Array2<f64>, normalize_data: bool) -> Result<(Self, Array2<f64>), PcaError> {
        let stats = column_stats(selected.view())?;
        if !normalize_data {
            let state = Self {
                normalized: false,
                mins: stats.mins,
                maxs: stats.maxs,
                means: stats.means,
            };
            return Ok((state, selected));
        }
        let normalized = normalize(selected.view());
        let means = normalized
            .mean_axis(Axis(0))
            .ok_or(PcaError::InsufficientSamples {
                min_required: 1,
                actual: 0,
            })?;
        let state = Self {
            normalized: true,
            mins: stats.mins,
            maxs: stats.maxs,
            means,
        };
        Ok((state, normalized))
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn mins(&self) -> &Array1<f64> {
        &self.mins
    }

    pub fn maxs(&self) -> &Array1<f64> {
        &self.maxs
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    /// Maps new data in original units into the space PCA ran in and
    /// centers it there.
    pub fn apply(&self, data: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
        if data.ncols() != self.means.len() {
            return Err(PcaError::DimensionMismatch {
                expected: self.means.len(),
                actual: data.ncols(),
            });
        }
        let scaled = if self.normalized {
            let ranges = &self.maxs - &self.mins;
            (&data - &self.mins) / &ranges
        } else {
            data.to_owned()
        };
        Ok(scaled - &self.means)
    }

    /// Inverse of [`apply`](Self::apply): adds the means back and, for a
    /// normalized model, rescales by `maxs - mins` and shifts by `mins`.
    ///
    /// For a normalized model this is
    /// `(centered + means) * (maxs - mins) + mins`.
    pub fn invert(&self, centered: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
        if centered.ncols() != self.means.len() {
            return Err(PcaError::DimensionMismatch {
                expected: self.means.len(),
                actual: centered.ncols(),
            });
        }
        let uncentered = &centered + &self.means;
        if self.normalized {
            denormalize(uncentered.view(), self.mins.view(), self.maxs.view())
        } else {
            Ok(uncentered)
        }
    }
}

/// Data projected onto a chosen set of principal components.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Projection {
    components: Vec<usize>,
    /// K×P, column `j` is eigenvector `components[j]`.
    p_mat: Array2<f64>,
    /// N×P coordinates in PC space.
    projected: Array2<f64>,
}

impl Projection {
    /// PC indices in the order they were requested.
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    pub fn projection_matrix(&self) -> &Array2<f64> {
        &self.p_mat
    }

    pub fn projected(&self) -> &Array2<f64> {
        &self.projected
    }

    pub fn into_projected(self) -> Array2<f64> {
        self.projected
    }
}

/// A fitted PCA: the selected data, its preprocessing state, and the
/// eigenpairs of its covariance matrix sorted by descending eigenvalue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PcaModel {
    variables: Vec<String>,
    /// N×K matrix PCA ran on (normalized when `normalization.normalized`).
    selected: Array2<f64>,
    normalization: NormalizationState,
    eigenvalues: Array1<f64>,
    /// K×K, column `i` pairs with `eigenvalues[i]`.
    eigenvectors: Array2<f64>,
    prop_var: Array1<f64>,
    cum_var: Array1<f64>,
}

/// Fits a PCA with the default LAPACK backend. Shorthand for [`PcaModel::fit`].
pub fn pca<S: AsRef<str>>(dataset: &Dataset, variables: &[S], normalize_data: bool) -> Result<PcaModel, PcaError> {
    PcaModel::fit(dataset, variables, PcaOptions { normalize: normalize_data })
}

impl PcaModel {
    /// Runs PCA on the named `variables` of `dataset`.
    ///
    /// Steps: select the columns (in the given order), record their min, max
    /// and mean, normalize if requested (means are then recomputed on the
    /// normalized data), compute the covariance matrix, eigen-decompose it
    /// and sort the eigenpairs from largest to smallest eigenvalue, and
    /// derive the proportion and cumulative variance. No projection is made.
    ///
    /// # Errors
    /// - `EmptySelection` if `variables` is empty.
    /// - `ColumnNotFound` for a name that is not in `dataset`.
    /// - `InsufficientSamples` if the dataset has fewer than 2 rows.
    /// - `Decomposition` if the covariance matrix is not finite (for example
    ///   a constant column with `normalize` on) or the solver fails.
    pub fn fit<S: AsRef<str>>(dataset: &Dataset, variables: &[S], options: PcaOptions) -> Result<Self, PcaError> {
        Self::fit_with_backend(&NdarrayLinAlgBackend, dataset, variables, options)
    }

    /// Same as [`fit`](Self::fit) with an explicit eigen solver.
    pub fn fit_with_backend<B: BackendEigh, S: AsRef<str>>(
        backend: &B,
        dataset: &Dataset,
        variables: &[S],
        options: PcaOptions,
    ) -> Result<Self, PcaError> {
        if variables.is_empty() {
            return Err(PcaError::EmptySelection);
        }
        let selected = dataset.select(variables)?;
        let n_samples = selected.nrows();
        if n_samples < 2 {
            return Err(PcaError::InsufficientSamples {
                min_required: 2,
                actual: n_samples,
            });
        }

        let (normalization, selected) = NormalizationState::capture(selected, options.normalize)?;

        let cov_matrix = covariance_matrix(selected.view());
        debug!("Covariance matrix shape: {:?}", cov_matrix.dim());

        let sorted = decompose(backend, &cov_matrix)?;
        let prop_var = proportion_of_variance(sorted.eigenvalues.view());
        let cum_var = cumulative_variance(prop_var.view());

        info!(
            "Fitted PCA on {} variable(s) x {} sample(s) (normalized: {}); PC1 explains {:.4} of the variance.",
            selected.ncols(),
            n_samples,
            options.normalize,
            prop_var.get(0).copied().unwrap_or(f64::NAN)
        );

        Ok(Self {
            variables: variables.iter().map(|v| v.as_ref().to_string()).collect(),
            selected,
            normalization,
            eigenvalues: sorted.eigenvalues,
            eigenvectors: sorted.eigenvectors,
            prop_var,
            cum_var,
        })
    }

    /// Names of the selected variables, in column order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of selected variables (and of principal components).
    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    /// The N×K matrix PCA ran on, normalized if the model is normalized.
    pub fn selected(&self) -> &Array2<f64> {
        &self.selected
    }

    pub fn normalization(&self) -> &NormalizationState {
        &self.normalization
    }

    /// Eigenvalues, largest first. Tiny negative values from rounding are kept.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Eigenvectors as columns, in the same order as [`eigenvalues`](Self::eigenvalues).
    pub fn eigenvectors(&self) -> &Array2<f64> {
        &self.eigenvectors
    }

    pub fn prop_var(&self) -> &Array1<f64> {
        &self.prop_var
    }

    pub fn cum_var(&self) -> &Array1<f64> {
        &self.cum_var
    }

    fn check_components(&self, pcs_to_keep: &[usize]) -> Result<(), PcaError> {
        if pcs_to_keep.is_empty() {
            return Err(PcaError::EmptySelection);
        }
        let available = self.n_components();
        let mut seen = vec![false; available];
        for &pc in pcs_to_keep {
            if pc >= available {
                return Err(PcaError::ComponentOutOfRange { index: pc, available });
            }
            if seen[pc] {
                return Err(PcaError::DuplicateComponent { index: pc });
            }
            seen[pc] = true;
        }
        Ok(())
    }

    /// Projects the centered selected data onto the PCs in `pcs_to_keep`.
    ///
    /// Indices are zero-based, need not be contiguous, and are used in the
    /// order given: `[0, 2]` yields the scores on the 1st and 3rd PCs.
    pub fn project(&self, pcs_to_keep: &[usize]) -> Result<Projection, PcaError> {
        self.check_components(pcs_to_keep)?;
        let p_mat = self.eigenvectors.select(Axis(1), pcs_to_keep);
        let centered = &self.selected - &self.normalization.means;
        let projected = centered.dot(&p_mat);
        debug!("Projected data onto PCs {:?}: shape {:?}", pcs_to_keep, projected.dim());
        Ok(Projection {
            components: pcs_to_keep.to_vec(),
            p_mat,
            projected,
        })
    }

    /// Maps a projection back to the original variables in original units.
    pub fn reconstruct(&self, projection: &Projection) -> Result<Array2<f64>, PcaError> {
        if projection.p_mat.nrows() != self.n_components() {
            return Err(PcaError::DimensionMismatch {
                expected: self.n_components(),
                actual: projection.p_mat.nrows(),
            });
        }
        let centered = projection.projected.dot(&projection.p_mat.t());
        self.normalization.invert(centered.view())
    }

    /// Projects onto the first `top_k` PCs and back into original units.
    ///
    /// Exact (up to rounding) for `top_k == n_components()`, lossy below.
    pub fn project_back(&self, top_k: usize) -> Result<Array2<f64>, PcaError> {
        let projection = self.project(&self.top_components(top_k)?)?;
        self.reconstruct(&projection)
    }

    fn top_components(&self, top_k: usize) -> Result<Vec<usize>, PcaError> {
        let available = self.n_components();
        if top_k == 0 || top_k > available {
            return Err(PcaError::ComponentOutOfRange {
                index: top_k,
                available,
            });
        }
        Ok((0..top_k).collect())
    }

    /// The selected variables in original units.
    fn original_selected(&self) -> Result<Array2<f64>, PcaError> {
        if self.normalization.normalized {
            denormalize(
                self.selected.view(),
                self.normalization.mins.view(),
                self.normalization.maxs.view(),
            )
        } else {
            Ok(self.selected.clone())
        }
    }

    /// Sum of squared residuals between the selected variables and
    /// [`project_back(top_k)`](Self::project_back), both in original units.
    ///
    /// Non-increasing in `top_k`; zero (up to rounding) at `n_components()`.
    pub fn reconstruction_error(&self, top_k: usize) -> Result<f64, PcaError> {
        let approx = self.project_back(top_k)?;
        let original = self.original_selected()?;
        Ok((&original - &approx).mapv(|r| r * r).sum())
    }

    /// Projects new samples, given in original units with the model's
    /// variables as columns, onto the PCs in `pcs_to_keep`.
    pub fn transform(&self, data: ArrayView2<f64>, pcs_to_keep: &[usize]) -> Result<Array2<f64>, PcaError> {
        self.check_components(pcs_to_keep)?;
        let centered = self.normalization.apply(data)?;
        let p_mat = self.eigenvectors.select(Axis(1), pcs_to_keep);
        Ok(centered.dot(&p_mat))
    }

    /// Elbow-plot data for the first `num_pcs_to_keep` PCs (all for `None`).
    pub fn elbow_plot(&self, num_pcs_to_keep: Option<usize>) -> Result<ElbowPlot, PcaError> {
        ElbowPlot::new(self.cum_var.view(), num_pcs_to_keep)
    }

    /// Loading-plot data for the top two PCs. Needs at least two variables.
    pub fn loading_plot(&self) -> Result<LoadingPlot, PcaError> {
        LoadingPlot::new(&self.variables, self.eigenvectors.view())
    }

    /// Saves the fitted model to `path` with bincode.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), PcaError> {
        let file = File::create(path.as_ref())
            .map_err(|e| PcaError::Io(format!("Failed to create file at {:?}: {}", path.as_ref(), e)))?;
        let mut writer = BufWriter::new(file);
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())
            .map_err(|e| PcaError::Serialization(format!("Failed to serialize PCA model: {}", e)))?;
        Ok(())
    }

    /// Loads a model written by [`save_model`](Self::save_model) and checks
    /// that its parts agree on the number of variables.
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, PcaError> {
        let file = File::open(path.as_ref())
            .map_err(|e| PcaError::Io(format!("Failed to open file at {:?}: {}", path.as_ref(), e)))?;
        let mut reader = BufReader::new(file);
        let model: PcaModel = bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
            .map_err(|e| PcaError::Serialization(format!("Failed to deserialize PCA model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), PcaError> {
        let k = self.variables.len();
        if k == 0 {
            return Err(PcaError::InvalidModel("model has no variables".to_string()));
        }
        if self.eigenvectors.dim() != (k, k) {
            return Err(PcaError::InvalidModel(format!(
                "eigenvector matrix is {:?}, expected ({}, {})",
                self.eigenvectors.dim(),
                k,
                k
            )));
        }
        let lengths = [
            ("eigenvalues", self.eigenvalues.len()),
            ("prop_var", self.prop_var.len()),
            ("cum_var", self.cum_var.len()),
            ("mins", self.normalization.mins.len()),
            ("maxs", self.normalization.maxs.len()),
            ("means", self.normalization.means.len()),
            ("selected columns", self.selected.ncols()),
        ];
        for (what, len) in lengths {
            if len != k {
                return Err(PcaError::InvalidModel(format!(
                    "{} has length {}, expected {}",
                    what, len, k
                )));
            }
        }
        Ok(())
    }
}

/// Fit-then-project workflow over one dataset.
///
/// Every call to [`pca`](Self::pca) replaces the fitted model and forgets the
/// last projection. Methods that need a model return `PcaError::NotComputed`
/// until `pca` has succeeded.
#[derive(Debug)]
pub struct PcaSession<'a, B: BackendEigh = NdarrayLinAlgBackend> {
    dataset: &'a Dataset,
    backend: B,
    model: Option<PcaModel>,
    projection: Option<Projection>,
}

impl<'a> PcaSession<'a, NdarrayLinAlgBackend> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::with_backend(dataset, NdarrayLinAlgBackend)
    }
}

impl<'a, B: BackendEigh> PcaSession<'a, B> {
    pub fn with_backend(dataset: &'a Dataset, backend: B) -> Self {
        Self {
            dataset,
            backend,
            model: None,
            projection: None,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    /// Fits PCA on `variables`, replacing any previous model.
    pub fn pca<S: AsRef<str>>(&mut self, variables: &[S], normalize_data: bool) -> Result<&PcaModel, PcaError> {
        let model = PcaModel::fit_with_backend(
            &self.backend,
            self.dataset,
            variables,
            PcaOptions { normalize: normalize_data },
        )?;
        self.projection = None;
        let model: &PcaModel = self.model.insert(model);
        Ok(model)
    }

    /// The current model.
    pub fn model(&self) -> Result<&PcaModel, PcaError> {
        self.model.as_ref().ok_or(PcaError::NotComputed)
    }

    /// The last projection made by `pca_project` or `pca_then_project_back`.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn prop_var(&self) -> Result<&Array1<f64>, PcaError> {
        Ok(self.model()?.prop_var())
    }

    pub fn cum_var(&self) -> Result<&Array1<f64>, PcaError> {
        Ok(self.model()?.cum_var())
    }

    pub fn eigenvalues(&self) -> Result<&Array1<f64>, PcaError> {
        Ok(self.model()?.eigenvalues())
    }

    pub fn eigenvectors(&self) -> Result<&Array2<f64>, PcaError> {
        Ok(self.model()?.eigenvectors())
    }

    /// Projects onto `pcs_to_keep` and keeps the projection for later use.
    pub fn pca_project(&mut self, pcs_to_keep: &[usize]) -> Result<&Array2<f64>, PcaError> {
        let projection = self.model()?.project(pcs_to_keep)?;
        Ok(self.projection.insert(projection).projected())
    }

    /// Projects onto the top `top_k` PCs, keeps that projection, and returns
    /// the data mapped back into original units.
    pub fn pca_then_project_back(&mut self, top_k: usize) -> Result<Array2<f64>, PcaError> {
        let model = self.model.as_ref().ok_or(PcaError::NotComputed)?;
        let projection = model.project(&model.top_components(top_k)?)?;
        let reconstructed = model.reconstruct(&projection)?;
        self.projection = Some(projection);
        Ok(reconstructed)
    }

    pub fn elbow_plot(&self, num_pcs_to_keep: Option<usize>) -> Result<ElbowPlot, PcaError> {
        self.model()?.elbow_plot(num_pcs_to_keep)
    }

    pub fn loading_plot(&self) -> Result<LoadingPlot, PcaError> {
        self.model()?.loading_plot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> PcaModel {
        let data = Dataset::new(vec!["a", "b"], array![[1.0, 0.5], [2.0, 2.5], [4.0, 1.0]]).unwrap();
        PcaModel::fit(&data, &["a", "b"], PcaOptions::default()).unwrap()
    }

    #[test]
    fn fitted_model_is_consistent() {
        assert!(model().validate().is_ok());
    }

    #[test]
    fn validate_catches_mismatched_parts() {
        let mut m = model();
        m.cum_var = Array1::zeros(3);
        assert!(matches!(m.validate(), Err(PcaError::InvalidModel(_))));

        let mut m = model();
        m.eigenvectors = Array2::zeros((2, 1));
        assert!(matches!(m.validate(), Err(PcaError::InvalidModel(_))));

        let mut m = model();
        m.variables.clear();
        assert!(m.validate().is_err());
    }
}
