// Principal component analysis (PCA) of named tabular variables

//! Covariance-matrix PCA over the named columns of an in-memory table.
//!
//! The pipeline selects variables from a [`Dataset`], optionally min-max
//! normalizes them, eigen-decomposes their sample covariance matrix, and
//! sorts the eigenpairs from largest to smallest eigenvalue. The resulting
//! [`PcaModel`] projects the data onto any subset of principal components,
//! reconstructs it back into original units, and produces elbow and loading
//! plot data for a [`PlotRenderer`].
//!
//! ```no_run
//! use covariance_pca::{Dataset, PcaSession};
//! use ndarray::array;
//!
//! let data = Dataset::new(
//!     vec!["sepal", "petal", "stem"],
//!     array![[5.1, 1.4, 0.2], [4.9, 1.5, 0.1], [6.2, 4.5, 1.5], [5.9, 5.1, 1.8]],
//! ).unwrap();
//!
//! let mut session = PcaSession::new(&data);
//! session.pca(&["sepal", "petal", "stem"], true).unwrap();
//! let scores = session.pca_project(&[0, 1]).unwrap().clone();
//! let approx = session.pca_then_project_back(2).unwrap();
//! let elbow = session.elbow_plot(None).unwrap();
//! # let _ = (scores, approx, elbow);
//! ```

pub mod covariance;
pub mod dataset;
pub mod eigen;
pub mod error;
pub mod linalg_backends;
pub mod pca;
pub mod plotting;
pub mod transforms;

pub use covariance::covariance_matrix;
pub use dataset::Dataset;
pub use error::PcaError;
pub use linalg_backends::{BackendEigh, EighOutput, NdarrayLinAlgBackend};
pub use pca::{pca, NormalizationState, PcaModel, PcaOptions, PcaSession, Projection};
pub use plotting::{CsvPlotWriter, ElbowPlot, LoadingPlot, PlotRenderer};
pub use transforms::{center, denormalize, normalize, rotation_matrix_3d, RotationAxis};
