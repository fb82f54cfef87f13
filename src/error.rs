// src/error.rs

use std::error::Error;
use std::fmt;

/// Errors produced while fitting, projecting, persisting, or plotting a PCA.
#[derive(Debug, Clone, PartialEq)]
pub enum PcaError {
    /// A session method that needs a fitted model was called before `pca`.
    NotComputed,
    /// A requested variable is not a column of the dataset.
    ColumnNotFound { name: String },
    /// The same column name was given twice when building a dataset.
    DuplicateColumn { name: String },
    /// No variables were selected.
    EmptySelection,
    /// Not enough samples for an unbiased covariance estimate.
    InsufficientSamples { min_required: usize, actual: usize },
    /// Array shapes do not line up.
    DimensionMismatch { expected: usize, actual: usize },
    /// A principal component index (or count) outside `[0, available)`.
    ComponentOutOfRange { index: usize, available: usize },
    /// The same principal component was requested twice in one projection.
    DuplicateComponent { index: usize },
    /// Rotation axis name other than x, y or z.
    UnknownAxis(String),
    /// The eigen solver failed.
    Decomposition(String),
    /// A loaded model is internally inconsistent.
    InvalidModel(String),
    /// File I/O failed.
    Io(String),
    /// Model (de)serialization failed.
    Serialization(String),
}

impl fmt::Display for PcaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotComputed => write!(f, "PCA not yet computed"),
            Self::ColumnNotFound { name } => write!(f, "column '{}' not found", name),
            Self::DuplicateColumn { name } => write!(f, "column '{}' appears more than once", name),
            Self::EmptySelection => write!(f, "at least one variable must be selected"),
            Self::InsufficientSamples {
                min_required,
                actual,
            } => write!(f, "need at least {} samples, got {}", min_required, actual),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "expected {} elements, got {}", expected, actual)
            }
            Self::ComponentOutOfRange { index, available } => write!(
                f,
                "principal component {} out of range ({} available)",
                index, available
            ),
            Self::DuplicateComponent { index } => {
                write!(f, "principal component {} requested more than once", index)
            }
            Self::UnknownAxis(axis) => {
                write!(f, "unknown rotation axis '{}', expected x, y or z", axis)
            }
            Self::Decomposition(msg) => write!(f, "eigen decomposition failed: {}", msg),
            Self::InvalidModel(msg) => write!(f, "invalid PCA model: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl Error for PcaError {}

impl From<std::io::Error> for PcaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
