// src/transforms.rs

//! Column-wise transforms used by the PCA pipeline: min-max normalization and
//! its inverse, centering, and 3-D rotation matrices.

use crate::error::PcaError;
use float_cmp::approx_eq;
use log::warn;
use ndarray::{array, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-column minimum, maximum and mean of a matrix.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub mins: Array1<f64>,
    pub maxs: Array1<f64>,
    pub means: Array1<f64>,
}

/// Computes per-column min, max and mean.
///
/// # Errors
/// Returns `InsufficientSamples` if `data` has no rows.
pub fn column_stats(data: ArrayView2<f64>) -> Result<ColumnStats, PcaError> {
    let means = data
        .mean_axis(Axis(0))
        .ok_or(PcaError::InsufficientSamples {
            min_required: 1,
            actual: 0,
        })?;
    let mins = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
    let maxs = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
    Ok(ColumnStats { mins, maxs, means })
}

/// Min-max normalizes every column of `data` to [0, 1].
///
/// A column with zero range divides by zero and comes back as NaN. That is
/// left to the caller; a warning is logged.
pub fn normalize(data: ArrayView2<f64>) -> Array2<f64> {
    let mins = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
    let maxs = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
    let ranges = &maxs - &mins;
    for (col, &range) in ranges.iter().enumerate() {
        if approx_eq!(f64, range, 0.0, ulps = 2) {
            warn!("Column {} has zero range; min-max normalization yields NaN.", col);
        }
    }
    (&data - &mins) / &ranges
}

/// Inverse of [`normalize`]: `data * (maxs - mins) + mins`.
///
/// `mins` and `maxs` must be the statistics of the matrix before it was
/// normalized.
pub fn denormalize(
    data: ArrayView2<f64>,
    mins: ArrayView1<f64>,
    maxs: ArrayView1<f64>,
) -> Result<Array2<f64>, PcaError> {
    if mins.len() != data.ncols() || maxs.len() != data.ncols() {
        return Err(PcaError::DimensionMismatch {
            expected: data.ncols(),
            actual: mins.len().min(maxs.len()),
        });
    }
    let ranges = &maxs - &mins;
    Ok(&data * &ranges + &mins)
}

/// Subtracts each column's mean. A matrix without rows is returned unchanged.
pub fn center(data: ArrayView2<f64>) -> Array2<f64> {
    match data.mean_axis(Axis(0)) {
        Some(means) => &data - &means,
        None => data.to_owned(),
    }
}

/// Coordinate axis for [`rotation_matrix_3d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    /// Legacy parsing: exactly `"x"` and `"z"` map to their axes and every
    /// other string, including `"X"` or `" z "`, falls back to the y axis.
    pub fn parse_lenient(name: &str) -> Self {
        match name {
            "x" => RotationAxis::X,
            "z" => RotationAxis::Z,
            "y" => RotationAxis::Y,
            _ => {
                warn!("Unrecognized rotation axis '{}'; falling back to the y axis.", name);
                RotationAxis::Y
            }
        }
    }
}

impl FromStr for RotationAxis {
    type Err = PcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(RotationAxis::X),
            "y" => Ok(RotationAxis::Y),
            "z" => Ok(RotationAxis::Z),
            _ => Err(PcaError::UnknownAxis(s.to_string())),
        }
    }
}

impl fmt::Display for RotationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationAxis::X => "x",
            RotationAxis::Y => "y",
            RotationAxis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Builds the right-handed 3×3 matrix rotating by `degrees` about `axis`.
///
/// The matrix acts on column vectors (`R · v`); it is only constructed here,
/// see [`rotate`] for applying it to a point cloud.
pub fn rotation_matrix_3d(degrees: f64, axis: RotationAxis) -> Array2<f64> {
    let theta = degrees.to_radians();
    let (s, c) = theta.sin_cos();
    match axis {
        RotationAxis::X => array![[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        RotationAxis::Y => array![[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        RotationAxis::Z => array![[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
    }
}

/// Rotates every row of an N×3 point matrix: `data · Rᵀ`.
pub fn rotate(data: ArrayView2<f64>, rotation: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
    if data.ncols() != 3 {
        return Err(PcaError::DimensionMismatch {
            expected: 3,
            actual: data.ncols(),
        });
    }
    if rotation.dim() != (3, 3) {
        return Err(PcaError::DimensionMismatch {
            expected: 9,
            actual: rotation.len(),
        });
    }
    Ok(data.dot(&rotation.t()))
}
