// src/dataset.rs

//! In-memory numeric table with named columns.

use crate::error::PcaError;
use ndarray::{Array2, Axis};
use std::collections::HashMap;

/// An N×M table of `f64` samples (rows) and named variables (columns).
///
/// The table is never modified by the PCA code; it only reads columns out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    index: HashMap<String, usize>,
    data: Array2<f64>,
}

impl Dataset {
    /// Wraps `data` with one name per column.
    ///
    /// # Errors
    /// `DimensionMismatch` if `names.len() != data.ncols()`, `DuplicateColumn`
    /// if a name repeats.
    pub fn new<S: Into<String>>(names: Vec<S>, data: Array2<f64>) -> Result<Self, PcaError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != data.ncols() {
            return Err(PcaError::DimensionMismatch {
                expected: data.ncols(),
                actual: names.len(),
            });
        }
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(PcaError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self { names, index, data })
    }

    /// Builds a table from `(name, values)` columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self, PcaError> {
        let n_rows = columns.first().map_or(0, |(_, values)| values.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Array2::<f64>::zeros((n_rows, columns.len()));
        for (j, (name, values)) in columns.into_iter().enumerate() {
            if values.len() != n_rows {
                return Err(PcaError::DimensionMismatch {
                    expected: n_rows,
                    actual: values.len(),
                });
            }
            for (i, v) in values.into_iter().enumerate() {
                data[[i, j]] = v;
            }
            names.push(name);
        }
        Self::new(names, data)
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.data.ncols()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Full N×M matrix.
    pub fn values(&self) -> &Array2<f64> {
        &self.data
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Result<usize, PcaError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| PcaError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Copies the named columns, in the order given, into an N×K matrix.
    ///
    /// # Errors
    /// `ColumnNotFound` for the first unknown name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f64>, PcaError> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.data.select(Axis(1), &indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> Dataset {
        Dataset::new(
            vec!["a", "b", "c"],
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn select_keeps_requested_order() {
        let selected = table().select(&["c", "a"]).unwrap();
        assert_eq!(selected, array![[3.0, 1.0], [6.0, 4.0]]);
    }

    #[test]
    fn select_unknown_column_fails() {
        assert_eq!(
            table().select(&["a", "zzz"]).unwrap_err(),
            PcaError::ColumnNotFound { name: "zzz".to_string() }
        );
    }

    #[test]
    fn new_validates_names() {
        let data = array![[1.0, 2.0]];
        assert!(matches!(
            Dataset::new(vec!["x"], data.clone()),
            Err(PcaError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(
            Dataset::new(vec!["x", "x"], data).unwrap_err(),
            PcaError::DuplicateColumn { name: "x".to_string() }
        );
    }

    #[test]
    fn from_columns_builds_matrix() {
        let ds = Dataset::from_columns(vec![
            ("height", vec![1.5, 1.7, 1.8]),
            ("weight", vec![50.0, 65.0, 80.0]),
        ])
        .unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_variables(), 2);
        assert_eq!(ds.column_names(), &["height".to_string(), "weight".to_string()]);
        assert_eq!(ds.values()[[2, 1]], 80.0);
        assert_eq!(ds.column_index("weight").unwrap(), 1);
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let err = Dataset::from_columns(vec![("a", vec![1.0, 2.0]), ("b", vec![1.0])]).unwrap_err();
        assert_eq!(err, PcaError::DimensionMismatch { expected: 2, actual: 1 });
    }
}
