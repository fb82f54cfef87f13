// src/plotting.rs

//! Plot data for PCA diagnostics and the renderer seam that draws it.
//!
//! This module does no drawing itself. [`ElbowPlot`] and [`LoadingPlot`]
//! carry everything a renderer needs (points, labels, titles, annotations);
//! a [`PlotRenderer`] turns them into pixels, SVG, CSV or anything else.

use crate::error::PcaError;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Write;

/// One marker on the elbow curve.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElbowPoint {
    /// 1-based principal component number.
    pub pc_number: usize,
    pub cumulative_variance: f64,
    /// `"(x, y)"` text placed next to the marker.
    pub annotation: String,
}

/// Cumulative variance against number of retained PCs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElbowPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ElbowPoint>,
}

impl ElbowPlot {
    /// Builds the curve from a cumulative-variance sequence, keeping the first
    /// `num_pcs_to_keep` entries (all of them for `None`).
    pub fn new(cum_var: ArrayView1<f64>, num_pcs_to_keep: Option<usize>) -> Result<Self, PcaError> {
        let available = cum_var.len();
        let shown = num_pcs_to_keep.unwrap_or(available);
        if shown > available {
            return Err(PcaError::ComponentOutOfRange {
                index: shown,
                available,
            });
        }
        let points = cum_var
            .iter()
            .take(shown)
            .enumerate()
            .map(|(i, &y)| ElbowPoint {
                pc_number: i + 1,
                cumulative_variance: y,
                annotation: format!("({}, {:?})", i + 1, round4(y)),
            })
            .collect();
        Ok(Self {
            title: format!("Cumulative Variance for PC's ({})", shown),
            x_label: "PC Number".to_string(),
            y_label: "Cumulative Variance".to_string(),
            points,
        })
    }
}

/// One variable's loading arrow, drawn from the origin to `(pc1, pc2)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadingVector {
    pub variable: String,
    pub pc1: f64,
    pub pc2: f64,
}

/// Loadings of every selected variable on the top two PCs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadingPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub vectors: Vec<LoadingVector>,
}

impl LoadingPlot {
    /// `eigenvectors` is the K×K matrix sorted by descending eigenvalue, one
    /// row per variable in `variables`.
    pub fn new<S: AsRef<str>>(variables: &[S], eigenvectors: ArrayView2<f64>) -> Result<Self, PcaError> {
        if eigenvectors.ncols() < 2 {
            return Err(PcaError::ComponentOutOfRange {
                index: 1,
                available: eigenvectors.ncols(),
            });
        }
        if variables.len() != eigenvectors.nrows() {
            return Err(PcaError::DimensionMismatch {
                expected: eigenvectors.nrows(),
                actual: variables.len(),
            });
        }
        let vectors = variables
            .iter()
            .zip(eigenvectors.rows())
            .map(|(name, row)| LoadingVector {
                variable: name.as_ref().to_string(),
                pc1: row[0],
                pc2: row[1],
            })
            .collect();
        Ok(Self {
            title: "PC1 vs. PC2".to_string(),
            x_label: "PC1".to_string(),
            y_label: "PC2".to_string(),
            vectors,
        })
    }
}

fn round4(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

/// Output collaborator for PCA diagnostics.
pub trait PlotRenderer {
    fn render_elbow(&mut self, plot: &ElbowPlot) -> Result<(), PcaError>;
    fn render_loading(&mut self, plot: &LoadingPlot) -> Result<(), PcaError>;
}

/// Quotes a CSV field (RFC 4180) when it holds a comma, quote or line break.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes plot data as CSV for an external plotting tool.
///
/// Each plot starts with `# title`, `# x_label,y_label` comment lines and a
/// header row. Text fields are quoted when needed.
#[derive(Debug)]
pub struct CsvPlotWriter<W: Write> {
    out: W,
}

impl<W: Write> CsvPlotWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn preamble(&mut self, title: &str, x_label: &str, y_label: &str) -> Result<(), PcaError> {
        writeln!(self.out, "# {}", csv_field(title))?;
        writeln!(self.out, "# {},{}", csv_field(x_label), csv_field(y_label))?;
        Ok(())
    }
}

impl<W: Write> PlotRenderer for CsvPlotWriter<W> {
    fn render_elbow(&mut self, plot: &ElbowPlot) -> Result<(), PcaError> {
        self.preamble(&plot.title, &plot.x_label, &plot.y_label)?;
        writeln!(self.out, "pc_number,cumulative_variance")?;
        for p in &plot.points {
            writeln!(self.out, "{},{}", p.pc_number, p.cumulative_variance)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn render_loading(&mut self, plot: &LoadingPlot) -> Result<(), PcaError> {
        self.preamble(&plot.title, &plot.x_label, &plot.y_label)?;
        writeln!(self.out, "variable,x0,y0,pc1,pc2")?;
        for v in &plot.vectors {
            writeln!(self.out, "{},0,0,{},{}", csv_field(&v.variable), v.pc1, v.pc2)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn elbow_plot_uses_all_pcs_by_default() {
        let cum = array![0.7, 0.95, 1.0];
        let plot = ElbowPlot::new(cum.view(), None).unwrap();
        assert_eq!(plot.title, "Cumulative Variance for PC's (3)");
        assert_eq!(plot.x_label, "PC Number");
        assert_eq!(plot.y_label, "Cumulative Variance");
        let xs: Vec<usize> = plot.points.iter().map(|p| p.pc_number).collect();
        assert_eq!(xs, vec![1, 2, 3]);
        assert_eq!(plot.points[2].annotation, "(3, 1.0)");
    }

    #[test]
    fn elbow_plot_truncates_and_rounds() {
        let cum = array![0.123456, 0.9, 1.0];
        let plot = ElbowPlot::new(cum.view(), Some(2)).unwrap();
        assert_eq!(plot.points.len(), 2);
        assert_eq!(plot.title, "Cumulative Variance for PC's (2)");
        assert_eq!(plot.points[0].annotation, "(1, 0.1235)");
    }

    #[test]
    fn elbow_plot_rejects_too_many_pcs() {
        let cum = array![0.5, 1.0];
        assert_eq!(
            ElbowPlot::new(cum.view(), Some(3)).unwrap_err(),
            PcaError::ComponentOutOfRange { index: 3, available: 2 }
        );
    }

    #[test]
    fn loading_plot_takes_first_two_eigenvector_columns() {
        let vecs = array![[0.1, 1.0, 9.0], [0.3, 2.0, 9.0], [0.5, 3.0, 9.0]];
        let plot = LoadingPlot::new(&["a", "b", "c"], vecs.view()).unwrap();
        assert_eq!(plot.x_label, "PC1");
        assert_eq!(plot.y_label, "PC2");
        assert_eq!(
            plot.vectors[1],
            LoadingVector { variable: "b".to_string(), pc1: 0.3, pc2: 2.0 }
        );
    }

    #[test]
    fn loading_plot_needs_two_components() {
        let vecs = array![[1.0]];
        assert!(LoadingPlot::new(&["only"], vecs.view()).is_err());
    }

    #[test]
    fn csv_writer_emits_rows() {
        let cum = array![0.8, 1.0];
        let elbow = ElbowPlot::new(cum.view(), None).unwrap();
        let loading = LoadingPlot::new(&["u", "v"], array![[0.6, 0.8], [0.8, -0.6]].view()).unwrap();

        let mut writer = CsvPlotWriter::new(Vec::new());
        writer.render_elbow(&elbow).unwrap();
        writer.render_loading(&loading).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Cumulative Variance for PC's (2)");
        assert_eq!(lines[1], "# PC Number,Cumulative Variance");
        assert_eq!(lines[3], "1,0.8");
        assert!(lines.contains(&"v,0,0,0.8,-0.6"));
        assert!(lines.contains(&"# PC1,PC2"));
    }

    #[test]
    fn csv_writer_quotes_awkward_names() {
        let loading = LoadingPlot::new(
            &["weight, kg", "say \"hi\"", "plain"],
            array![[0.6, 0.8], [0.8, -0.6], [0.0, 1.0]].view(),
        )
        .unwrap();
        let mut writer = CsvPlotWriter::new(Vec::new());
        writer.render_loading(&loading).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[3], "\"weight, kg\",0,0,0.6,0.8");
        assert_eq!(lines[4], "\"say \"\"hi\"\"\",0,0,0.8,-0.6");
        assert_eq!(lines[5], "plain,0,0,0,1");
    }

    #[test]
    fn csv_field_leaves_simple_text_alone() {
        assert_eq!(csv_field("PC Number"), "PC Number");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
    }
}
