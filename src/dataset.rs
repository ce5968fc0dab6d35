//! Datasets of fixed-length vectors with optional small-integer labels.

use crate::error::{InspectError, Result};
use log::warn;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// An ordered set of equal-length vectors, optionally labelled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    points: Vec<Vec<f64>>,
    labels: Option<Vec<u8>>,
}

impl Dataset {
    /// Creates an unlabelled dataset.
    pub fn new(points: Vec<Vec<f64>>) -> Result<Self> {
        Self::build(points, None)
    }

    /// Creates a labelled dataset; `labels` must pair one-to-one with `points`.
    pub fn with_labels(points: Vec<Vec<f64>>, labels: Vec<u8>) -> Result<Self> {
        Self::build(points, Some(labels))
    }

    fn build(points: Vec<Vec<f64>>, labels: Option<Vec<u8>>) -> Result<Self> {
        if let Some(first) = points.first() {
            let features = first.len();
            if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| p.len() != features) {
                return Err(InspectError::Dataset(format!(
                    "point {} has {} features, expected {}",
                    i,
                    p.len(),
                    features
                )));
            }
        }
        if let Some(labels) = &labels {
            if labels.len() != points.len() {
                return Err(InspectError::Dataset(format!(
                    "{} labels for {} points",
                    labels.len(),
                    points.len()
                )));
            }
        }
        Ok(Self { points, labels })
    }

    /// Reads a delimited text file, one point per line.
    ///
    /// Values may be separated by commas and/or whitespace. Blank lines and
    /// lines starting with `#` are skipped. When `labelled` is set, the last
    /// column of every line is the point's label.
    pub fn load<P: AsRef<Path>>(path: P, labelled: bool) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut points = Vec::new();
        let mut labels = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();

            let (values, label) = if labelled {
                match fields.split_last() {
                    Some((label, values)) if !values.is_empty() => (values, Some(*label)),
                    _ => {
                        return Err(InspectError::Dataset(format!(
                            "line {}: a labelled row needs at least one value and a label",
                            line_no + 1
                        )))
                    }
                }
            } else {
                (fields.as_slice(), None)
            };

            let point = values
                .iter()
                .map(|v| {
                    v.parse::<f64>().map_err(|e| {
                        InspectError::Dataset(format!("line {}: bad value {:?}: {}", line_no + 1, v, e))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            if let Some(label) = label {
                let label = label.parse::<u8>().map_err(|e| {
                    InspectError::Dataset(format!("line {}: bad label {:?}: {}", line_no + 1, label, e))
                })?;
                labels.push(label);
            }
            points.push(point);
        }

        if points.is_empty() {
            warn!("dataset file contained no points");
        }

        if labelled {
            Self::with_labels(points, labels)
        } else {
            Self::new(points)
        }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of features per point (0 for an empty dataset).
    pub fn features(&self) -> usize {
        self.points.first().map(Vec::len).unwrap_or(0)
    }

    /// The points in order.
    #[inline]
    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    /// The labels, if this dataset is labelled.
    #[inline]
    pub fn labels(&self) -> Option<&[u8]> {
        self.labels.as_deref()
    }

    /// Distinct label values in ascending order.
    pub fn distinct_labels(&self) -> Vec<u8> {
        self.labels
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<u8>>()
            .into_iter()
            .collect()
    }

    /// Builds the dataset made of the points (and labels) at `indices`, in order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let points = indices
            .iter()
            .map(|&i| {
                self.points.get(i).cloned().ok_or_else(|| {
                    InspectError::Dataset(format!("index {} out of {} points", i, self.len()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let labels = self
            .labels
            .as_ref()
            .map(|labels| indices.iter().map(|&i| labels[i]).collect());
        Ok(Self { points, labels })
    }
}
