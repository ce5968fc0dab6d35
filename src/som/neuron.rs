//! Neuron representation for the hierarchical map.

use crate::error::{InspectError, Result};
use crate::som::Map;
use serde::{Deserialize, Serialize};

/// A neuron in a hierarchical map.
///
/// Each neuron has a position on its map's 2D grid, a prototype vector, and
/// optionally owns a finer-grained child map. A neuron without a child map is
/// a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    /// Row position on the grid.
    pub row: usize,
    /// Column position on the grid.
    pub col: usize,
    /// Prototype vector.
    pub weights: Vec<f64>,
    /// Sub-map grown below this neuron, if any.
    pub child: Option<Box<Map>>,
}

impl Neuron {
    /// Creates a leaf neuron with the given weights.
    pub fn new_with_weights(row: usize, col: usize, weights: Vec<f64>) -> Self {
        Self {
            row,
            col,
            weights,
            child: None,
        }
    }

    /// Creates a leaf neuron with zero weights.
    pub fn new_zeros(row: usize, col: usize, weight_dim: usize) -> Self {
        Self::new_with_weights(row, col, vec![0.0; weight_dim])
    }

    /// Returns the `(row, col)` grid position.
    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Returns the child map, if this neuron has one.
    #[inline]
    pub fn child_map(&self) -> Option<&Map> {
        self.child.as_deref()
    }

    /// Returns true if this neuron owns no child map.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child.is_none()
    }

    /// Computes the squared Euclidean distance (faster, avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, input: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, i)| (w - i).powi(2))
            .sum()
    }

    /// Activation of this neuron for an input: the Euclidean distance
    /// between the prototype and the input.
    pub fn activation(&self, input: &[f64]) -> Result<f64> {
        if input.len() != self.weights.len() {
            return Err(InspectError::DimensionMismatch {
                expected: self.weights.len(),
                actual: input.len(),
            });
        }
        Ok(self.distance_squared(input).sqrt())
    }
}
