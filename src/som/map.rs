//! A single level of the hierarchy: a rectangular grid of neurons.

use crate::error::{InspectError, Result};
use crate::som::Neuron;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular grid of neurons, possibly with child maps below some of them.
///
/// Neurons are stored in row-major order and exclusively owned by the map;
/// each neuron exclusively owns its child map. The structure is therefore a
/// finite tree that can be walked without any sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// Number of grid rows.
    pub rows: usize,
    /// Number of grid columns.
    pub cols: usize,
    /// Prototype vector length shared by every neuron.
    pub weight_dim: usize,
    /// The neurons in the grid (row-major order).
    pub neurons: Vec<Neuron>,
}

impl Map {
    /// Creates a map from a row-major list of neurons.
    ///
    /// Fails if the grid is empty, the neuron count or positions disagree
    /// with the shape, or prototype lengths differ.
    pub fn new(rows: usize, cols: usize, neurons: Vec<Neuron>) -> Result<Self> {
        let weight_dim = neurons.first().map(|n| n.weights.len()).unwrap_or(0);
        let map = Self {
            rows,
            cols,
            weight_dim,
            neurons,
        };
        map.validate_level()?;
        Ok(map)
    }

    /// Creates a childless map from row-major prototype vectors.
    pub fn from_weights(rows: usize, cols: usize, weights: Vec<Vec<f64>>) -> Result<Self> {
        if cols == 0 {
            return Err(InspectError::Model("map must have at least one column".to_string()));
        }
        let neurons = weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| Neuron::new_with_weights(i / cols, i % cols, w))
            .collect();
        Self::new(rows, cols, neurons)
    }

    /// Attaches `child` below the neuron at `(row, col)`.
    pub fn with_child(mut self, row: usize, col: usize, child: Map) -> Result<Self> {
        let idx = self.coords_to_index(row, col).ok_or_else(|| {
            InspectError::Model(format!(
                "position ({}, {}) outside {}x{} map",
                row, col, self.rows, self.cols
            ))
        })?;
        self.neurons[idx].child = Some(Box::new(child));
        Ok(self)
    }

    /// Checks this map's own shape, positions and prototype lengths.
    pub(crate) fn validate_level(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(InspectError::Model(format!(
                "map shape {}x{} has no neurons",
                self.rows, self.cols
            )));
        }
        if self.neurons.len() != self.rows * self.cols {
            return Err(InspectError::Model(format!(
                "{}x{} map holds {} neurons",
                self.rows,
                self.cols,
                self.neurons.len()
            )));
        }
        for (i, neuron) in self.neurons.iter().enumerate() {
            if neuron.position() != self.index_to_coords(i) {
                return Err(InspectError::Model(format!(
                    "neuron {} reports position {:?}, expected {:?}",
                    i,
                    neuron.position(),
                    self.index_to_coords(i)
                )));
            }
            if neuron.weights.len() != self.weight_dim {
                return Err(InspectError::Model(format!(
                    "neuron {:?} has {} weights, map uses {}",
                    neuron.position(),
                    neuron.weights.len(),
                    self.weight_dim
                )));
            }
        }
        Ok(())
    }

    /// Validates this map and every map below it.
    ///
    /// Every level of the hierarchy must share the same prototype length.
    pub fn validate(&self) -> Result<()> {
        self.validate_level()?;
        for neuron in &self.neurons {
            if let Some(child) = neuron.child_map() {
                if child.weight_dim != self.weight_dim {
                    return Err(InspectError::Model(format!(
                        "child map of {:?} has {} weights, parent uses {}",
                        neuron.position(),
                        child.weight_dim,
                        self.weight_dim
                    )));
                }
                child.validate()?;
            }
        }
        Ok(())
    }

    /// Returns the grid shape `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of neurons on this level only.
    #[inline]
    pub fn total_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the neurons in row-major order.
    #[inline]
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Gets a neuron by its 2D position.
    #[inline]
    pub fn get_at(&self, row: usize, col: usize) -> Option<&Neuron> {
        self.coords_to_index(row, col).and_then(|idx| self.neurons.get(idx))
    }

    /// Converts a 1D index to 2D coordinates.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Converts 2D coordinates to a 1D index, if inside the grid.
    #[inline]
    pub fn coords_to_index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Finds the winner neuron: the one whose prototype is closest to the input.
    ///
    /// Ties resolve to the lowest row-major index; NaN distances never win.
    pub fn winner_neuron(&self, input: &[f64]) -> Result<&Neuron> {
        if input.len() != self.weight_dim {
            return Err(InspectError::DimensionMismatch {
                expected: self.weight_dim,
                actual: input.len(),
            });
        }

        let mut best: Option<(&Neuron, f64)> = None;
        for neuron in &self.neurons {
            let dist = neuron.distance_squared(input);
            let dist = if dist.is_nan() { f64::INFINITY } else { dist };
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((neuron, dist)),
            }
        }

        best.map(|(neuron, _)| neuron)
            .ok_or_else(|| InspectError::Model("empty map".to_string()))
    }

    /// Number of neurons on this level that own a child map.
    pub fn child_count(&self) -> usize {
        self.neurons.iter().filter(|n| !n.is_leaf()).count()
    }

    /// Number of map levels from this map down to its deepest descendant.
    pub fn depth(&self) -> usize {
        1 + self
            .neurons
            .iter()
            .filter_map(Neuron::child_map)
            .map(Map::depth)
            .max()
            .unwrap_or(0)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize, label: &str) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} -> map {}x{} ({} weights, {} child maps)",
            "",
            label,
            self.rows,
            self.cols,
            self.weight_dim,
            self.child_count(),
            indent = indent
        )?;
        for neuron in &self.neurons {
            if let Some(child) = neuron.child_map() {
                let label = format!("({}, {})", neuron.row, neuron.col);
                child.fmt_tree(f, indent + 2, &label)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0, "root")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize, dim: usize) -> Map {
        let weights = (0..rows * cols).map(|i| vec![i as f64; dim]).collect();
        Map::from_weights(rows, cols, weights).unwrap()
    }

    #[test]
    fn test_map_creation() {
        let map = grid(2, 3, 4);
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map.total_neurons(), 6);
        assert_eq!(map.weight_dim, 4);
        assert_eq!(map.get_at(1, 2).unwrap().position(), (1, 2));
        assert!(map.get_at(2, 0).is_none());
    }

    #[test]
    fn test_wrong_neuron_count() {
        let result = Map::from_weights(2, 2, vec![vec![0.0]; 3]);
        assert!(matches!(result, Err(InspectError::Model(_))));
    }

    #[test]
    fn test_ragged_weights_rejected() {
        let result = Map::from_weights(1, 2, vec![vec![0.0, 1.0], vec![0.0]]);
        assert!(matches!(result, Err(InspectError::Model(_))));
    }

    #[test]
    fn test_misplaced_neuron_rejected() {
        let neurons = vec![Neuron::new_zeros(0, 1, 1), Neuron::new_zeros(0, 0, 1)];
        assert!(Map::new(1, 2, neurons).is_err());
    }

    #[test]
    fn test_winner_neuron() {
        let map = grid(3, 3, 2);
        let winner = map.winner_neuron(&[4.2, 4.2]).unwrap();
        assert_eq!(winner.position(), (1, 1));
    }

    #[test]
    fn test_winner_tie_prefers_first() {
        let map = Map::from_weights(1, 3, vec![vec![1.0], vec![-1.0], vec![1.0]]).unwrap();
        assert_eq!(map.winner_neuron(&[0.0]).unwrap().position(), (0, 0));
    }

    #[test]
    fn test_winner_skips_nan() {
        let map = Map::from_weights(1, 2, vec![vec![f64::NAN], vec![100.0]]).unwrap();
        assert_eq!(map.winner_neuron(&[0.0]).unwrap().position(), (0, 1));
    }

    #[test]
    fn test_winner_dimension_mismatch() {
        let map = grid(2, 2, 3);
        assert!(matches!(
            map.winner_neuron(&[0.0]),
            Err(InspectError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_depth_and_children() {
        let leaf = grid(1, 1, 2);
        let mid = grid(2, 2, 2).with_child(1, 0, leaf).unwrap();
        let root = grid(2, 2, 2).with_child(0, 1, mid).unwrap();
        assert_eq!(root.depth(), 3);
        assert_eq!(root.child_count(), 1);
        assert!(root.validate().is_ok());
        assert!(grid(2, 2, 2).with_child(5, 5, grid(1, 1, 2)).is_err());
    }

    #[test]
    fn test_child_weight_dim_must_match_parent() {
        let root = grid(2, 2, 4).with_child(0, 0, grid(1, 1, 9)).unwrap();
        assert!(matches!(root.validate(), Err(InspectError::Model(_))));
    }

    #[test]
    fn test_get_at_on_short_neuron_list() {
        let map = Map {
            rows: 2,
            cols: 2,
            weight_dim: 1,
            neurons: vec![Neuron::new_zeros(0, 0, 1)],
        };
        assert!(map.get_at(0, 0).is_some());
        assert!(map.get_at(1, 1).is_none());
    }

    #[test]
    fn test_display_tree() {
        let root = grid(2, 2, 4).with_child(0, 1, grid(1, 1, 4)).unwrap();
        let text = root.to_string();
        assert!(text.starts_with("root -> map 2x2 (4 weights, 1 child maps)"));
        assert!(text.contains("  (0, 1) -> map 1x1 (4 weights, 0 child maps)"));
    }
}
