//! Fit statistics computed by descending each data point to its leaf.
//!
//! Every point starts at the top-level map, moves to its winner neuron, and
//! keeps following winners through child maps until it reaches a neuron with
//! no child map. From there:
//!
//! - [`mean_data_centroid_activation`] averages the leaves' activations
//! - [`dispersion_rate`] compares the neuron count of the whole hierarchy
//!   with the number of distinct leaves the data reached

use crate::dataset::Dataset;
use crate::error::{InspectError, Result};
use crate::som::{Map, Model, Neuron};
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

/// Identity of a leaf neuron: the winner positions from the top-level map
/// down to the leaf.
///
/// All but the last entry identify the map owning the leaf; the last entry
/// is the leaf's position in that map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId {
    path: Vec<(usize, usize)>,
}

impl LeafId {
    /// Winner positions from the root map down to the leaf.
    #[inline]
    pub fn path(&self) -> &[(usize, usize)] {
        &self.path
    }

    /// Position of the leaf within its own map.
    pub fn position(&self) -> (usize, usize) {
        self.path.last().copied().unwrap_or((0, 0))
    }

    /// Level of the map holding the leaf (top-level map is 1).
    #[inline]
    pub fn level(&self) -> usize {
        self.path.len()
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.path.iter().map(|(r, c)| format!("({}, {})", r, c)).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// Where one data point ends up.
#[derive(Debug, Clone)]
pub struct Descent<'m> {
    /// The terminal neuron.
    pub leaf: &'m Neuron,
    /// Identity of that neuron.
    pub id: LeafId,
}

/// Follows winner neurons from the top-level map down to a leaf.
pub fn descend<'m>(model: &'m Model, point: &[f64]) -> Result<Descent<'m>> {
    let mut map: &Map = model.root();
    let mut path = Vec::with_capacity(model.depth());
    loop {
        let neuron = map.winner_neuron(point)?;
        path.push(neuron.position());
        match neuron.child_map() {
            Some(child) => map = child,
            None => {
                return Ok(Descent {
                    leaf: neuron,
                    id: LeafId { path },
                })
            }
        }
    }
}

fn require_points(dataset: &Dataset, what: &str) -> Result<()> {
    if dataset.is_empty() {
        return Err(InspectError::EmptyInput(format!("{} needs at least one data point", what)));
    }
    Ok(())
}

/// Mean and population standard deviation of each point's leaf activation.
pub fn mean_data_centroid_activation(model: &Model, dataset: &Dataset) -> Result<(f64, f64)> {
    require_points(dataset, "mean data-centroid activation")?;

    let activations = dataset
        .points()
        .iter()
        .map(|point| descend(model, point)?.leaf.activation(point))
        .collect::<Result<Vec<f64>>>()?;

    Ok(mean_std(&activations))
}

/// Mean and population standard deviation. `values` must not be empty.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn count_neurons(map: &Map) -> usize {
    map.total_neurons()
        + map
            .neurons()
            .iter()
            .filter_map(Neuron::child_map)
            .map(count_neurons)
            .sum::<usize>()
}

/// Total neurons over the top-level map and every map below it.
pub fn number_of_neurons(model: &Model) -> usize {
    count_neurons(model.root())
}

fn count_leaves(map: &Map) -> usize {
    map.neurons()
        .iter()
        .map(|n| n.child_map().map(count_leaves).unwrap_or(1))
        .sum()
}

/// Number of neurons without a child map.
pub fn leaf_count(model: &Model) -> usize {
    count_leaves(model.root())
}

/// Distinct leaves reached by the points of `dataset`.
pub fn visited_leaves(model: &Model, dataset: &Dataset) -> Result<HashSet<LeafId>> {
    dataset
        .points()
        .iter()
        .map(|point| descend(model, point).map(|d| d.id))
        .collect()
}

/// `number_of_neurons / distinct visited leaves`.
///
/// Grows as the data concentrate onto fewer leaves.
pub fn dispersion_rate(model: &Model, dataset: &Dataset) -> Result<f64> {
    require_points(dataset, "dispersion rate")?;
    let visited = visited_leaves(model, dataset)?;
    debug!("{} points reached {} distinct leaves", dataset.len(), visited.len());
    Ok(number_of_neurons(model) as f64 / visited.len() as f64)
}

/// All fit statistics for one model and dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// Mean leaf activation.
    pub activation_mean: f64,
    /// Population standard deviation of leaf activations.
    pub activation_std: f64,
    /// Neurons in the whole hierarchy.
    pub total_neurons: usize,
    /// Neurons without a child map.
    pub total_leaves: usize,
    /// Distinct leaves reached by the data.
    pub visited_leaves: usize,
    /// `total_neurons / visited_leaves`.
    pub dispersion_rate: f64,
}

/// Computes every statistic with a single descent per point.
pub fn evaluate(model: &Model, dataset: &Dataset) -> Result<FitReport> {
    require_points(dataset, "fit evaluation")?;

    let mut activations = Vec::with_capacity(dataset.len());
    let mut visited = HashSet::new();
    for point in dataset.points() {
        let descent = descend(model, point)?;
        activations.push(descent.leaf.activation(point)?);
        visited.insert(descent.id);
    }

    let (mean, std) = mean_std(&activations);
    let total_neurons = number_of_neurons(model);

    let report = FitReport {
        activation_mean: mean,
        activation_std: std,
        total_neurons,
        total_leaves: leaf_count(model),
        visited_leaves: visited.len(),
        dispersion_rate: total_neurons as f64 / visited.len() as f64,
    };
    info!(
        "evaluated {} points: activation {:.4} ± {:.4}, dispersion {:.4}",
        dataset.len(),
        report.activation_mean,
        report.activation_std,
        report.dispersion_rate
    );
    Ok(report)
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mean data-centroid activation: ({}, {})", self.activation_mean, self.activation_std)?;
        writeln!(
            f,
            "neurons: {} ({} leaves, {} reached)",
            self.total_neurons, self.total_leaves, self.visited_leaves
        )?;
        write!(f, "dispersion rate: {}", self.dispersion_rate)
    }
}
