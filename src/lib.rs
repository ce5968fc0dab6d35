//! # ghsom-inspect - Inspection of Growing Hierarchical SOMs
//!
//! A read-only inspection layer over an already-trained hierarchical
//! self-organizing map: a tree of 2D maps of prototype vectors in which any
//! neuron may own a finer child map.
//!
//! ## Key Features
//!
//! - **Weight images**: each map's prototypes tiled into one image
//! - **Interactive drill-down**: click a neuron to open a view over its child map
//! - **Label overlays**: one marker per data point on its winning cell
//! - **Fit metrics**: mean leaf activation and dispersion rate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ghsom_inspect::{metrics, Dataset, HierarchyNavigator, ModelFile, NullSurface};
//!
//! let model = ModelFile::read("digits.ghsom")?;
//! let data = Dataset::load("digits.csv", true)?;
//!
//! let (mean, std) = metrics::mean_data_centroid_activation(&model, &data)?;
//! let rate = metrics::dispersion_rate(&model, &data)?;
//!
//! let mut nav = HierarchyNavigator::new(NullSurface);
//! let root = nav.open_root(&model, Some(data))?;
//! nav.click(root, 12, 20)?;
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Maps, neurons and the model tree
//! - [`render`] - Weight images, colormaps and label overlays
//! - [`navigator`] - Open views and click handling
//! - [`metrics`] - Leaf descent and fit statistics
//! - [`dataset`] - Labelled point sets
//! - [`storage`] - Model file format

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod navigator;
pub mod render;
pub mod som;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, OverlayConfig, RenderConfig, SessionConfig};
pub use dataset::Dataset;
pub use error::{InspectError, Result};
pub use metrics::{
    dispersion_rate, evaluate, mean_data_centroid_activation, number_of_neurons, FitReport, LeafId,
};
pub use navigator::{
    ClickOutcome, DisplaySurface, HierarchyNavigator, NullSurface, PngSurface, View, ViewId,
};
pub use render::{render_weights, Colormap, LabelAssociationIndex, Palette, WeightImage};
pub use som::{Map, Model, Neuron};
pub use storage::{ModelFile, ModelHeader};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
