//! Hierarchical map data model.
//!
//! A [`Model`] owns its top-level [`Map`]; each map owns its [`Neuron`]s and
//! each neuron may own one child map. Everything here is read-only once
//! built: the inspection layer never trains or mutates the hierarchy.

mod map;
mod model;
mod neuron;

pub use map::Map;
pub use model::Model;
pub use neuron::Neuron;
