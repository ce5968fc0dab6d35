//! The trained hierarchy as a whole.

use crate::error::Result;
use crate::som::Map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trained hierarchical map, rooted at its top-level map.
///
/// Trainers commonly hang the first level below a synthetic "zero unit"
/// neuron. This type holds the first level directly; the zero unit carries
/// no prototype of interest and is never counted or descended through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    map: Map,
}

impl Model {
    /// Wraps a top-level map after validating the whole tree.
    pub fn new(map: Map) -> Result<Self> {
        map.validate()?;
        Ok(Self { map })
    }

    /// The top-level map.
    #[inline]
    pub fn root(&self) -> &Map {
        &self.map
    }

    /// Number of map levels in the hierarchy.
    pub fn depth(&self) -> usize {
        self.map.depth()
    }

    /// Input vector length expected at the root.
    pub fn input_dim(&self) -> usize {
        self.map.weight_dim
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GHSOM model (depth {}, {} input features)", self.depth(), self.input_dim())?;
        write!(f, "{}", self.map)
    }
}
