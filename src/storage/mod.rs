//! Storage of trained hierarchies.

mod format;

pub use format::{ModelFile, ModelHeader};
