//! Error types for the GHSOM inspection layer.

use thiserror::Error;

/// The main error type for inspection operations.
#[derive(Error, Debug)]
pub enum InspectError {
    /// A prototype vector cannot be reshaped into a square tile.
    #[error("Shape error: weight length {weight_len} is not a perfect square")]
    Shape {
        /// The offending prototype vector length.
        weight_len: usize,
    },

    /// A metric received a dataset without points.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A label has no marker/colour slot in the palette.
    #[error("Palette overflow: label {label} exceeds the {capacity} available styles")]
    PaletteOverflow {
        /// The label that could not be styled.
        label: u8,
        /// Number of styles in the palette.
        capacity: usize,
    },

    /// An input vector does not match the prototype length.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Prototype vector length.
        expected: usize,
        /// Input vector length.
        actual: usize,
    },

    /// The hierarchy handed to us is malformed.
    #[error("Model error: {0}")]
    Model(String),

    /// A view id that is not (or no longer) open.
    #[error("Unknown view: {0}")]
    UnknownView(usize),

    /// Malformed dataset.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid model file.
    #[error("Invalid model format: {0}")]
    InvalidModelFormat(String),
}

/// Result type alias for inspection operations.
pub type Result<T> = std::result::Result<T, InspectError>;

impl From<bincode::Error> for InspectError {
    fn from(err: bincode::Error) -> Self {
        InspectError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for InspectError {
    fn from(err: serde_json::Error) -> Self {
        InspectError::Config(err.to_string())
    }
}

impl From<image::ImageError> for InspectError {
    fn from(err: image::ImageError) -> Self {
        InspectError::Image(err.to_string())
    }
}
