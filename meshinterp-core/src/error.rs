//! Error types for meshinterp-core.

use thiserror::Error;

/// Result type alias for meshinterp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for mesh interpolation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A layer's overlap or hex-center table could not be loaded.
    #[error("failed to load tables for layer {layer}: {message}")]
    TableLoad { layer: u32, message: String },

    /// Layer number outside the supported range.
    #[error("invalid layer: {0}")]
    InvalidLayer(u32),

    /// Hex cell has no center in the layer's hex-center table.
    #[error("hex cell {cell} has no center in layer {layer}")]
    MissingHexCell { layer: u32, cell: u32 },

    /// Hex cell has no entry in the layer's overlap table.
    #[error("hex cell {cell} has no overlap list in layer {layer}")]
    MissingOverlaps { layer: u32, cell: u32 },

    /// Overlap list references a square cell absent from the mesh.
    #[error("square cell ({i}, {j}) is not part of the mesh")]
    MissingSquareCell { i: i32, j: i32 },

    /// Overlap weights of a hex cell sum to zero (or are not finite).
    #[error("overlap weights of hex cell {cell} in layer {layer} sum to {norm}")]
    ZeroNormOverlap { layer: u32, cell: u32, norm: f64 },

    /// Event columns are inconsistent.
    #[error("invalid event data: {0}")]
    InvalidEvent(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Returns true if the error aborts the whole run rather than a single
    /// event.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TableLoad { .. } | Self::ConfigError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let load = Error::TableLoad {
            layer: 3,
            message: "not found".into(),
        };
        assert!(load.is_fatal());

        let zero = Error::ZeroNormOverlap {
            layer: 3,
            cell: 17,
            norm: 0.0,
        };
        assert!(!zero.is_fatal());
        assert_eq!(
            zero.to_string(),
            "overlap weights of hex cell 17 in layer 3 sum to 0"
        );
    }
}
