//! Error types for scheduling and toolpath synthesis.

use thiserror::Error;

use crate::part::PartId;

/// Errors that can occur while scheduling layers or computing regions.
#[derive(Error, Debug)]
pub enum SlicerError {
    /// Invalid configuration value.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Layer ordering policy code with no matching policy.
    #[error("unknown layer ordering policy: {0}")]
    UnknownLayerOrdering(i64),

    /// A global layer already holds a step pair for this part.
    #[error("global layer {layer} already holds a step pair for part {part}")]
    DuplicateStepPair {
        /// Offending part.
        part: PartId,
        /// Index of the global layer.
        layer: usize,
    },

    /// Step index past the end of a part's sequence.
    #[error("step {index} out of range for part {part} ({count} steps)")]
    StepOutOfRange {
        /// Part queried.
        part: PartId,
        /// Requested index.
        index: usize,
        /// Number of steps the part holds.
        count: usize,
    },

    /// Configuration file could not be decoded.
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure (diagnostic log, config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SlicerError {
    fn from(err: toml::de::Error) -> Self {
        SlicerError::Config(err.to_string())
    }
}

/// Result type for layerforge operations.
pub type Result<T> = std::result::Result<T, SlicerError>;
