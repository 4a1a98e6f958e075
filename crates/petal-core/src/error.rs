//! Error types for Petal

use thiserror::Error;

use crate::Landmark;

/// Core Petal errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PetalError {
    // Frame errors
    #[error("Malformed frame: expected {expected} landmarks, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("Non-finite coordinate at {0:?}")]
    NonFiniteCoordinate(Landmark),

    // Detector errors
    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Content pool is empty")]
    EmptyContentPool,

    #[error("Config parse error: {0}")]
    Config(String),

    // Runtime errors
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for Petal operations
pub type PetalResult<T> = Result<T, PetalError>;
