//! Error types for the cadence engine

use thiserror::Error;

/// Result type alias for cadence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the cadence engine
///
/// No variant is fatal to the host process: permission denial is recoverable
/// through an external platform change, and resource failures degrade the
/// session instead of blocking it.
#[derive(Debug, Error)]
pub enum Error {
    /// Microphone permission denied by the platform
    #[error("microphone permission denied")]
    PermissionDenied,

    /// A gameplay resource could not be prepared
    #[error("resource unavailable: {0}")]
    Resource(String),

    /// Recognition stream stopped or failed unexpectedly
    #[error("recognition stream error: {0}")]
    Stream(String),

    /// Prompt catalog error
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
