//! Error types for tidyroom_asset

use std::sync::Arc;
use thiserror::Error;

/// Main error type for asset operations
///
/// Cloneable so a single pending load can hand the same failure to every
/// caller awaiting it.
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("Invalid model path: path must be a non-empty string")]
    InvalidPath,

    #[error("Failed to load model from {path}: {cause}")]
    LoadFailure {
        path: String,
        #[source]
        cause: Arc<LoadCause>,
    },
}

impl AssetError {
    pub(crate) fn load_failure(path: impl Into<String>, cause: Arc<LoadCause>) -> Self {
        Self::LoadFailure {
            path: path.into(),
            cause,
        }
    }

    /// Root cause of a load failure, if this is one
    pub fn cause(&self) -> Option<&LoadCause> {
        match self {
            Self::LoadFailure { cause, .. } => Some(cause),
            Self::InvalidPath => None,
        }
    }
}

/// Underlying reason a fetch-and-parse did not produce a model
#[derive(Error, Debug)]
pub enum LoadCause {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("GLTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Invalid data URI: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Model loading was cancelled")]
    Cancelled,
}

/// Errors raised while retrieving raw bytes
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Errors raised by the compressed-geometry decoder module
#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("No geometry decoder available at {0}")]
    Unavailable(String),

    #[error("Decoder initialization failed: {0}")]
    Init(String),

    #[error("Failed to decode compressed primitive: {0}")]
    Decode(String),
}

/// Result type alias for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
