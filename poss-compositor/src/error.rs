//! Compositor error types
//!
//! Internal to the pipeline: `ImageCompositor::compose` maps every variant
//! to a fallback instead of returning it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Overlay asset not found: {0}")]
    AssetNotFound(String),

    #[error("Remote background removal failed: {0}")]
    Remote(#[from] crate::removebg::RemoveBgError),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Composition cancelled")]
    Cancelled,
}

impl From<tokio::task::JoinError> for CompositorError {
    fn from(err: tokio::task::JoinError) -> Self {
        CompositorError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CompositorError>;
