//! Error types for the grass pipeline

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    /// A required handle is missing, or the settings produce buffers the
    /// device cannot hold.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Frame work was requested while no buffer set is alive.
    #[error("Grass renderer is not initialized")]
    NotInitialized,
}
