//! Error types for gallery discovery

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    /// Resolve options out of range
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest request answered with a non-success status
    #[error("Manifest request failed with status {0}")]
    ManifestStatus(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The owning view was torn down before the pass finished
    #[error("Resolution cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, GalleryError>;
