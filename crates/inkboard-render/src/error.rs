//! Render errors.

use thiserror::Error;

/// Errors from decoding, rasterizing and exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Nothing to export")]
    EmptyScene,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
