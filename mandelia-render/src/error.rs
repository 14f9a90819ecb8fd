use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid export settings: {reason}")]
    InvalidExport { reason: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Core(#[from] mandelia_core::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
