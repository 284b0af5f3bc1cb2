//! Error type for the ambient parts of the renderer.
//!
//! The kernel itself never fails; these errors come from settings, image
//! sizes and image output.

use thiserror::Error;

/// Errors raised while configuring a frame or writing its output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid camera settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
