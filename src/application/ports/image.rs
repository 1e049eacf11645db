//! Still image codec port interface

use thiserror::Error;

use crate::domain::error::CaptureError;
use crate::domain::still::{ResizeSpec, ResizedImage, StillImage};

/// Image pipeline errors
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("{0}")]
    DecodeFailed(String),

    #[error("{0}")]
    EncodeFailed(String),
}

impl From<ImageError> for CaptureError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::DecodeFailed(msg) => CaptureError::DecodeFailed(msg),
            ImageError::EncodeFailed(msg) => CaptureError::EncodeFailed(msg),
        }
    }
}

/// Port for decoding, scaling and re-encoding still images.
///
/// Blocking; callers on the async runtime move it off the executor.
pub trait ImageResizer: Send + Sync {
    fn resize(&self, source: &StillImage, spec: &ResizeSpec) -> Result<ResizedImage, ImageError>;
}
