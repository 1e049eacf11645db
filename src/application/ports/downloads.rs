//! Downloads port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::CaptureError;

/// Download errors
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Download directory not available")]
    NoDirectory,

    #[error("Failed to write {0}")]
    WriteFailed(String),
}

impl From<DownloadError> for CaptureError {
    fn from(err: DownloadError) -> Self {
        CaptureError::Download(err.to_string())
    }
}

/// Port for saving output artifacts
#[async_trait]
pub trait Downloads: Send + Sync {
    /// Save `bytes` under the suggested `filename`.
    ///
    /// # Returns
    /// Where the file ended up
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, DownloadError>;
}
