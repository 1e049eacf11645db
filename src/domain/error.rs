//! Domain error types

use thiserror::Error;

/// Failure surfaced by a controller or worker operation.
///
/// The `Display` output is the message returned to the panel in
/// `CommandResponse::error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Recording is not permitted: {0}")]
    PermissionDenied(String),

    #[error("Cannot capture this page: {0}")]
    InvalidTarget(String),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording is in progress")]
    NotRecording,

    #[error("Failed to show countdown: {0}")]
    OverlayInjectionFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to deliver message: {0}")]
    DeliveryFailed(String),

    #[error("Recording start was cancelled")]
    Cancelled,

    #[error("No active tab found")]
    NoActiveTab,

    #[error("Original window size has not been saved")]
    NothingSaved,

    #[error("Invalid window size: {0}")]
    InvalidWindowSize(String),

    #[error("Failed to start encoder: {0}")]
    Encoder(String),

    #[error("Failed to mix audio: {0}")]
    Mixer(String),

    #[error("Browser request failed: {0}")]
    Browser(String),

    #[error("Failed to save file: {0}")]
    Download(String),

    #[error("Storage failed: {0}")]
    Storage(String),

    /// Failure reported by the media worker, message passed through verbatim
    #[error("{0}")]
    Worker(String),
}

/// Error when reading or writing persisted settings and runtime state
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Failed to read {0}")]
    ReadError(String),

    #[error("Failed to parse {0}")]
    ParseError(String),

    #[error("Failed to write {0}")]
    WriteError(String),

    #[error("Invalid value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

impl From<StoreError> for CaptureError {
    fn from(err: StoreError) -> Self {
        CaptureError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_message_is_verbatim() {
        let err = CaptureError::Worker("Microphone permission is required".to_string());
        assert_eq!(err.to_string(), "Microphone permission is required");
    }

    #[test]
    fn store_error_converts_to_storage() {
        let err: CaptureError = StoreError::WriteError("state.json: disk full".into()).into();
        assert!(matches!(err, CaptureError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
