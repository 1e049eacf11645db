//! Media encoder port interface

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use super::media::CompositeStream;
use crate::domain::error::CaptureError;

/// Encoder errors
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    #[error("Encoder could not be created: {0}")]
    StartFailed(String),

    #[error("Encoder did not start within {0:?}")]
    StartTimeout(Duration),

    #[error("Encoder failed: {0}")]
    Failed(String),
}

impl From<EncoderError> for CaptureError {
    fn from(err: EncoderError) -> Self {
        CaptureError::Encoder(err.to_string())
    }
}

/// Encoder parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// `None` lets the platform choose
    pub mime_type: Option<&'static str>,
    pub video_bits_per_second: u32,
    /// Interval between emitted chunks
    pub timeslice: Duration,
}

/// Events emitted by a running encoder, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    Started,
    Chunk(Vec<u8>),
    /// Final flush done; no events follow
    Stopped,
    Failed(String),
}

/// Control side of a running encoder
pub trait EncoderControl: Send + Sync {
    /// Ask the encoder to flush and emit `Stopped`
    fn request_stop(&self);
}

/// A started encoder: its event stream and its control
pub struct RunningEncoder {
    pub events: mpsc::UnboundedReceiver<EncoderEvent>,
    pub control: Box<dyn EncoderControl>,
}

/// Port for the platform encoder
pub trait EncoderBackend: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn start(
        &self,
        stream: &CompositeStream,
        config: &EncoderConfig,
    ) -> Result<RunningEncoder, EncoderError>;
}
