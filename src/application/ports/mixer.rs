//! Audio mixing graph port interface

use thiserror::Error;

use super::media::{MediaTrack, TrackRef};
use crate::domain::error::CaptureError;

/// Mixing errors
#[derive(Debug, Clone, Error)]
pub enum MixerError {
    #[error("Failed to create mixing graph: {0}")]
    CreateFailed(String),

    #[error("Failed to connect audio source: {0}")]
    ConnectFailed(String),
}

impl From<MixerError> for CaptureError {
    fn from(err: MixerError) -> Self {
        CaptureError::Mixer(err.to_string())
    }
}

/// An audio graph summing its sources into one destination track
pub trait MixingGraph: Send + Sync {
    /// Connect the audio tracks of one source to the destination
    fn connect(&mut self, source: &[TrackRef]) -> Result<(), MixerError>;

    /// Take the destination track. Returns `None` after the first call.
    fn take_output(&mut self) -> Option<MediaTrack>;

    /// Release the graph. Called exactly once.
    fn close(self: Box<Self>);
}

/// Port creating mixing graphs
pub trait MixingBackend: Send + Sync {
    fn create_graph(&self) -> Result<Box<dyn MixingGraph>, MixerError>;
}
