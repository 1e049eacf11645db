//! Media stream port interfaces

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::domain::error::CaptureError;
use crate::domain::target::StreamHandle;

/// Stream acquisition errors
#[derive(Debug, Clone, Error)]
pub enum AcquireError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("Failed to acquire stream: {0}")]
    Failed(String),
}

impl From<AcquireError> for CaptureError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::PermissionDenied(msg) => CaptureError::PermissionDenied(msg),
            AcquireError::InvalidTarget(msg) => CaptureError::InvalidTarget(msg),
            AcquireError::Failed(msg) => CaptureError::Browser(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live platform track, implemented by the host
pub trait TrackHandle: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// End the track. Called at most once per [`MediaTrack`].
    fn stop(&self);
}

/// Owned live track.
///
/// Stopping consumes the track, so a track can be stopped at most once.
/// A track dropped without being stopped is stopped by the drop guard.
#[derive(Debug)]
pub struct MediaTrack {
    handle: Arc<dyn TrackHandle>,
    stopped: bool,
}

impl MediaTrack {
    pub fn new(handle: Arc<dyn TrackHandle>) -> Self {
        Self {
            handle,
            stopped: false,
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn kind(&self) -> TrackKind {
        self.handle.kind()
    }

    /// Read-only reference for composition
    pub fn to_ref(&self) -> TrackRef {
        TrackRef(Arc::clone(&self.handle))
    }

    pub fn stop(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.handle.stop();
        }
    }
}

impl Drop for MediaTrack {
    fn drop(&mut self) {
        if !self.stopped {
            warn!(track = %self.handle.id(), "Track dropped while live, stopping it");
            self.stop_inner();
        }
    }
}

/// Borrowed view of a track: identifies it but cannot stop it
#[derive(Debug, Clone)]
pub struct TrackRef(Arc<dyn TrackHandle>);

impl TrackRef {
    pub fn id(&self) -> &str {
        self.0.id()
    }

    pub fn kind(&self) -> TrackKind {
        self.0.kind()
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// A set of owned live tracks
#[derive(Debug, Default)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|t| t.kind() == TrackKind::Audio)
    }

    /// References to the tracks of one kind, in stream order
    pub fn track_refs(&self, kind: TrackKind) -> Vec<TrackRef> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .map(MediaTrack::to_ref)
            .collect()
    }

    /// Stop every track, consuming the stream
    pub fn stop_all(self) {
        for track in self.tracks {
            track.stop();
        }
    }
}

/// Recordable stream assembled from borrowed tracks, video first
#[derive(Debug, Clone, Default)]
pub struct CompositeStream {
    tracks: Vec<TrackRef>,
}

impl CompositeStream {
    pub fn new(tracks: Vec<TrackRef>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }
}

/// Constraints for the tab stream request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabConstraints {
    pub tab_audio: bool,
    pub max_frame_rate: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

/// Port for tab and microphone media
#[async_trait]
pub trait TabMediaSource: Send + Sync {
    /// Open the tab stream authorized by `handle`.
    ///
    /// The handle is single-use; an expired one yields `InvalidTarget`.
    async fn open_tab_stream(
        &self,
        handle: StreamHandle,
        constraints: &TabConstraints,
    ) -> Result<MediaStream, AcquireError>;

    /// Open an audio-only microphone stream
    async fn open_microphone(&self) -> Result<MediaStream, AcquireError>;
}
