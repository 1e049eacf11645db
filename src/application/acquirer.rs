//! Stream acquisition: tab stream plus optional microphone

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{AcquireError, MediaStream, TabConstraints, TabMediaSource};
use crate::domain::error::CaptureError;
use crate::domain::target::StreamHandle;

/// Message returned when the microphone cannot be opened
pub const MIC_PERMISSION_REQUIRED: &str = "microphone permission is required";

/// Streams owned by one recording session
#[derive(Debug)]
pub struct AcquiredStreams {
    pub tab: MediaStream,
    pub mic: Option<MediaStream>,
}

impl AcquiredStreams {
    /// Stop every acquired track
    pub fn release(self) {
        self.tab.stop_all();
        if let Some(mic) = self.mic {
            mic.stop_all();
        }
    }
}

/// Acquires the tab stream and, when requested, the microphone
pub struct StreamAcquirer<S: TabMediaSource> {
    source: Arc<S>,
}

impl<S: TabMediaSource> StreamAcquirer<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Open the streams for one session.
    ///
    /// If the microphone fails, the tab tracks are stopped before the
    /// error is returned.
    pub async fn acquire(
        &self,
        handle: StreamHandle,
        constraints: TabConstraints,
        mic_audio: bool,
    ) -> Result<AcquiredStreams, CaptureError> {
        let tab = self
            .source
            .open_tab_stream(handle, &constraints)
            .await
            .map_err(|err| match err {
                AcquireError::PermissionDenied(reason) => {
                    CaptureError::PermissionDenied(format!("tab capture was rejected ({})", reason))
                }
                other => other.into(),
            })?;
        debug!(tracks = tab.tracks().len(), "Tab stream acquired");

        if !mic_audio {
            return Ok(AcquiredStreams { tab, mic: None });
        }

        match self.source.open_microphone().await {
            Ok(mic) => {
                debug!(tracks = mic.tracks().len(), "Microphone stream acquired");
                Ok(AcquiredStreams {
                    tab,
                    mic: Some(mic),
                })
            }
            Err(err) => {
                warn!(error = %err, "Microphone unavailable, releasing tab stream");
                tab.stop_all();
                Err(CaptureError::PermissionDenied(
                    MIC_PERMISSION_REQUIRED.to_string(),
                ))
            }
        }
    }
}
