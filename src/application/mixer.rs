//! Audio mixing: tab and microphone audio summed into one track

use std::sync::Arc;

use tracing::debug;

use super::ports::{MediaStream, MediaTrack, MixingBackend, MixingGraph, TrackKind, TrackRef};
use crate::domain::error::CaptureError;

/// Output of [`AudioMixer::mix`], owning the graph for the session.
///
/// `release` closes the graph exactly once; dropping without releasing
/// does the same.
pub struct MixedAudio {
    graph: Option<Box<dyn MixingGraph>>,
    output: Option<MediaTrack>,
}

impl MixedAudio {
    /// Nothing to mix and no graph held
    pub fn none() -> Self {
        Self {
            graph: None,
            output: None,
        }
    }

    /// The mixed track, absent when no source carried audio
    pub fn output(&self) -> Option<TrackRef> {
        self.output.as_ref().map(MediaTrack::to_ref)
    }

    pub fn holds_graph(&self) -> bool {
        self.graph.is_some()
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(output) = self.output.take() {
            output.stop();
        }
        if let Some(graph) = self.graph.take() {
            graph.close();
            debug!("Mixing graph closed");
        }
    }
}

impl Drop for MixedAudio {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Combines up to two audio sources additively
pub struct AudioMixer<M: MixingBackend> {
    backend: Arc<M>,
}

impl<M: MixingBackend> AudioMixer<M> {
    pub fn new(backend: Arc<M>) -> Self {
        Self { backend }
    }

    /// Mix the audio of `tab` and `mic`.
    ///
    /// A graph is only created when `wants_audio`; sources without
    /// audio tracks are skipped and an empty mix is not an error.
    pub fn mix(
        &self,
        wants_audio: bool,
        tab: &MediaStream,
        mic: Option<&MediaStream>,
    ) -> Result<MixedAudio, CaptureError> {
        if !wants_audio {
            return Ok(MixedAudio::none());
        }

        let mut mixed = MixedAudio {
            graph: Some(self.backend.create_graph()?),
            output: None,
        };

        let mut connected = 0;
        for source in std::iter::once(tab).chain(mic) {
            let tracks = source.track_refs(TrackKind::Audio);
            if tracks.is_empty() {
                continue;
            }
            if let Some(graph) = mixed.graph.as_mut() {
                // On error `mixed` drops here and closes the graph.
                graph.connect(&tracks)?;
            }
            connected += 1;
        }

        if connected > 0 {
            mixed.output = mixed.graph.as_mut().and_then(|g| g.take_output());
        }
        debug!(sources = connected, "Audio mixed");
        Ok(mixed)
    }
}
