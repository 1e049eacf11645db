//! Stream composition

use super::ports::{CompositeStream, MediaStream, TrackKind, TrackRef};

/// Build the recordable stream: tab video tracks first, then the mixed audio.
///
/// The result only borrows the tracks; their owners stop them.
pub fn compose(tab: &MediaStream, mixed_audio: Option<TrackRef>) -> CompositeStream {
    let mut tracks = tab.track_refs(TrackKind::Video);
    tracks.extend(mixed_audio);
    CompositeStream::new(tracks)
}
