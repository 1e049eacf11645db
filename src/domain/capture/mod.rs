//! Recording domain: lifecycle state, bitrate and encoded chunks

mod bitrate;
mod chunks;
mod state;

pub use bitrate::{KbpsInput, VideoBitrate, DEFAULT_VIDEO_BITS_PER_SECOND};
pub use chunks::{
    human_readable_size, pick_mime_type, ChunkSequence, ContainerBlob, CHUNK_INTERVAL, CODEC_PREFERENCES,
    OUTPUT_MIME_TYPE,
};
pub use state::{CaptureLifecycle, CaptureState, InvalidStateTransition, TransitionAction};
