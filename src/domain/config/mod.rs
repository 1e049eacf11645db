//! Capture settings and option snapshots

mod capture_settings;
mod options;

pub use capture_settings::{
    CaptureSettings, DEFAULT_CAPTURE_QUALITY, DEFAULT_COUNTDOWN_SECONDS, DEFAULT_FRAME_RATE,
    DEFAULT_VIDEO_BITRATE_KBPS, DEFAULT_WINDOW_SIZE,
};
pub use options::{CaptureOptions, RecordingOverrides};
