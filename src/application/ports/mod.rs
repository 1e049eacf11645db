//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers. Browser-bound ports are implemented
//! by the embedding host.

pub mod browser;
pub mod config;
pub mod downloads;
pub mod encoder;
pub mod image;
pub mod media;
pub mod mixer;
pub mod overlay;
pub mod state;

// Re-export common types
pub use browser::{Browser, BrowserError};
pub use config::SettingsStore;
pub use downloads::{DownloadError, Downloads};
pub use encoder::{
    EncoderBackend, EncoderConfig, EncoderControl, EncoderError, EncoderEvent, RunningEncoder,
};
pub use self::image::{ImageError, ImageResizer};
pub use media::{
    AcquireError, CompositeStream, MediaStream, MediaTrack, TabConstraints, TabMediaSource,
    TrackHandle, TrackKind, TrackRef,
};
pub use mixer::{MixerError, MixingBackend, MixingGraph};
pub use overlay::{OverlayError, OverlaySurface};
pub use state::RuntimeStateStore;
