//! Domain layer - Core capture logic
//!
//! Contains value objects, the capture lifecycle, message payloads and errors.
//! This layer has no dependencies on external systems.

pub mod artifact;
pub mod capture;
pub mod config;
pub mod error;
pub mod messages;
pub mod still;
pub mod target;
pub mod window;

// Re-export common types
pub use capture::{CaptureLifecycle, CaptureState, ChunkSequence, ContainerBlob, VideoBitrate};
pub use config::{CaptureOptions, CaptureSettings, RecordingOverrides};
pub use error::*;
pub use messages::{CommandResponse, StatusReport, WindowSizeRequest, WorkerReply, WorkerRequest};
pub use still::{ImageFormat, ResizeSpec, ResizedImage, StillImage};
pub use target::{StreamHandle, TabId, TabInfo, WindowId};
pub use window::{PageMetrics, ViewportSize, WindowBounds, WindowBoundsSnapshot, WindowUpdate};
