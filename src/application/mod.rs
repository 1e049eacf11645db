//! Application layer - Capture components and port interfaces
//!
//! Contains the components of the capture pipeline, the controller and
//! worker that drive them, and the trait definitions for platform
//! interactions.

pub mod acquirer;
pub mod composer;
pub mod controller;
pub mod countdown;
pub mod encoder;
pub mod mixer;
pub mod ports;
pub mod runtime;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the main entry points
pub use acquirer::{AcquiredStreams, StreamAcquirer};
pub use composer::compose;
pub use controller::{CaptureController, ControllerPorts};
pub use countdown::{run_countdown, CountdownOutcome};
pub use encoder::EncoderSession;
pub use mixer::{AudioMixer, MixedAudio};
pub use runtime::{dispatch, spawn_runtime, ControllerCommand, ControllerHandle, Runtime, WorkerPorts};
pub use worker::{worker_channel, MediaWorker, WorkerClient, WorkerEnvelope, WorkerNotice};
