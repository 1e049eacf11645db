//! tab-capture - Browser tab recording and screenshot core
//!
//! This crate provides the capture pipeline behind a tab recorder: the
//! controller state machine, stream acquisition, audio mixing, encoding
//! into a WebM container, countdown overlays, still image capture and
//! window resizing.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the capture state machine, message payloads and errors
//! - **Application**: Pipeline components, the controller and media worker, and port interfaces (traits)
//! - **Infrastructure**: Adapters that work outside a browser (settings, state, downloads, images)
//! - **CLI**: Command-line interface for settings, still images and runtime state
//!
//! Browser-bound collaborators (tab media, mixing graphs, media encoders,
//! page overlays, tabs and windows) are ports implemented by the host.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
