//! Infrastructure layer - Adapter implementations
//!
//! Contains the concrete implementations of the ports that make sense
//! outside a browser: settings and runtime state on disk, a downloads
//! directory and an in-memory still image codec.

pub mod config;
pub mod downloads;
pub mod image;
pub mod state;

/// Directory name under the XDG config and state roots
pub const APP_DIR: &str = "tab-capture";

// Re-export adapters
pub use config::XdgSettingsStore;
pub use downloads::DirectoryDownloads;
pub use self::image::RasterResizer;
pub use state::JsonStateStore;
