//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, logging setup and the
//! command handlers.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod logging;
pub mod presenter;
pub mod resize_cmd;
pub mod state_cmd;

// Re-export commonly used types
pub use app::{load_merged_settings, EXIT_ERROR};
pub use args::{Cli, Commands, ConfigAction, ResizeArgs, StateAction};
pub use presenter::Presenter;
