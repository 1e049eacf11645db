//! CLI presenter for output formatting

use colored::*;

use crate::domain::window::WindowBoundsSnapshot;

/// Presenter for CLI output formatting.
///
/// Results go to stdout, status lines to stderr. Diagnostics are left to
/// `tracing`.
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list and state show)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One-line description of saved window geometry
    pub fn format_bounds(&self, snapshot: &WindowBoundsSnapshot) -> String {
        let bounds = snapshot.bounds;
        format!(
            "window {} at {},{} size {}x{}",
            snapshot.window_id, bounds.left, bounds.top, bounds.width, bounds.height
        )
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
