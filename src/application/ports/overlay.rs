//! Countdown overlay port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::target::TabId;

/// Overlay errors
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    #[error("Failed to inject overlay: {0}")]
    InjectionFailed(String),

    #[error("Page is no longer available")]
    PageGone,
}

/// Port for the full-screen countdown rendered inside a page
#[async_trait]
pub trait OverlaySurface: Send + Sync {
    /// Show the overlay with `remaining` seconds.
    /// An overlay already present on the page is removed first.
    async fn mount(&self, tab: TabId, remaining: u32) -> Result<(), OverlayError>;

    async fn update(&self, tab: TabId, remaining: u32) -> Result<(), OverlayError>;

    async fn unmount(&self, tab: TabId) -> Result<(), OverlayError>;
}
