//! Browser tabs and windows port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::CaptureError;
use crate::domain::still::{ImageFormat, StillImage};
use crate::domain::target::{StreamHandle, TabId, TabInfo, WindowId};
use crate::domain::window::{PageMetrics, WindowBounds, WindowUpdate};

/// Browser API errors
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("Tab {0} is no longer available")]
    TabGone(TabId),

    #[error("{0}")]
    Request(String),
}

impl From<BrowserError> for CaptureError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::PermissionDenied(msg) => CaptureError::PermissionDenied(msg),
            BrowserError::TabGone(_) => CaptureError::InvalidTarget(err.to_string()),
            BrowserError::Request(msg) => CaptureError::Browser(msg),
        }
    }
}

/// Port for the privileged browser APIs used by the controller
#[async_trait]
pub trait Browser: Send + Sync {
    /// Active tab of the current window
    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError>;

    /// Viewport measurements of the page in `tab`
    async fn page_metrics(&self, tab: TabId) -> Result<PageMetrics, BrowserError>;

    /// Single-use handle for capturing `tab`
    async fn media_stream_handle(&self, tab: TabId) -> Result<StreamHandle, BrowserError>;

    /// Screenshot of the visible area of `window`'s active tab.
    /// `quality` is only passed for lossy formats.
    async fn capture_visible_tab(
        &self,
        window: WindowId,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<StillImage, BrowserError>;

    async fn window_bounds(&self, window: WindowId) -> Result<WindowBounds, BrowserError>;

    async fn set_window_bounds(
        &self,
        window: WindowId,
        update: WindowUpdate,
    ) -> Result<(), BrowserError>;
}
