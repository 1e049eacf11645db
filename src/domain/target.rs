//! Capture targets: tabs, windows and stream handles

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL prefixes of pages that may never be captured or resized.
pub const BLOCKED_URL_PREFIXES: &[&str] = &["chrome://", "chrome-extension://", "edge://", "about:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The tab a command operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    pub url: Option<String>,
}

impl TabInfo {
    /// Whether the page in this tab may be captured
    pub fn is_capturable(&self) -> bool {
        !is_blocked_url(self.url.as_deref())
    }
}

/// A page without a URL is treated as blocked.
pub fn is_blocked_url(url: Option<&str>) -> bool {
    match url {
        None => true,
        Some(url) if url.is_empty() => true,
        Some(url) => BLOCKED_URL_PREFIXES
            .iter()
            .any(|prefix| url.starts_with(prefix)),
    }
}

/// Opaque single-use token authorizing one capture of a tab's media.
///
/// Not `Clone`: handing it to the acquirer consumes it.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamHandle(String);

impl StreamHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
