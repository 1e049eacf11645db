//! Window geometry value objects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::target::WindowId;

/// Error when a window size preset cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid window size: \"{input}\". Expected <width>x<height> (e.g., 1280x720)")]
pub struct ViewportSizeParseError {
    pub input: String,
}

/// Outer geometry of a browser window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
}

/// A window's geometry saved before the first resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBoundsSnapshot {
    pub window_id: WindowId,
    #[serde(flatten)]
    pub bounds: WindowBounds,
}

/// Requested change to a window's geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUpdate {
    pub width: u32,
    pub height: u32,
    pub left: Option<i32>,
    pub top: Option<i32>,
}

impl WindowUpdate {
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            left: None,
            top: None,
        }
    }
}

impl From<WindowBounds> for WindowUpdate {
    fn from(bounds: WindowBounds) -> Self {
        Self {
            width: bounds.width,
            height: bounds.height,
            left: Some(bounds.left),
            top: Some(bounds.top),
        }
    }
}

/// Page viewport size, written as `<width>x<height>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a window size preset. `"none"` and empty presets mean "no resize".
    pub fn from_preset(preset: &str) -> Result<Option<Self>, ViewportSizeParseError> {
        let trimmed = preset.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for ViewportSize {
    type Err = ViewportSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ViewportSizeParseError {
            input: s.to_string(),
        };
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
        let width: u32 = width.trim().parse().map_err(|_| err())?;
        let height: u32 = height.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Upper bounds on the captured video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub max_width: u32,
    pub max_height: u32,
}

/// Page measurements reported by the browser
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub inner_width: f64,
    pub inner_height: f64,
    pub outer_width: f64,
    pub outer_height: f64,
    pub device_pixel_ratio: f64,
}

impl PageMetrics {
    /// Outer window size that gives the page the requested viewport.
    ///
    /// Browser chrome (toolbars, borders) is the outer/inner difference, never negative.
    pub fn outer_size_for(&self, viewport: ViewportSize) -> (u32, u32) {
        let delta_width = (self.outer_width - self.inner_width).max(0.0);
        let delta_height = (self.outer_height - self.inner_height).max(0.0);
        (
            (viewport.width as f64 + delta_width).round() as u32,
            (viewport.height as f64 + delta_height).round() as u32,
        )
    }

    /// Resolution limits for a recording downscaled by `scale`.
    ///
    /// A scale of 1 or more (or an unusable one) means no limit.
    pub fn capture_limits(&self, scale: f64) -> Option<CaptureLimits> {
        if !scale.is_finite() || scale <= 0.0 || scale >= 1.0 {
            return None;
        }
        let dpr = if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        Some(CaptureLimits {
            max_width: (self.inner_width * dpr * scale).round() as u32,
            max_height: (self.inner_height * dpr * scale).round() as u32,
        })
    }
}
