//! Video bitrate value object

use serde::{Deserialize, Serialize};

/// Bits per second used when the requested bitrate is unusable
pub const DEFAULT_VIDEO_BITS_PER_SECOND: u32 = 5_000_000;

/// Bitrate as it arrives from settings or the panel, in kbps.
///
/// Accepts both JSON numbers and strings; anything unparseable is
/// normalized to the default by [`VideoBitrate::from_kbps_input`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KbpsInput {
    Number(f64),
    Text(String),
}

impl KbpsInput {
    /// Numeric value, if any. Blank text counts as zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse().ok()
                }
            }
        }
    }
}

impl From<u32> for KbpsInput {
    fn from(kbps: u32) -> Self {
        Self::Number(kbps as f64)
    }
}

impl From<&str> for KbpsInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Positive encoder bitrate in bits per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VideoBitrate(u32);

impl VideoBitrate {
    /// From kbps; non-finite or non-positive values fall back to the default
    pub fn from_kbps(kbps: f64) -> Self {
        if kbps.is_finite() && kbps > 0.0 {
            let bits = (kbps * 1000.0).round().min(u32::MAX as f64) as u32;
            Self(bits.max(1))
        } else {
            Self::default()
        }
    }

    pub fn from_kbps_input(input: &KbpsInput) -> Self {
        input
            .as_number()
            .map(Self::from_kbps)
            .unwrap_or_default()
    }

    pub const fn bits_per_second(&self) -> u32 {
        self.0
    }
}

impl Default for VideoBitrate {
    fn default() -> Self {
        Self(DEFAULT_VIDEO_BITS_PER_SECOND)
    }
}
