//! Persisted capture settings value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::KbpsInput;
use crate::domain::still::ImageFormat;
use crate::domain::window::ViewportSize;

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 3;
pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const DEFAULT_VIDEO_BITRATE_KBPS: u32 = 5000;
pub const DEFAULT_CAPTURE_QUALITY: u8 = 90;
pub const DEFAULT_WINDOW_SIZE: &str = "1280x720";

/// Capture settings as stored on disk.
/// All fields are optional to support partial files and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub tab_audio: Option<bool>,
    pub mic_audio: Option<bool>,
    pub countdown_seconds: Option<u32>,
    pub frame_rate: Option<u32>,
    pub video_bitrate_kbps: Option<u32>,
    pub resolution_scale: Option<f64>,
    pub capture_format: Option<String>,
    pub capture_quality: Option<u8>,
    pub capture_scale: Option<f64>,
    pub default_window_size: Option<String>,
}

impl CaptureSettings {
    /// Create settings with default values
    pub fn defaults() -> Self {
        Self {
            tab_audio: Some(true),
            mic_audio: Some(false),
            countdown_seconds: Some(DEFAULT_COUNTDOWN_SECONDS),
            frame_rate: Some(DEFAULT_FRAME_RATE),
            video_bitrate_kbps: Some(DEFAULT_VIDEO_BITRATE_KBPS),
            resolution_scale: Some(1.0),
            capture_format: Some(ImageFormat::default().to_string()),
            capture_quality: Some(DEFAULT_CAPTURE_QUALITY),
            capture_scale: Some(1.0),
            default_window_size: Some(DEFAULT_WINDOW_SIZE.to_string()),
        }
    }

    /// Create empty settings (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            tab_audio: other.tab_audio.or(self.tab_audio),
            mic_audio: other.mic_audio.or(self.mic_audio),
            countdown_seconds: other.countdown_seconds.or(self.countdown_seconds),
            frame_rate: other.frame_rate.or(self.frame_rate),
            video_bitrate_kbps: other.video_bitrate_kbps.or(self.video_bitrate_kbps),
            resolution_scale: other.resolution_scale.or(self.resolution_scale),
            capture_format: other.capture_format.or(self.capture_format),
            capture_quality: other.capture_quality.or(self.capture_quality),
            capture_scale: other.capture_scale.or(self.capture_scale),
            default_window_size: other.default_window_size.or(self.default_window_size),
        }
    }

    pub fn tab_audio_or_default(&self) -> bool {
        self.tab_audio.unwrap_or(true)
    }

    pub fn mic_audio_or_default(&self) -> bool {
        self.mic_audio.unwrap_or(false)
    }

    pub fn countdown_seconds_or_default(&self) -> u32 {
        self.countdown_seconds.unwrap_or(DEFAULT_COUNTDOWN_SECONDS)
    }

    pub fn frame_rate_or_default(&self) -> u32 {
        self.frame_rate
            .filter(|rate| *rate > 0)
            .unwrap_or(DEFAULT_FRAME_RATE)
    }

    pub fn video_bitrate_or_default(&self) -> KbpsInput {
        KbpsInput::from(self.video_bitrate_kbps.unwrap_or(DEFAULT_VIDEO_BITRATE_KBPS))
    }

    /// Get resolution scale, or 1 if not set or out of `(0, 1]`
    pub fn resolution_scale_or_default(&self) -> f64 {
        self.resolution_scale
            .filter(|scale| scale.is_finite() && *scale > 0.0 && *scale <= 1.0)
            .unwrap_or(1.0)
    }

    /// Get capture format as parsed ImageFormat, or default if not set/invalid
    pub fn capture_format_or_default(&self) -> ImageFormat {
        self.capture_format
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn capture_quality_or_default(&self) -> u8 {
        self.capture_quality
            .map(|quality| quality.clamp(1, 100))
            .unwrap_or(DEFAULT_CAPTURE_QUALITY)
    }

    pub fn capture_scale_or_default(&self) -> f64 {
        self.capture_scale
            .filter(|scale| scale.is_finite() && *scale > 0.0 && *scale <= 1.0)
            .unwrap_or(1.0)
    }

    /// Get window size preset, or "1280x720" if not set or unparseable
    pub fn default_window_size_or_default(&self) -> &str {
        self.default_window_size
            .as_deref()
            .filter(|preset| ViewportSize::from_preset(preset).is_ok())
            .unwrap_or(DEFAULT_WINDOW_SIZE)
    }
}
