//! Per-operation option snapshots

use serde::{Deserialize, Serialize};

use super::capture_settings::CaptureSettings;
use crate::domain::capture::KbpsInput;
use crate::domain::still::ImageFormat;

/// Explicit fields supplied with a start request; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOverrides {
    pub tab_audio: Option<bool>,
    pub mic_audio: Option<bool>,
    pub frame_rate: Option<u32>,
    pub video_bitrate_kbps: Option<KbpsInput>,
    pub resolution_scale: Option<f64>,
}

/// Immutable snapshot of preferences taken when a recording or screenshot starts
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    pub tab_audio: bool,
    pub mic_audio: bool,
    pub frame_rate: u32,
    pub video_bitrate_kbps: KbpsInput,
    pub resolution_scale: f64,
    pub capture_format: ImageFormat,
    pub capture_quality: u8,
    pub capture_scale: f64,
    pub countdown_seconds: u32,
    pub default_window_size: String,
}

impl CaptureOptions {
    /// Resolve from stored settings alone
    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self {
            tab_audio: settings.tab_audio_or_default(),
            mic_audio: settings.mic_audio_or_default(),
            frame_rate: settings.frame_rate_or_default(),
            video_bitrate_kbps: settings.video_bitrate_or_default(),
            resolution_scale: settings.resolution_scale_or_default(),
            capture_format: settings.capture_format_or_default(),
            capture_quality: settings.capture_quality_or_default(),
            capture_scale: settings.capture_scale_or_default(),
            countdown_seconds: settings.countdown_seconds_or_default(),
            default_window_size: settings.default_window_size_or_default().to_string(),
        }
    }

    /// Resolve from stored settings, then apply explicit overrides
    pub fn resolve(settings: &CaptureSettings, overrides: &RecordingOverrides) -> Self {
        let stored = Self::from_settings(settings);
        Self {
            tab_audio: overrides.tab_audio.unwrap_or(stored.tab_audio),
            mic_audio: overrides.mic_audio.unwrap_or(stored.mic_audio),
            frame_rate: overrides
                .frame_rate
                .filter(|rate| *rate > 0)
                .unwrap_or(stored.frame_rate),
            video_bitrate_kbps: overrides
                .video_bitrate_kbps
                .clone()
                .unwrap_or(stored.video_bitrate_kbps),
            resolution_scale: overrides
                .resolution_scale
                .unwrap_or(stored.resolution_scale),
            ..stored
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from_settings(&CaptureSettings::defaults())
    }
}
