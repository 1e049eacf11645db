//! Message payloads exchanged between the panel, the controller and the media worker

use serde::{Deserialize, Serialize};

use super::capture::{CaptureState, KbpsInput};
use super::error::CaptureError;
use super::target::StreamHandle;

/// Payload of a `start-capture` request
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCapture {
    pub stream_handle: StreamHandle,
    pub tab_audio: bool,
    pub mic_audio: bool,
    pub frame_rate: u32,
    pub video_bitrate_kbps: KbpsInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

/// Payload of a `resize-still-image` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeStillImage {
    pub data_url: String,
    pub scale: f64,
    pub format: String,
    pub quality: u8,
}

/// Requests handled by the media worker
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerRequest {
    StartCapture(StartCapture),
    StopCapture,
    ResizeStillImage(ResizeStillImage),
}

impl WorkerRequest {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartCapture(_) => "start-capture",
            Self::StopCapture => "stop-capture",
            Self::ResizeStillImage(_) => "resize-still-image",
        }
    }
}

/// Reply to a [`WorkerRequest`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl WorkerReply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn with_data_url(data_url: String) -> Self {
        Self {
            ok: true,
            data_url: Some(data_url),
            ..Self::default()
        }
    }

    pub fn failed(err: &CaptureError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            data_url: None,
        }
    }

    /// Convert back into a result on the controller side.
    ///
    /// The worker's message is kept verbatim.
    pub fn into_result(self) -> Result<Option<String>, CaptureError> {
        if self.ok {
            Ok(self.data_url)
        } else {
            Err(CaptureError::Worker(
                self.error
                    .unwrap_or_else(|| "media worker reported an unknown failure".to_string()),
            ))
        }
    }
}

/// Target size for `resize-window`: explicit width/height win over a preset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSizeRequest {
    pub preset: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WindowSizeRequest {
    pub fn preset(preset: impl Into<String>) -> Self {
        Self {
            preset: Some(preset.into()),
            ..Self::default()
        }
    }

    pub fn explicit(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }
}

/// Answer to a `status` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(with = "state_name")]
    pub state: CaptureState,
    pub recording_flag: bool,
    /// Flag says recording but the controller is idle
    pub stale: bool,
}

mod state_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::capture::CaptureState;

    pub fn serialize<S: Serializer>(state: &CaptureState, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(state.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<CaptureState, D::Error> {
        let name = String::deserialize(d)?;
        [
            CaptureState::Idle,
            CaptureState::CountingDown,
            CaptureState::Acquiring,
            CaptureState::Recording,
            CaptureState::Stopping,
        ]
        .into_iter()
        .find(|state| state.as_str() == name)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown capture state '{}'", name)))
    }
}

/// `{ ok, error }` shape every panel-facing command resolves to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusReport>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn failed(err: &CaptureError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            status: None,
        }
    }

    pub fn from_result(result: Result<(), CaptureError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(err) => Self::failed(&err),
        }
    }

    pub fn with_status(status: StatusReport) -> Self {
        Self {
            ok: true,
            error: None,
            status: Some(status),
        }
    }
}
