//! Still image value objects

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest scale a still image may be reduced to
pub const MIN_STILL_SCALE: f64 = 0.1;

/// Smallest normalized quality for lossy formats
pub const MIN_STILL_QUALITY: f32 = 0.1;

/// Error when an image format name is not recognized
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid image format: \"{input}\". Valid formats are: png, jpeg, webp")]
pub struct InvalidImageFormat {
    pub input: String,
}

/// Error when a data URL cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid data URL: {0}")]
pub struct DataUrlError(pub String);

/// Still image encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [Self::Png, Self::Jpeg, Self::Webp];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used for saved captures
    pub const fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Whether a quality setting applies to this format
    pub const fn is_lossy(&self) -> bool {
        !matches!(self, Self::Png)
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.mime_type().eq_ignore_ascii_case(mime.trim()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = InvalidImageFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            _ => Err(InvalidImageFormat {
                input: s.to_string(),
            }),
        }
    }
}

/// Encoded still image together with its mime type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StillImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Encode as `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Parse a base64 data URL
    pub fn from_data_url(url: &str) -> Result<Self, DataUrlError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| DataUrlError("missing data: prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| DataUrlError("missing payload separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| DataUrlError("only base64 payloads are supported".to_string()))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| DataUrlError(e.to_string()))?;
        Ok(Self::new(mime_type, bytes))
    }

    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }
}

/// Normalized parameters for resizing a still image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSpec {
    /// Scale factor in `[0.1, 1.0]`
    pub scale: f64,
    pub format: ImageFormat,
    /// Quality in `[0.1, 1.0]`, present only for lossy formats
    pub quality: Option<f32>,
}

impl ResizeSpec {
    /// Build from raw inputs: a non-positive or non-finite scale means 1,
    /// quality is given on a 1-100 scale.
    pub fn normalize(scale: f64, format: ImageFormat, quality: u8) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale.clamp(MIN_STILL_SCALE, 1.0)
        } else {
            1.0
        };
        let quality = format
            .is_lossy()
            .then(|| (quality as f32 / 100.0).clamp(MIN_STILL_QUALITY, 1.0));
        Self {
            scale,
            format,
            quality,
        }
    }

    /// Output dimensions for a source of `width` x `height`, never below 1px
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let scaled = |value: u32| ((value as f64 * self.scale).round() as u32).max(1);
        (scaled(width), scaled(height))
    }
}

/// Output of the image resizer
#[derive(Debug, Clone, PartialEq)]
pub struct ResizedImage {
    pub image: StillImage,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub quality: Option<f32>,
}
