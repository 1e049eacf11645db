//! Raster resizer backed by the `image` crate

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::application::ports::{ImageError, ImageResizer};
use crate::domain::still::{ImageFormat, ResizeSpec, ResizedImage, StillImage};

/// Decodes, scales and re-encodes still images in memory
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterResizer;

impl RasterResizer {
    pub fn new() -> Self {
        Self
    }

    fn encode(
        image: &DynamicImage,
        format: ImageFormat,
        quality: Option<f32>,
    ) -> Result<Vec<u8>, ImageError> {
        let mut bytes: Vec<u8> = Vec::new();
        let (width, height) = (image.width(), image.height());

        let result = match format {
            ImageFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(&mut bytes).write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
            }
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = image.to_rgb8();
                let quality = (quality.unwrap_or(1.0) * 100.0).round().clamp(1.0, 100.0) as u8;
                JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            ImageFormat::Webp => {
                // The pure-Rust WebP encoder only writes lossless images
                let rgba = image.to_rgba8();
                WebPEncoder::new_lossless(&mut bytes).write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
            }
        };

        result.map_err(|e| ImageError::EncodeFailed(format!("Failed to encode {}: {}", format, e)))?;

        if bytes.is_empty() {
            return Err(ImageError::EncodeFailed(format!(
                "{} encoder produced no data",
                format
            )));
        }
        Ok(bytes)
    }
}

impl ImageResizer for RasterResizer {
    fn resize(&self, source: &StillImage, spec: &ResizeSpec) -> Result<ResizedImage, ImageError> {
        let decoded = image::load_from_memory(&source.bytes)
            .map_err(|e| ImageError::DecodeFailed(format!("Failed to decode image: {}", e)))?;

        let (width, height) = spec.target_dimensions(decoded.width(), decoded.height());
        let scaled = if (width, height) == (decoded.width(), decoded.height()) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };

        let bytes = Self::encode(&scaled, spec.format, spec.quality)?;
        debug!(
            width,
            height,
            format = %spec.format,
            size = bytes.len(),
            "Still image resized"
        );

        Ok(ResizedImage {
            image: StillImage::new(spec.format.mime_type(), bytes),
            width,
            height,
            format: spec.format,
            quality: spec.quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png_source(width: u32, height: u32) -> StillImage {
        let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
            });
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(buffer.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        StillImage::new("image/png", bytes)
    }

    #[test]
    fn full_hd_to_half_jpeg() {
        let source = png_source(1920, 1080);
        let spec = ResizeSpec::normalize(0.5, ImageFormat::Jpeg, 50);

        let resized = RasterResizer::new().resize(&source, &spec).unwrap();

        assert_eq!((resized.width, resized.height), (960, 540));
        assert_eq!(resized.image.mime_type, "image/jpeg");
        assert_eq!(resized.quality, Some(0.5));
        let decoded = image::load_from_memory(&resized.image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (960, 540));
    }

    #[test]
    fn png_keeps_size_at_full_scale() {
        let source = png_source(40, 30);
        let spec = ResizeSpec::normalize(1.0, ImageFormat::Png, 90);

        let resized = RasterResizer::new().resize(&source, &spec).unwrap();

        assert_eq!((resized.width, resized.height), (40, 30));
        assert_eq!(resized.quality, None);
        assert!(resized.image.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn webp_output_decodes() {
        let source = png_source(64, 64);
        let spec = ResizeSpec::normalize(0.25, ImageFormat::Webp, 80);

        let resized = RasterResizer::new().resize(&source, &spec).unwrap();

        assert_eq!(resized.image.mime_type, "image/webp");
        let decoded = image::load_from_memory(&resized.image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let source = StillImage::new("image/png", b"not an image".to_vec());
        let spec = ResizeSpec::normalize(0.5, ImageFormat::Png, 90);

        let err = RasterResizer::new().resize(&source, &spec).unwrap_err();
        assert!(matches!(err, ImageError::DecodeFailed(_)));
    }
}
