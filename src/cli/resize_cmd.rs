//! Resize command handler

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::debug;

use crate::application::ports::{ImageResizer, SettingsStore};
use crate::domain::capture::human_readable_size;
use crate::domain::error::CaptureError;
use crate::domain::still::{ImageFormat, ResizeSpec, ResizedImage, StillImage};

use super::app::load_merged_settings;
use super::args::ResizeArgs;
use super::presenter::Presenter;

/// Scale and re-encode an image file.
///
/// Unset options fall back to the stored capture settings.
///
/// # Returns
/// The path that was written
pub async fn handle_resize_command<S, R>(
    args: ResizeArgs,
    store: &S,
    resizer: Arc<R>,
    presenter: &Presenter,
) -> Result<PathBuf, CaptureError>
where
    S: SettingsStore,
    R: ImageResizer + 'static,
{
    let settings = load_merged_settings(store, presenter).await;
    let format = args
        .format
        .map(ImageFormat::from)
        .unwrap_or_else(|| settings.capture_format_or_default());
    let scale = args
        .scale
        .unwrap_or_else(|| settings.capture_scale_or_default());
    let quality = args
        .quality
        .unwrap_or_else(|| settings.capture_quality_or_default());
    let spec = ResizeSpec::normalize(scale, format, quality);
    debug!(?spec, input = %args.input.display(), "Resizing image");

    let bytes = fs::read(&args.input).await.map_err(|e| {
        CaptureError::DecodeFailed(format!("cannot read {}: {}", args.input.display(), e))
    })?;
    let source = StillImage::new(mime_for_path(&args.input), bytes);

    let resized: ResizedImage = tokio::task::spawn_blocking(move || resizer.resize(&source, &spec))
        .await
        .map_err(|err| CaptureError::EncodeFailed(err.to_string()))??;

    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input, resized.format));
    fs::write(&output, &resized.image.bytes).await.map_err(|e| {
        CaptureError::Download(format!("cannot write {}: {}", output.display(), e))
    })?;

    presenter.success(&format!(
        "Resized to {}x{} {} ({})",
        resized.width,
        resized.height,
        resized.format,
        human_readable_size(resized.image.bytes.len())
    ));
    presenter.output(&output.to_string_lossy());
    Ok(output)
}

fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<ImageFormat>().ok())
        .map(|format| format.mime_type())
        .unwrap_or("application/octet-stream")
}

/// `<dir>/<stem>-resized.<ext>` next to the input
fn default_output(input: &Path, format: ImageFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}-resized.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{RasterResizer, XdgSettingsStore};

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("/tmp/shot.png"), ImageFormat::Jpeg),
            PathBuf::from("/tmp/shot-resized.jpeg")
        );
    }

    #[tokio::test]
    async fn missing_input_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgSettingsStore::with_path(dir.path().join("config.toml"));
        let args = ResizeArgs {
            input: dir.path().join("missing.png"),
            scale: Some(0.5),
            format: None,
            quality: None,
            output: None,
        };

        let err = handle_resize_command(args, &store, Arc::new(RasterResizer::new()), &Presenter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CaptureError::DecodeFailed(_)));
    }
}
