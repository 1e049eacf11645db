//! Config command handler

use crate::application::ports::SettingsStore;
use crate::domain::config::CaptureSettings;
use crate::domain::error::StoreError;
use crate::domain::still::ImageFormat;
use crate::domain::window::ViewportSize;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: SettingsStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), StoreError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: SettingsStore>(store: &S, presenter: &Presenter) -> Result<(), StoreError> {
    store.init().await?;
    presenter.success(&format!(
        "Settings file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: SettingsStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), StoreError> {
    check_key(key)?;

    let mut settings = store.load().await?;
    apply_value(&mut settings, key, value)?;

    store.save(&settings).await?;
    presenter.success(&format!(
        "{} = {}",
        key,
        read_value(&settings, key).unwrap_or_else(|| value.to_string())
    ));

    Ok(())
}

async fn handle_get<S: SettingsStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), StoreError> {
    check_key(key)?;

    let settings = store.load().await?;
    match read_value(&settings, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: SettingsStore>(store: &S, presenter: &Presenter) -> Result<(), StoreError> {
    let settings = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            read_value(&settings, key).as_deref().unwrap_or(NOT_SET),
        );
    }

    Ok(())
}

fn handle_path<S: SettingsStore>(store: &S, presenter: &Presenter) -> Result<(), StoreError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(StoreError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> StoreError {
    StoreError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` for `key` and store it in normalized form
fn apply_value(settings: &mut CaptureSettings, key: &str, value: &str) -> Result<(), StoreError> {
    let value = value.trim();
    match key {
        "tab_audio" => settings.tab_audio = Some(parse_bool(key, value)?),
        "mic_audio" => settings.mic_audio = Some(parse_bool(key, value)?),
        "countdown_seconds" => {
            let seconds = value
                .parse::<u32>()
                .map_err(|_| invalid(key, "Value must be a whole number of seconds"))?;
            settings.countdown_seconds = Some(seconds);
        }
        "frame_rate" => {
            let rate = value
                .parse::<u32>()
                .ok()
                .filter(|rate| *rate > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive number of frames"))?;
            settings.frame_rate = Some(rate);
        }
        "video_bitrate_kbps" => {
            let kbps = value
                .parse::<u32>()
                .ok()
                .filter(|kbps| *kbps > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive number of kbps"))?;
            settings.video_bitrate_kbps = Some(kbps);
        }
        "resolution_scale" => settings.resolution_scale = Some(parse_scale(key, value)?),
        "capture_scale" => settings.capture_scale = Some(parse_scale(key, value)?),
        "capture_format" => {
            let format = value
                .parse::<ImageFormat>()
                .map_err(|e| invalid(key, e.to_string()))?;
            settings.capture_format = Some(format.to_string());
        }
        "capture_quality" => {
            let quality = value
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| invalid(key, "Value must be between 1 and 100"))?;
            settings.capture_quality = Some(quality);
        }
        "default_window_size" => {
            let size = ViewportSize::from_preset(value).map_err(|e| invalid(key, e.to_string()))?;
            settings.default_window_size = Some(
                size.map(|size| size.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            );
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn read_value(settings: &CaptureSettings, key: &str) -> Option<String> {
    match key {
        "tab_audio" => settings.tab_audio.map(|b| b.to_string()),
        "mic_audio" => settings.mic_audio.map(|b| b.to_string()),
        "countdown_seconds" => settings.countdown_seconds.map(|n| n.to_string()),
        "frame_rate" => settings.frame_rate.map(|n| n.to_string()),
        "video_bitrate_kbps" => settings.video_bitrate_kbps.map(|n| n.to_string()),
        "resolution_scale" => settings.resolution_scale.map(|n| n.to_string()),
        "capture_format" => settings.capture_format.clone(),
        "capture_quality" => settings.capture_quality.map(|n| n.to_string()),
        "capture_scale" => settings.capture_scale.map(|n| n.to_string()),
        "default_window_size" => settings.default_window_size.clone(),
        _ => None,
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, StoreError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, "Value must be 'true' or 'false'")),
    }
}

fn parse_scale(key: &str, value: &str) -> Result<f64, StoreError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|scale| scale.is_finite() && *scale >= 0.1 && *scale <= 1.0)
        .ok_or_else(|| invalid(key, "Value must be between 0.1 and 1.0"))
}
