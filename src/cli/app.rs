//! Shared helpers for the command handlers

use tracing::warn;

use crate::application::ports::SettingsStore;
use crate::domain::config::CaptureSettings;

use super::presenter::Presenter;

/// Exit code for a failed command. Usage errors exit with clap's code 2.
pub const EXIT_ERROR: u8 = 1;

/// Load stored settings layered over the defaults.
///
/// A settings file that cannot be read is reported and ignored.
pub async fn load_merged_settings<S: SettingsStore>(
    store: &S,
    presenter: &Presenter,
) -> CaptureSettings {
    match store.load().await {
        Ok(stored) => CaptureSettings::defaults().merge(stored),
        Err(err) => {
            warn!(error = %err, path = %store.path().display(), "Ignoring unreadable settings");
            presenter.warn(&format!("Using default settings: {}", err));
            CaptureSettings::defaults()
        }
    }
}
