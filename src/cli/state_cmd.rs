//! Runtime state command handler

use crate::application::ports::RuntimeStateStore;
use crate::domain::error::StoreError;

use super::args::StateAction;
use super::presenter::Presenter;

/// Handle state subcommand
pub async fn handle_state_command<T: RuntimeStateStore>(
    action: StateAction,
    store: &T,
    presenter: &Presenter,
) -> Result<(), StoreError> {
    match action {
        StateAction::Show => handle_show(store, presenter).await,
        StateAction::Reset { all } => handle_reset(store, presenter, all).await,
    }
}

async fn handle_show<T: RuntimeStateStore>(
    store: &T,
    presenter: &Presenter,
) -> Result<(), StoreError> {
    let recording = store.recording_flag().await?;
    let bounds = store.bounds_snapshot().await?;

    presenter.key_value("path", &store.path().to_string_lossy());
    presenter.key_value("recording", &recording.to_string());
    presenter.key_value(
        "saved_window",
        &bounds
            .map(|snapshot| presenter.format_bounds(&snapshot))
            .unwrap_or_else(|| "(none)".to_string()),
    );

    if recording {
        presenter.warn("Recording flag is set; if nothing is recording, run `tab-capture state reset`");
    }
    Ok(())
}

async fn handle_reset<T: RuntimeStateStore>(
    store: &T,
    presenter: &Presenter,
    all: bool,
) -> Result<(), StoreError> {
    if store.recording_flag().await? {
        store.set_recording_flag(false).await?;
        presenter.success("Recording flag cleared");
    } else {
        presenter.info("Recording flag was not set");
    }

    if all {
        store.clear_bounds_snapshot().await?;
        presenter.success("Saved window geometry forgotten");
    }
    Ok(())
}
