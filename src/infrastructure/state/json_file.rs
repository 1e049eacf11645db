//! JSON file runtime state adapter
//!
//! Holds the recording flag and the saved window geometry in a single
//! `state.json`. All access goes through one lock so the
//! check-then-write of [`RuntimeStateStore::save_bounds_if_absent`]
//! cannot interleave with another writer in this process.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ports::RuntimeStateStore;
use crate::domain::error::StoreError;
use crate::domain::window::WindowBoundsSnapshot;
use crate::infrastructure::APP_DIR;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    #[serde(default)]
    is_recording: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_window_bounds: Option<WindowBoundsSnapshot>,
}

/// Runtime state kept in `$XDG_STATE_HOME/tab-capture/state.json`
pub struct JsonStateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStateStore {
    pub fn new() -> Self {
        let dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("~/.local/state"))
            .join(APP_DIR);

        Self::with_path(dir.join("state.json"))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<StoredState, StoreError> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::ReadError(format!("{}: {}", self.path.display(), e)))?;

        if content.trim().is_empty() {
            return Ok(StoredState::default());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::ParseError(e.to_string()))
    }

    async fn write(&self, state: &StoredState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::WriteError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        // Replace the file in one rename so a crash never leaves it half written.
        let staging = self.staging_path();
        fs::write(&staging, content)
            .await
            .map_err(|e| StoreError::WriteError(format!("{}: {}", staging.display(), e)))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| StoreError::WriteError(format!("{}: {}", self.path.display(), e)))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeStateStore for JsonStateStore {
    async fn recording_flag(&self) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.is_recording)
    }

    async fn set_recording_flag(&self, active: bool) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        if state.is_recording == active && self.path.exists() {
            return Ok(());
        }
        state.is_recording = active;
        self.write(&state).await?;
        debug!(active, "Recording flag written");
        Ok(())
    }

    async fn save_bounds_if_absent(
        &self,
        snapshot: WindowBoundsSnapshot,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        if state.original_window_bounds.is_some() {
            return Ok(false);
        }
        state.original_window_bounds = Some(snapshot);
        self.write(&state).await?;
        debug!(window = snapshot.window_id.0, "Window bounds saved");
        Ok(true)
    }

    async fn bounds_snapshot(&self) -> Result<Option<WindowBoundsSnapshot>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.original_window_bounds)
    }

    async fn clear_bounds_snapshot(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        if state.original_window_bounds.take().is_none() {
            return Ok(());
        }
        self.write(&state).await
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::WindowId;
    use crate::domain::window::WindowBounds;

    fn snapshot(width: u32) -> WindowBoundsSnapshot {
        WindowBoundsSnapshot {
            window_id: WindowId(7),
            bounds: WindowBounds {
                width,
                height: 800,
                left: 10,
                top: 20,
            },
        }
    }

    fn store() -> (tempfile::TempDir, JsonStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::with_path(dir.path().join("state").join("state.json"));
        (dir, store)
    }

    #[test]
    fn default_path_is_under_app_dir() {
        let path = JsonStateStore::new().path();
        assert!(path.to_string_lossy().contains("tab-capture"));
        assert!(path.to_string_lossy().ends_with("state.json"));
    }

    #[tokio::test]
    async fn missing_file_reads_as_idle() {
        let (_dir, store) = store();
        assert!(!store.recording_flag().await.unwrap());
        assert!(store.bounds_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn flag_persists() {
        let (_dir, store) = store();
        store.set_recording_flag(true).await.unwrap();

        let reopened = JsonStateStore::with_path(store.path());
        assert!(reopened.recording_flag().await.unwrap());
    }

    #[tokio::test]
    async fn first_snapshot_wins() {
        let (_dir, store) = store();

        assert!(store.save_bounds_if_absent(snapshot(1400)).await.unwrap());
        assert!(!store.save_bounds_if_absent(snapshot(1280)).await.unwrap());

        let saved = store.bounds_snapshot().await.unwrap().unwrap();
        assert_eq!(saved.bounds.width, 1400);

        store.clear_bounds_snapshot().await.unwrap();
        assert!(store.bounds_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_uses_flat_camel_case_fields() {
        let (_dir, store) = store();
        store.save_bounds_if_absent(snapshot(1400)).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["isRecording"], false);
        assert_eq!(value["originalWindowBounds"]["windowId"], 7);
        assert_eq!(value["originalWindowBounds"]["width"], 1400);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.recording_flag().await.unwrap_err();
        assert!(matches!(err, StoreError::ParseError(_)));
    }

    #[tokio::test]
    async fn writes_replace_the_file_whole() {
        let (_dir, store) = store();
        let staging = store.staging_path();
        std::fs::create_dir_all(staging.parent().unwrap()).unwrap();
        // Left over from an interrupted write
        std::fs::write(&staging, "{\"isRec").unwrap();

        store.set_recording_flag(true).await.unwrap();
        store.save_bounds_if_absent(snapshot(1400)).await.unwrap();

        assert!(!staging.exists());
        let reopened = JsonStateStore::with_path(store.path());
        assert!(reopened.recording_flag().await.unwrap());
        assert_eq!(
            reopened.bounds_snapshot().await.unwrap().unwrap().bounds.width,
            1400
        );
    }

    #[test]
    fn staging_file_sits_next_to_state() {
        let store = JsonStateStore::with_path("/tmp/tab-capture/state.json");
        assert_eq!(
            store.staging_path(),
            PathBuf::from("/tmp/tab-capture/state.json.tmp")
        );
    }
}
