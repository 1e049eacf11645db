//! XDG settings store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::SettingsStore;
use crate::domain::config::CaptureSettings;
use crate::domain::error::StoreError;
use crate::infrastructure::APP_DIR;

/// XDG-compliant settings store
pub struct XdgSettingsStore {
    path: PathBuf,
}

impl XdgSettingsStore {
    /// Create a store at `$XDG_CONFIG_HOME/tab-capture/config.toml`
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<CaptureSettings, StoreError> {
        toml::from_str(content).map_err(|e| StoreError::ParseError(e.to_string()))
    }

    fn to_toml(settings: &CaptureSettings) -> Result<String, StoreError> {
        toml::to_string_pretty(settings).map_err(|e| StoreError::WriteError(e.to_string()))
    }
}

impl Default for XdgSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for XdgSettingsStore {
    async fn load(&self) -> Result<CaptureSettings, StoreError> {
        if !self.exists() {
            debug!(path = %self.path.display(), "No settings file, using defaults");
            return Ok(CaptureSettings::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::ReadError(format!("{}: {}", self.path.display(), e)))?;

        Self::parse_toml(&content)
    }

    async fn save(&self, settings: &CaptureSettings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(settings)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| StoreError::WriteError(format!("{}: {}", self.path.display(), e)))?;

        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), StoreError> {
        if self.exists() {
            return Err(StoreError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        self.save(&CaptureSettings::defaults()).await
    }
}
