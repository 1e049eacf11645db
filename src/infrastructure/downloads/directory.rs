//! Saves artifacts into a directory on disk

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::application::ports::{DownloadError, Downloads};

const MAX_SUFFIX: u32 = 999;

/// Writes files into the user's download directory.
///
/// An existing file is never overwritten; `name.webm` becomes
/// `name (1).webm`, `name (2).webm` and so on.
pub struct DirectoryDownloads {
    dir: Option<PathBuf>,
}

impl DirectoryDownloads {
    pub fn new() -> Self {
        Self {
            dir: dirs::download_dir(),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn candidate(dir: &Path, filename: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return dir.join(filename);
        }
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        match path.extension() {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, attempt, ext.to_string_lossy())),
            None => dir.join(format!("{} ({})", stem, attempt)),
        }
    }
}

impl Default for DirectoryDownloads {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloads for DirectoryDownloads {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, DownloadError> {
        let dir = self.dir.as_deref().ok_or(DownloadError::NoDirectory)?;
        fs::create_dir_all(dir)
            .await
            .map_err(|e| DownloadError::WriteFailed(format!("{}: {}", dir.display(), e)))?;

        for attempt in 0..=MAX_SUFFIX {
            let path = Self::candidate(dir, filename, attempt);
            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(DownloadError::WriteFailed(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            let written = async {
                file.write_all(bytes).await?;
                file.flush().await
            }
            .await;
            written
                .map_err(|e| DownloadError::WriteFailed(format!("{}: {}", path.display(), e)))?;

            info!(path = %path.display(), size = bytes.len(), "Saved download");
            return Ok(path.to_string_lossy().into_owned());
        }

        Err(DownloadError::WriteFailed(format!(
            "{}: too many files with this name",
            filename
        )))
    }
}
