//! Runtime state port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::error::StoreError;
use crate::domain::window::WindowBoundsSnapshot;

/// Port for state that outlives the controller: the recording flag and
/// the single saved window geometry
#[async_trait]
pub trait RuntimeStateStore: Send + Sync {
    async fn recording_flag(&self) -> Result<bool, StoreError>;

    async fn set_recording_flag(&self, active: bool) -> Result<(), StoreError>;

    /// Save `snapshot` unless one is already stored, as a single step.
    ///
    /// # Returns
    /// `true` if the snapshot was written
    async fn save_bounds_if_absent(&self, snapshot: WindowBoundsSnapshot)
        -> Result<bool, StoreError>;

    async fn bounds_snapshot(&self) -> Result<Option<WindowBoundsSnapshot>, StoreError>;

    async fn clear_bounds_snapshot(&self) -> Result<(), StoreError>;

    fn path(&self) -> PathBuf;
}
