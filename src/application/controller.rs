//! Capture controller: the privileged side of the capture lifecycle
//!
//! Resolves the target tab, runs the countdown, obtains the stream handle
//! and delegates the media work to the worker. Also owns the screenshot
//! pipeline and window resize bookkeeping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

use super::countdown::{run_countdown, CountdownOutcome};
use super::ports::{Browser, Downloads, OverlaySurface, RuntimeStateStore, SettingsStore};
use super::worker::{WorkerClient, WorkerNotice};
use crate::domain::artifact;
use crate::domain::capture::{CaptureLifecycle, CaptureState};
use crate::domain::config::{CaptureOptions, CaptureSettings, RecordingOverrides};
use crate::domain::error::CaptureError;
use crate::domain::messages::{ResizeStillImage, StartCapture, StatusReport, WindowSizeRequest};
use crate::domain::still::StillImage;
use crate::domain::target::{TabId, TabInfo};
use crate::domain::window::{CaptureLimits, ViewportSize, WindowBoundsSnapshot, WindowUpdate};

/// Browser-side collaborators of the controller
pub struct ControllerPorts<B, O, D, C, T> {
    pub browser: Arc<B>,
    pub overlay: Arc<O>,
    pub downloads: Arc<D>,
    pub settings: Arc<C>,
    pub state: Arc<T>,
}

pub struct CaptureController<B, O, D, C, T>
where
    B: Browser,
    O: OverlaySurface,
    D: Downloads,
    C: SettingsStore,
    T: RuntimeStateStore,
{
    browser: Arc<B>,
    overlay: Arc<O>,
    downloads: Arc<D>,
    settings: Arc<C>,
    state: Arc<T>,
    worker: WorkerClient,
    lifecycle: Mutex<CaptureLifecycle>,
    cancelling: AtomicBool,
    start_cancelled: Notify,
}

impl<B, O, D, C, T> CaptureController<B, O, D, C, T>
where
    B: Browser,
    O: OverlaySurface,
    D: Downloads,
    C: SettingsStore,
    T: RuntimeStateStore,
{
    pub fn new(ports: ControllerPorts<B, O, D, C, T>, worker: WorkerClient) -> Self {
        Self {
            browser: ports.browser,
            overlay: ports.overlay,
            downloads: ports.downloads,
            settings: ports.settings,
            state: ports.state,
            worker,
            lifecycle: Mutex::new(CaptureLifecycle::new()),
            cancelling: AtomicBool::new(false),
            start_cancelled: Notify::new(),
        }
    }

    pub async fn state(&self) -> CaptureState {
        self.lifecycle.lock().await.state()
    }

    /// Start a recording of the active tab.
    ///
    /// `countdown` of `None` uses the stored countdown. Every failure returns
    /// the controller to idle with the recording flag cleared.
    pub async fn start_recording(
        &self,
        countdown: Option<i64>,
        overrides: RecordingOverrides,
    ) -> Result<(), CaptureError> {
        let tab = {
            let mut lifecycle = self.lifecycle.lock().await;
            if !lifecycle.is_idle() {
                return Err(CaptureError::AlreadyRecording);
            }
            let tab = self.resolve_target("recording").await?;
            lifecycle.begin_countdown(tab.id)?;
            tab
        };
        self.set_recording_flag(true).await;
        info!(tab = %tab.id, "Recording requested");

        let options = self.load_options(&overrides).await;
        match self.run_start_sequence(&tab, countdown, &options).await {
            Ok(()) => {
                self.lifecycle.lock().await.mark_recording()?;
                info!(tab = %tab.id, "Recording");
                Ok(())
            }
            Err(err) => {
                self.lifecycle.lock().await.fail(err.to_string());
                self.set_recording_flag(false).await;
                warn!(tab = %tab.id, error = %err, "Recording failed to start");
                Err(err)
            }
        }
    }

    async fn run_start_sequence(
        &self,
        tab: &TabInfo,
        countdown: Option<i64>,
        options: &CaptureOptions,
    ) -> Result<(), CaptureError> {
        let limits = self.capture_limits(tab.id, options.resolution_scale).await;

        let seconds = countdown.unwrap_or(i64::from(options.countdown_seconds));
        let outcome = run_countdown(
            self.overlay.as_ref(),
            tab.id,
            seconds,
            self.start_cancelled(),
        )
        .await
        .map_err(|err| CaptureError::OverlayInjectionFailed(err.to_string()))?;
        if outcome == CountdownOutcome::Cancelled {
            return Err(CaptureError::Cancelled);
        }

        self.lifecycle.lock().await.begin_acquiring()?;
        let stream_handle = self.browser.media_stream_handle(tab.id).await?;

        self.worker
            .start_capture(StartCapture {
                stream_handle,
                tab_audio: options.tab_audio,
                mic_audio: options.mic_audio,
                frame_rate: options.frame_rate,
                video_bitrate_kbps: options.video_bitrate_kbps.clone(),
                max_width: limits.map(|l| l.max_width),
                max_height: limits.map(|l| l.max_height),
            })
            .await
    }

    /// Size limits for a downscaled recording; a failed query means no limit.
    async fn capture_limits(&self, tab: TabId, scale: f64) -> Option<CaptureLimits> {
        if scale >= 1.0 {
            return None;
        }
        match self.browser.page_metrics(tab).await {
            Ok(metrics) => metrics.capture_limits(scale),
            Err(err) => {
                debug!(tab = %tab, error = %err, "Page size unavailable, recording without limit");
                None
            }
        }
    }

    /// Stop the active recording.
    ///
    /// Only valid once the recording has fully started.
    pub async fn stop_recording(&self) -> Result<(), CaptureError> {
        self.lifecycle.lock().await.begin_stopping()?;
        info!("Stopping recording");

        let result = self.worker.stop_capture().await;

        {
            let mut lifecycle = self.lifecycle.lock().await;
            match &result {
                Ok(()) => lifecycle.finish()?,
                Err(err) => lifecycle.fail(err.to_string()),
            }
        }
        self.set_recording_flag(false).await;

        if let Err(err) = &result {
            error!(error = %err, "Worker did not confirm the stop");
        }
        result
    }

    /// Keyboard shortcut: stop when a recording is active, otherwise start
    /// with the stored countdown.
    pub async fn toggle_recording(&self) -> Result<(), CaptureError> {
        if self.state().await.is_active() {
            self.stop_recording().await
        } else {
            self.start_recording(None, RecordingOverrides::default())
                .await
        }
    }

    /// Screenshot the visible area of the active tab and save it.
    ///
    /// # Returns
    /// Where the image was saved
    pub async fn capture_still(&self) -> Result<String, CaptureError> {
        let tab = self.resolve_target("screenshot").await?;
        let options = self.load_options(&RecordingOverrides::default()).await;
        let format = options.capture_format;
        let quality = format.is_lossy().then_some(options.capture_quality);

        let mut image = self
            .browser
            .capture_visible_tab(tab.window_id, format, quality)
            .await?;
        debug!(bytes = image.bytes.len(), format = %format, "Visible tab captured");

        if options.capture_scale < 1.0 {
            let data_url = self
                .worker
                .resize_still_image(ResizeStillImage {
                    data_url: image.to_data_url(),
                    scale: options.capture_scale,
                    format: format.to_string(),
                    quality: options.capture_quality,
                })
                .await?;
            image = StillImage::from_data_url(&data_url)
                .map_err(|err| CaptureError::DecodeFailed(err.to_string()))?;
        }

        let filename = artifact::capture_filename(artifact::now(), format);
        let location = self.downloads.save(&filename, &image.bytes).await?;
        info!(location = %location, "Screenshot saved");
        Ok(location)
    }

    /// Resize the active window so the page gets the requested viewport.
    ///
    /// The window's geometry is remembered before the first resize only.
    pub async fn resize_window(&self, request: WindowSizeRequest) -> Result<(), CaptureError> {
        let tab = self.resolve_target("resize").await?;
        let viewport = self.requested_viewport(&request).await?;

        let current = self.browser.window_bounds(tab.window_id).await?;
        let saved = self
            .state
            .save_bounds_if_absent(WindowBoundsSnapshot {
                window_id: tab.window_id,
                bounds: current,
            })
            .await?;
        if saved {
            debug!(window = %tab.window_id, "Original window size saved");
        }

        let metrics = self.browser.page_metrics(tab.id).await?;
        let (width, height) = metrics.outer_size_for(viewport);
        self.browser
            .set_window_bounds(tab.window_id, WindowUpdate::size(width, height))
            .await?;
        info!(viewport = %viewport, width, height, "Window resized");
        Ok(())
    }

    async fn requested_viewport(
        &self,
        request: &WindowSizeRequest,
    ) -> Result<ViewportSize, CaptureError> {
        if let (Some(width), Some(height)) = (request.width, request.height) {
            if width > 0 && height > 0 {
                return Ok(ViewportSize::new(width, height));
            }
        }
        let preset = match &request.preset {
            Some(preset) => preset.clone(),
            None => self.load_options(&RecordingOverrides::default()).await.default_window_size,
        };
        ViewportSize::from_preset(&preset)
            .map_err(|err| CaptureError::InvalidWindowSize(err.to_string()))?
            .ok_or_else(|| CaptureError::InvalidWindowSize("no window size selected".to_string()))
    }

    /// Restore the geometry saved before the first resize, then forget it.
    pub async fn reset_window_size(&self) -> Result<(), CaptureError> {
        let snapshot = self
            .state
            .bounds_snapshot()
            .await?
            .ok_or(CaptureError::NothingSaved)?;

        self.browser
            .set_window_bounds(snapshot.window_id, WindowUpdate::from(snapshot.bounds))
            .await?;
        self.state.clear_bounds_snapshot().await?;
        info!(window = %snapshot.window_id, "Window size restored");
        Ok(())
    }

    /// Save a finished recording handed over by the worker.
    ///
    /// The file's existence is what matters, so failures are only logged.
    pub async fn handle_notice(&self, notice: WorkerNotice) {
        match notice {
            WorkerNotice::CaptureCompleted { blob, filename } => {
                match self.downloads.save(&filename, &blob.bytes).await {
                    Ok(location) => {
                        info!(location = %location, size = %blob.human_readable_size(), "Recording saved")
                    }
                    Err(err) => {
                        error!(filename = %filename, error = %CaptureError::from(err), "Recording could not be saved")
                    }
                }
            }
        }
    }

    /// A tab was closed; stop the recording if it was the target.
    pub async fn tab_closed(&self, tab: TabId) -> Result<(), CaptureError> {
        let (target, recording) = {
            let lifecycle = self.lifecycle.lock().await;
            (lifecycle.target(), lifecycle.is_recording())
        };
        if target != Some(tab) {
            return Ok(());
        }
        if !recording {
            debug!(tab = %tab, "Target closed before recording started");
            return Ok(());
        }
        info!(tab = %tab, "Recorded tab closed");
        self.stop_recording().await
    }

    pub async fn status(&self) -> StatusReport {
        let state = self.state().await;
        let recording_flag = self.read_recording_flag().await;
        StatusReport {
            state,
            recording_flag,
            stale: recording_flag && !state.is_active(),
        }
    }

    /// Clear a recording flag left behind by an unexpected restart.
    pub async fn reset_recording_state(&self) -> Result<(), CaptureError> {
        if self.state().await.is_active() {
            return Err(CaptureError::AlreadyRecording);
        }
        self.state.set_recording_flag(false).await?;
        info!("Recording flag reset");
        Ok(())
    }

    /// Abort a start that is still counting down.
    ///
    /// A start already acquiring streams runs to completion; `shutdown`
    /// then stops it like any other recording.
    pub fn cancel_pending_start(&self) {
        self.cancelling.store(true, Ordering::SeqCst);
        self.start_cancelled.notify_waiters();
    }

    async fn start_cancelled(&self) {
        loop {
            let notified = self.start_cancelled.notified();
            if self.cancelling.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    /// Stop an active recording before the process goes away.
    ///
    /// Starts still in flight should be cancelled and awaited first.
    pub async fn shutdown(&self) -> Result<(), CaptureError> {
        let state = self.state().await;
        if state == CaptureState::Recording {
            info!("Shutting down with an active recording");
            return self.stop_recording().await;
        }
        if state.is_active() {
            warn!(state = %state, "Shutting down while a recording is starting");
        }
        Ok(())
    }

    /// Log a recording flag that no live session backs.
    pub async fn check_stale_flag(&self) -> bool {
        let stale = self.status().await.stale;
        if stale {
            warn!(
                path = %self.state.path().display(),
                "Recording flag is set but nothing is recording; reset it with 'tab-capture state reset'"
            );
        }
        stale
    }

    async fn resolve_target(&self, operation: &str) -> Result<TabInfo, CaptureError> {
        let tab = self
            .browser
            .active_tab()
            .await?
            .ok_or(CaptureError::NoActiveTab)?;
        if !tab.is_capturable() {
            return Err(CaptureError::InvalidTarget(format!(
                "{} is not allowed on {}",
                operation,
                tab.url.as_deref().filter(|u| !u.is_empty()).unwrap_or("this page")
            )));
        }
        Ok(tab)
    }

    async fn load_options(&self, overrides: &RecordingOverrides) -> CaptureOptions {
        let stored = match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Settings unavailable, using defaults");
                CaptureSettings::empty()
            }
        };
        CaptureOptions::resolve(&stored, overrides)
    }

    async fn read_recording_flag(&self) -> bool {
        self.state.recording_flag().await.unwrap_or_else(|err| {
            warn!(error = %err, "Recording flag unreadable");
            false
        })
    }

    async fn set_recording_flag(&self, active: bool) {
        if let Err(err) = self.state.set_recording_flag(active).await {
            warn!(active, error = %err, "Recording flag could not be saved");
        }
    }
}
