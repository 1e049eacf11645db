//! In-memory port implementations shared by the application tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ports::{
    AcquireError, Browser, BrowserError, CompositeStream, DownloadError, Downloads,
    EncoderBackend, EncoderConfig, EncoderControl, EncoderError, EncoderEvent, MediaStream,
    MediaTrack, MixerError, MixingBackend, MixingGraph, OverlayError, OverlaySurface,
    RunningEncoder, RuntimeStateStore, SettingsStore, TabConstraints, TabMediaSource,
    TrackHandle, TrackKind, TrackRef,
};
use crate::domain::config::CaptureSettings;
use crate::domain::error::StoreError;
use crate::domain::still::{ImageFormat, StillImage};
use crate::domain::target::{StreamHandle, TabId, TabInfo, WindowId};
use crate::domain::window::{PageMetrics, WindowBounds, WindowBoundsSnapshot, WindowUpdate};
use std::path::PathBuf;

#[derive(Debug)]
pub struct FakeTrack {
    id: String,
    kind: TrackKind,
    stops: AtomicUsize,
}

impl FakeTrack {
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl TrackHandle for FakeTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Every track handed out, so tests can check stop counts afterwards
#[derive(Debug, Default)]
pub struct TrackLedger {
    tracks: Mutex<Vec<Arc<FakeTrack>>>,
}

impl TrackLedger {
    pub fn issue(&self, id: &str, kind: TrackKind) -> MediaTrack {
        let handle = Arc::new(FakeTrack {
            id: id.to_string(),
            kind,
            stops: AtomicUsize::new(0),
        });
        self.tracks.lock().unwrap().push(handle.clone());
        MediaTrack::new(handle)
    }

    pub fn issued(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }

    /// No live tracks and none stopped twice
    pub fn all_stopped_once(&self) -> bool {
        self.tracks.lock().unwrap().iter().all(|t| t.stops() == 1)
    }

    pub fn live(&self) -> usize {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.stops() == 0)
            .count()
    }
}

/// Tab and microphone source with scripted failures
#[derive(Default)]
pub struct FakeMedia {
    pub ledger: Arc<TrackLedger>,
    pub deny_tab: bool,
    pub deny_mic: bool,
    pub mic_silent: bool,
    pub last_constraints: Mutex<Option<TabConstraints>>,
}

#[async_trait]
impl TabMediaSource for FakeMedia {
    async fn open_tab_stream(
        &self,
        handle: StreamHandle,
        constraints: &TabConstraints,
    ) -> Result<MediaStream, AcquireError> {
        if self.deny_tab {
            return Err(AcquireError::PermissionDenied(format!(
                "tab capture rejected for {}",
                handle.as_str()
            )));
        }
        *self.last_constraints.lock().unwrap() = Some(*constraints);
        let mut tracks = vec![self.ledger.issue("tab-video", TrackKind::Video)];
        if constraints.tab_audio {
            tracks.push(self.ledger.issue("tab-audio", TrackKind::Audio));
        }
        Ok(MediaStream::new(tracks))
    }

    async fn open_microphone(&self) -> Result<MediaStream, AcquireError> {
        if self.deny_mic {
            return Err(AcquireError::PermissionDenied("microphone blocked".into()));
        }
        if self.mic_silent {
            return Ok(MediaStream::default());
        }
        Ok(MediaStream::new(vec![self.ledger.issue("mic", TrackKind::Audio)]))
    }
}

/// Mixing backend counting graph creation and closing
#[derive(Default)]
pub struct FakeMixer {
    pub ledger: Arc<TrackLedger>,
    pub created: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub connected: Arc<AtomicUsize>,
    pub fail_create: bool,
}

struct FakeGraph {
    output: Option<MediaTrack>,
    connected: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MixingGraph for FakeGraph {
    fn connect(&mut self, source: &[TrackRef]) -> Result<(), MixerError> {
        self.connected.fetch_add(source.len(), Ordering::SeqCst);
        Ok(())
    }

    fn take_output(&mut self) -> Option<MediaTrack> {
        self.output.take()
    }

    fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl MixingBackend for FakeMixer {
    fn create_graph(&self) -> Result<Box<dyn MixingGraph>, MixerError> {
        if self.fail_create {
            return Err(MixerError::CreateFailed("audio context unavailable".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeGraph {
            output: Some(self.ledger.issue("mixed-audio", TrackKind::Audio)),
            connected: self.connected.clone(),
            closed: self.closed.clone(),
        }))
    }
}

/// Encoder whose chunks are pushed by the test through `feed`
#[derive(Default)]
pub struct FakeEncoder {
    pub supported: Vec<&'static str>,
    pub fail_start: bool,
    pub never_starts: bool,
    pub feed: Arc<Mutex<Option<mpsc::UnboundedSender<EncoderEvent>>>>,
    pub last_config: Mutex<Option<EncoderConfig>>,
    pub last_track_ids: Mutex<Vec<String>>,
    pub stop_requests: Arc<AtomicUsize>,
}

impl FakeEncoder {
    pub fn supporting(supported: &[&'static str]) -> Self {
        Self {
            supported: supported.to_vec(),
            ..Self::default()
        }
    }

    pub fn push_chunk(&self, bytes: &[u8]) {
        if let Some(tx) = self.feed.lock().unwrap().as_ref() {
            let _ = tx.send(EncoderEvent::Chunk(bytes.to_vec()));
        }
    }
}

struct FakeControl {
    feed: Arc<Mutex<Option<mpsc::UnboundedSender<EncoderEvent>>>>,
    stop_requests: Arc<AtomicUsize>,
}

impl EncoderControl for FakeControl {
    fn request_stop(&self) {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.feed.lock().unwrap().take() {
            let _ = tx.send(EncoderEvent::Stopped);
        }
    }
}

impl EncoderBackend for FakeEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|supported| *supported == mime_type)
    }

    fn start(
        &self,
        stream: &CompositeStream,
        config: &EncoderConfig,
    ) -> Result<RunningEncoder, EncoderError> {
        if self.fail_start {
            return Err(EncoderError::StartFailed("unsupported stream".into()));
        }
        *self.last_config.lock().unwrap() = Some(*config);
        *self.last_track_ids.lock().unwrap() =
            stream.tracks().iter().map(|t| t.id().to_string()).collect();

        let (tx, events) = mpsc::unbounded_channel();
        if !self.never_starts {
            let _ = tx.send(EncoderEvent::Started);
        }
        *self.feed.lock().unwrap() = Some(tx);
        Ok(RunningEncoder {
            events,
            control: Box::new(FakeControl {
                feed: self.feed.clone(),
                stop_requests: self.stop_requests.clone(),
            }),
        })
    }
}

/// Browser with one window holding one tab
pub struct FakeBrowser {
    pub tab: Mutex<Option<TabInfo>>,
    pub metrics: Mutex<Option<PageMetrics>>,
    pub bounds: Mutex<WindowBounds>,
    pub updates: Mutex<Vec<(WindowId, WindowUpdate)>>,
    pub captures: Mutex<Vec<(ImageFormat, Option<u8>)>>,
    pub handles_issued: AtomicUsize,
}

impl FakeBrowser {
    pub const SCREENSHOT: &'static [u8] = b"\x89PNG-visible-tab";

    pub fn without_tab() -> Self {
        let browser = Self::default();
        *browser.tab.lock().unwrap() = None;
        browser
    }

    pub fn on_url(url: &str) -> Self {
        let browser = Self::default();
        if let Some(tab) = browser.tab.lock().unwrap().as_mut() {
            tab.url = Some(url.to_string());
        }
        browser
    }

    pub fn with_bounds(bounds: WindowBounds) -> Self {
        let browser = Self::default();
        *browser.bounds.lock().unwrap() = bounds;
        browser
    }

    pub fn updates(&self) -> Vec<(WindowId, WindowUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn captures(&self) -> Vec<(ImageFormat, Option<u8>)> {
        self.captures.lock().unwrap().clone()
    }

    pub fn current_bounds(&self) -> WindowBounds {
        *self.bounds.lock().unwrap()
    }
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self {
            tab: Mutex::new(Some(TabInfo {
                id: TabId(1),
                window_id: WindowId(1),
                url: Some("https://example.com/".to_string()),
            })),
            metrics: Mutex::new(Some(PageMetrics {
                inner_width: 1200.0,
                inner_height: 700.0,
                outer_width: 1216.0,
                outer_height: 788.0,
                device_pixel_ratio: 1.0,
            })),
            bounds: Mutex::new(WindowBounds {
                width: 1216,
                height: 788,
                left: 0,
                top: 0,
            }),
            updates: Mutex::new(Vec::new()),
            captures: Mutex::new(Vec::new()),
            handles_issued: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError> {
        Ok(self.tab.lock().unwrap().clone())
    }

    async fn page_metrics(&self, _tab: TabId) -> Result<PageMetrics, BrowserError> {
        self.metrics
            .lock()
            .unwrap()
            .ok_or_else(|| BrowserError::Request("scripting blocked".into()))
    }

    async fn media_stream_handle(&self, tab: TabId) -> Result<StreamHandle, BrowserError> {
        let n = self.handles_issued.fetch_add(1, Ordering::SeqCst);
        Ok(StreamHandle::new(format!("stream-{}-{}", tab, n)))
    }

    async fn capture_visible_tab(
        &self,
        _window: WindowId,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<StillImage, BrowserError> {
        self.captures.lock().unwrap().push((format, quality));
        Ok(StillImage::new(format.mime_type(), Self::SCREENSHOT.to_vec()))
    }

    async fn window_bounds(&self, _window: WindowId) -> Result<WindowBounds, BrowserError> {
        Ok(*self.bounds.lock().unwrap())
    }

    async fn set_window_bounds(
        &self,
        window: WindowId,
        update: WindowUpdate,
    ) -> Result<(), BrowserError> {
        let mut bounds = self.bounds.lock().unwrap();
        bounds.width = update.width;
        bounds.height = update.height;
        if let Some(left) = update.left {
            bounds.left = left;
        }
        if let Some(top) = update.top {
            bounds.top = top;
        }
        self.updates.lock().unwrap().push((window, update));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeOverlay {
    pub mounts: AtomicUsize,
    pub unmounts: AtomicUsize,
    pub fail_mount: bool,
}

#[async_trait]
impl OverlaySurface for FakeOverlay {
    async fn mount(&self, _tab: TabId, _remaining: u32) -> Result<(), OverlayError> {
        if self.fail_mount {
            return Err(OverlayError::InjectionFailed("cannot script this page".into()));
        }
        self.mounts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, _tab: TabId, _remaining: u32) -> Result<(), OverlayError> {
        Ok(())
    }

    async fn unmount(&self, _tab: TabId) -> Result<(), OverlayError> {
        self.unmounts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDownloads {
    files: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl MemoryDownloads {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloads for MemoryDownloads {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, DownloadError> {
        if self.fail {
            return Err(DownloadError::NoDirectory);
        }
        self.files
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(format!("/downloads/{}", filename))
    }
}

#[derive(Default)]
pub struct MemorySettings {
    pub settings: Mutex<CaptureSettings>,
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self) -> Result<CaptureSettings, StoreError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save(&self, settings: &CaptureSettings) -> Result<(), StoreError> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("memory://settings")
    }

    fn exists(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryState {
    flag: Mutex<bool>,
    flag_writes: AtomicUsize,
    snapshot: Mutex<Option<WindowBoundsSnapshot>>,
}

impl MemoryState {
    pub fn flag(&self) -> bool {
        *self.flag.lock().unwrap()
    }

    pub fn set_flag(&self, value: bool) {
        *self.flag.lock().unwrap() = value;
    }

    pub fn flag_writes(&self) -> usize {
        self.flag_writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<WindowBoundsSnapshot> {
        *self.snapshot.lock().unwrap()
    }
}

#[async_trait]
impl RuntimeStateStore for MemoryState {
    async fn recording_flag(&self) -> Result<bool, StoreError> {
        Ok(self.flag())
    }

    async fn set_recording_flag(&self, active: bool) -> Result<(), StoreError> {
        self.flag_writes.fetch_add(1, Ordering::SeqCst);
        self.set_flag(active);
        Ok(())
    }

    async fn save_bounds_if_absent(
        &self,
        snapshot: WindowBoundsSnapshot,
    ) -> Result<bool, StoreError> {
        let mut slot = self.snapshot.lock().unwrap();
        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(snapshot);
        Ok(true)
    }

    async fn bounds_snapshot(&self) -> Result<Option<WindowBoundsSnapshot>, StoreError> {
        Ok(self.snapshot())
    }

    async fn clear_bounds_snapshot(&self) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("memory://state")
    }
}
