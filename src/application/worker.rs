//! Media worker: owns the live recording session and the image pipeline
//!
//! Runs as its own task and only talks to the controller through
//! [`WorkerEnvelope`] requests and fire-and-forget [`WorkerNotice`]s.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::acquirer::{AcquiredStreams, StreamAcquirer};
use super::composer::compose;
use super::encoder::EncoderSession;
use super::mixer::{AudioMixer, MixedAudio};
use super::ports::{EncoderBackend, ImageResizer, MixingBackend, TabConstraints, TabMediaSource};
use crate::domain::artifact;
use crate::domain::capture::{ChunkSequence, ContainerBlob, VideoBitrate};
use crate::domain::error::CaptureError;
use crate::domain::messages::{ResizeStillImage, StartCapture, WorkerReply, WorkerRequest};
use crate::domain::still::{ResizeSpec, StillImage};

/// Notices the worker sends without waiting for an answer
#[derive(Debug)]
pub enum WorkerNotice {
    CaptureCompleted {
        blob: ContainerBlob,
        filename: String,
    },
}

/// A request together with the channel its reply goes to
#[derive(Debug)]
pub struct WorkerEnvelope {
    pub request: WorkerRequest,
    pub reply: oneshot::Sender<WorkerReply>,
}

/// Resources of the active recording
struct MediaSession {
    streams: AcquiredStreams,
    mixed: MixedAudio,
    encoder: EncoderSession,
}

impl MediaSession {
    fn release(self) {
        let MediaSession {
            streams,
            mixed,
            encoder,
        } = self;
        drop(encoder);
        mixed.release();
        streams.release();
        debug!("Session resources released");
    }
}

pub struct MediaWorker<S, M, E, R>
where
    S: TabMediaSource,
    M: MixingBackend,
    E: EncoderBackend,
    R: ImageResizer,
{
    acquirer: StreamAcquirer<S>,
    mixer: AudioMixer<M>,
    encoder: Arc<E>,
    resizer: Arc<R>,
    notices: mpsc::UnboundedSender<WorkerNotice>,
    session: Option<MediaSession>,
}

impl<S, M, E, R> MediaWorker<S, M, E, R>
where
    S: TabMediaSource + 'static,
    M: MixingBackend + 'static,
    E: EncoderBackend + 'static,
    R: ImageResizer + 'static,
{
    pub fn new(
        media: Arc<S>,
        mixing: Arc<M>,
        encoder: Arc<E>,
        resizer: Arc<R>,
        notices: mpsc::UnboundedSender<WorkerNotice>,
    ) -> Self {
        Self {
            acquirer: StreamAcquirer::new(media),
            mixer: AudioMixer::new(mixing),
            encoder,
            resizer,
            notices,
            session: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Serve requests until every client is gone, then tear down.
    pub async fn run(mut self, mut requests: mpsc::Receiver<WorkerEnvelope>) {
        debug!("Media worker started");
        while let Some(WorkerEnvelope { request, reply }) = requests.recv().await {
            let name = request.name();
            let response = self.handle(request).await;
            if reply.send(response).is_err() {
                warn!(request = name, "Requester went away before the reply");
            }
        }
        self.teardown().await;
        debug!("Media worker stopped");
    }

    pub async fn handle(&mut self, request: WorkerRequest) -> WorkerReply {
        let result = match request {
            WorkerRequest::StartCapture(start) => self.start_capture(start).await.map(|_| None),
            WorkerRequest::StopCapture => self.stop_capture().await.map(|_| None),
            WorkerRequest::ResizeStillImage(resize) => self.resize_still_image(resize).await.map(Some),
        };
        match result {
            Ok(Some(data_url)) => WorkerReply::with_data_url(data_url),
            Ok(None) => WorkerReply::ok(),
            Err(err) => {
                warn!(error = %err, "Worker request failed");
                WorkerReply::failed(&err)
            }
        }
    }

    /// Acquire, mix, compose and start encoding.
    ///
    /// On any failure everything acquired so far is released before returning.
    pub async fn start_capture(&mut self, start: StartCapture) -> Result<(), CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        let constraints = TabConstraints {
            tab_audio: start.tab_audio,
            max_frame_rate: start.frame_rate,
            max_width: start.max_width,
            max_height: start.max_height,
        };
        let streams = self
            .acquirer
            .acquire(start.stream_handle, constraints, start.mic_audio)
            .await?;

        let mixed = match self.mixer.mix(
            start.tab_audio || start.mic_audio,
            &streams.tab,
            streams.mic.as_ref(),
        ) {
            Ok(mixed) => mixed,
            Err(err) => {
                streams.release();
                return Err(err);
            }
        };

        let composite = compose(&streams.tab, mixed.output());
        let bitrate = VideoBitrate::from_kbps_input(&start.video_bitrate_kbps);
        let encoder = match EncoderSession::begin(self.encoder.as_ref(), &composite, bitrate).await
        {
            Ok(encoder) => encoder,
            Err(err) => {
                drop(composite);
                mixed.release();
                streams.release();
                return Err(err.into());
            }
        };

        info!(
            tracks = composite.tracks().len(),
            bits_per_second = bitrate.bits_per_second(),
            "Capture started"
        );
        self.session = Some(MediaSession {
            streams,
            mixed,
            encoder,
        });
        Ok(())
    }

    /// Flush the encoder, hand the container to the controller and release.
    ///
    /// Without an active session this does nothing.
    pub async fn stop_capture(&mut self) -> Result<(), CaptureError> {
        let Some(mut session) = self.session.take() else {
            debug!("Stop requested without an active capture");
            return Ok(());
        };

        let blob = match session.encoder.stop().await {
            Some(blob) => blob,
            None => ChunkSequence::new().into_blob(),
        };
        let filename = artifact::recording_filename(artifact::now());
        info!(filename = %filename, size = %blob.human_readable_size(), "Capture finished");

        if let Err(err) = self
            .notices
            .send(WorkerNotice::CaptureCompleted { blob, filename })
        {
            let err = CaptureError::DeliveryFailed(err.to_string());
            error!(error = %err, "Completed recording could not be handed over");
        }

        session.release();
        Ok(())
    }

    /// Decode a data URL, resize it and return the result as a data URL.
    pub async fn resize_still_image(
        &self,
        request: ResizeStillImage,
    ) -> Result<String, CaptureError> {
        let source = StillImage::from_data_url(&request.data_url)
            .map_err(|err| CaptureError::DecodeFailed(err.to_string()))?;
        let format = request.format.parse().unwrap_or_default();
        let spec = ResizeSpec::normalize(request.scale, format, request.quality);

        let resizer = Arc::clone(&self.resizer);
        let resized = tokio::task::spawn_blocking(move || resizer.resize(&source, &spec))
            .await
            .map_err(|err| CaptureError::EncodeFailed(err.to_string()))??;

        debug!(
            width = resized.width,
            height = resized.height,
            format = %resized.format,
            "Still image resized"
        );
        Ok(resized.image.to_data_url())
    }

    /// Release an active session without delivering its recording
    async fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            warn!("Worker shutting down with an active capture, discarding it");
            let _ = session.encoder.stop().await;
            session.release();
        }
    }
}

/// Cloneable handle the controller uses to reach the worker
#[derive(Debug, Clone)]
pub struct WorkerClient {
    tx: mpsc::Sender<WorkerEnvelope>,
}

/// Create the request channel between a controller and a worker
pub fn worker_channel(capacity: usize) -> (WorkerClient, mpsc::Receiver<WorkerEnvelope>) {
    let (tx, rx) = mpsc::channel(capacity);
    (WorkerClient { tx }, rx)
}

impl WorkerClient {
    /// Send a request and wait for the worker's reply
    pub async fn request(&self, request: WorkerRequest) -> Result<WorkerReply, CaptureError> {
        let name = request.name();
        let (reply, response) = oneshot::channel();
        self.tx
            .send(WorkerEnvelope { request, reply })
            .await
            .map_err(|_| CaptureError::DeliveryFailed(format!("{}: media worker is not running", name)))?;
        response
            .await
            .map_err(|_| CaptureError::DeliveryFailed(format!("{}: media worker dropped the request", name)))
    }

    pub async fn start_capture(&self, start: StartCapture) -> Result<(), CaptureError> {
        self.request(WorkerRequest::StartCapture(start))
            .await?
            .into_result()
            .map(|_| ())
    }

    pub async fn stop_capture(&self) -> Result<(), CaptureError> {
        self.request(WorkerRequest::StopCapture)
            .await?
            .into_result()
            .map(|_| ())
    }

    pub async fn resize_still_image(
        &self,
        resize: ResizeStillImage,
    ) -> Result<String, CaptureError> {
        self.request(WorkerRequest::ResizeStillImage(resize))
            .await?
            .into_result()?
            .ok_or_else(|| CaptureError::Worker("media worker returned no image".to_string()))
    }
}
