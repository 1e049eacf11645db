//! Encoder session: drives the platform encoder and collects its chunks

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use super::ports::{
    CompositeStream, EncoderBackend, EncoderConfig, EncoderControl, EncoderError, EncoderEvent,
    RunningEncoder,
};
use crate::domain::capture::{
    pick_mime_type, ChunkSequence, ContainerBlob, VideoBitrate, CHUNK_INTERVAL,
};

/// How long the encoder may take to report that it started
pub const ENCODER_START_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for the final flush after a stop request
pub const ENCODER_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// The active encoder of a recording session
pub struct EncoderSession {
    control: Box<dyn EncoderControl>,
    collector: Option<JoinHandle<ChunkSequence>>,
    abandon: Option<oneshot::Sender<()>>,
    mime_type: Option<&'static str>,
}

impl EncoderSession {
    /// Start encoding `stream` and wait until the encoder is running.
    pub async fn begin<E: EncoderBackend + ?Sized>(
        backend: &E,
        stream: &CompositeStream,
        bitrate: VideoBitrate,
    ) -> Result<Self, EncoderError> {
        let config = EncoderConfig {
            mime_type: pick_mime_type(|mime| backend.is_type_supported(mime)),
            video_bits_per_second: bitrate.bits_per_second(),
            timeslice: CHUNK_INTERVAL,
        };
        debug!(
            mime_type = config.mime_type.unwrap_or("<platform default>"),
            bits_per_second = config.video_bits_per_second,
            "Starting encoder"
        );

        let RunningEncoder {
            mut events,
            control,
        } = backend.start(stream, &config)?;

        let mut chunks = ChunkSequence::new();
        let started = timeout(ENCODER_START_TIMEOUT, async {
            loop {
                match events.recv().await {
                    Some(EncoderEvent::Started) => return Ok(()),
                    Some(EncoderEvent::Chunk(bytes)) => {
                        chunks.push(bytes);
                    }
                    Some(EncoderEvent::Failed(reason)) => return Err(EncoderError::Failed(reason)),
                    Some(EncoderEvent::Stopped) | None => {
                        return Err(EncoderError::Failed(
                            "encoder stopped before it started".to_string(),
                        ))
                    }
                }
            }
        })
        .await;

        match started {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                control.request_stop();
                return Err(err);
            }
            Err(_) => {
                control.request_stop();
                return Err(EncoderError::StartTimeout(ENCODER_START_TIMEOUT));
            }
        }

        let (abandon, abandoned) = oneshot::channel::<()>();
        let collector = tokio::spawn(collect_chunks(events, abandoned, chunks));

        info!("Encoder running");
        Ok(Self {
            control,
            collector: Some(collector),
            abandon: Some(abandon),
            mime_type: config.mime_type,
        })
    }

    /// Codec the encoder was started with, if one was requested
    pub fn mime_type(&self) -> Option<&'static str> {
        self.mime_type
    }

    pub fn is_active(&self) -> bool {
        self.collector.is_some()
    }

    /// Stop, wait for the final flush and assemble the container.
    ///
    /// Returns `None` when the session was already stopped.
    pub async fn stop(&mut self) -> Option<ContainerBlob> {
        let mut collector = self.collector.take()?;
        self.control.request_stop();

        let joined = match timeout(ENCODER_FLUSH_TIMEOUT, &mut collector).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Encoder did not flush in time, keeping the chunks received so far");
                if let Some(abandon) = self.abandon.take() {
                    let _ = abandon.send(());
                }
                collector.await
            }
        };

        let chunks = joined.unwrap_or_else(|err| {
            warn!(error = %err, "Chunk collector ended abnormally");
            ChunkSequence::new()
        });
        debug!(chunks = chunks.len(), bytes = chunks.total_bytes(), "Encoder flushed");
        Some(chunks.into_blob())
    }
}

/// Gather chunks until the encoder reports its final flush.
///
/// An abandon signal takes priority over pending events so that a backend
/// streaming chunks without ever stopping cannot hold the collector open.
async fn collect_chunks(
    mut events: mpsc::UnboundedReceiver<EncoderEvent>,
    mut abandoned: oneshot::Receiver<()>,
    mut chunks: ChunkSequence,
) -> ChunkSequence {
    loop {
        tokio::select! {
            biased;
            _ = &mut abandoned => {
                debug!("Chunk collection abandoned");
                break;
            }
            event = events.recv() => match event {
                Some(EncoderEvent::Chunk(bytes)) => {
                    let len = bytes.len();
                    if chunks.push(bytes) {
                        trace!(bytes = len, total = chunks.len(), "Chunk stored");
                    } else {
                        trace!("Empty chunk discarded");
                    }
                }
                Some(EncoderEvent::Failed(reason)) => {
                    warn!(error = %reason, "Encoder reported a failure while recording");
                }
                Some(EncoderEvent::Started) => {}
                Some(EncoderEvent::Stopped) | None => break,
            },
        }
    }
    chunks
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        if let Some(collector) = self.collector.take() {
            self.control.request_stop();
            collector.abort();
        }
    }
}
