//! Runtime wiring: controller, media worker and panel as separate tasks
//!
//! The panel reaches the controller through a [`ControllerHandle`]. Every
//! command runs as its own task, so a stop arriving while a start is still
//! counting down is answered immediately instead of waiting behind it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use super::controller::{CaptureController, ControllerPorts};
use super::ports::{
    Browser, Downloads, EncoderBackend, ImageResizer, MixingBackend, OverlaySurface,
    RuntimeStateStore, SettingsStore, TabMediaSource,
};
use super::worker::{worker_channel, MediaWorker, WorkerNotice};
use crate::domain::config::RecordingOverrides;
use crate::domain::error::CaptureError;
use crate::domain::messages::{CommandResponse, WindowSizeRequest};
use crate::domain::target::TabId;

const COMMAND_QUEUE: usize = 32;
const WORKER_QUEUE: usize = 8;

/// Commands accepted from the panel and the shortcut dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControllerCommand {
    #[serde(rename_all = "camelCase")]
    StartRecording {
        #[serde(default)]
        countdown_seconds: Option<i64>,
        #[serde(default)]
        options: RecordingOverrides,
    },
    StopRecording,
    ToggleRecording,
    CaptureStill,
    ResizeWindow(WindowSizeRequest),
    ResetWindowSize,
    #[serde(rename_all = "camelCase")]
    TabClosed {
        tab_id: TabId,
    },
    ResetRecordingState,
    Status,
    Shutdown,
}

struct CommandEnvelope {
    command: ControllerCommand,
    reply: oneshot::Sender<CommandResponse>,
}

/// Cloneable sender for controller commands
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<CommandEnvelope>,
}

impl ControllerHandle {
    /// Send a command and wait for its `{ ok, error }` response
    pub async fn send(&self, command: ControllerCommand) -> CommandResponse {
        let (reply, response) = oneshot::channel();
        if self
            .tx
            .send(CommandEnvelope { command, reply })
            .await
            .is_err()
        {
            return CommandResponse::failed(&CaptureError::DeliveryFailed(
                "controller is not running".to_string(),
            ));
        }
        response.await.unwrap_or_else(|_| {
            CommandResponse::failed(&CaptureError::DeliveryFailed(
                "controller dropped the command".to_string(),
            ))
        })
    }
}

/// Media-side collaborators of the worker
pub struct WorkerPorts<S, M, E, R> {
    pub media: Arc<S>,
    pub mixing: Arc<M>,
    pub encoder: Arc<E>,
    pub resizer: Arc<R>,
}

/// The running controller and worker tasks
pub struct Runtime {
    handle: ControllerHandle,
    controller: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Cancel a pending start, stop any active recording and wait for both
    /// tasks to end
    pub async fn shutdown(self) -> CommandResponse {
        let response = self.handle.send(ControllerCommand::Shutdown).await;
        drop(self.handle);
        if let Err(err) = self.controller.await {
            error!(error = %err, "Controller task failed");
        }
        if let Err(err) = self.worker.await {
            error!(error = %err, "Worker task failed");
        }
        response
    }
}

/// Spawn the controller and the media worker on the current tokio runtime.
pub fn spawn_runtime<B, O, D, C, T, S, M, E, R>(
    controller_ports: ControllerPorts<B, O, D, C, T>,
    worker_ports: WorkerPorts<S, M, E, R>,
) -> Runtime
where
    B: Browser + 'static,
    O: OverlaySurface + 'static,
    D: Downloads + 'static,
    C: SettingsStore + 'static,
    T: RuntimeStateStore + 'static,
    S: TabMediaSource + 'static,
    M: MixingBackend + 'static,
    E: EncoderBackend + 'static,
    R: ImageResizer + 'static,
{
    let (notice_tx, notices) = mpsc::unbounded_channel();
    let (client, requests) = worker_channel(WORKER_QUEUE);
    let worker = MediaWorker::new(
        worker_ports.media,
        worker_ports.mixing,
        worker_ports.encoder,
        worker_ports.resizer,
        notice_tx,
    );
    let worker = tokio::spawn(worker.run(requests));

    let (tx, commands) = mpsc::channel(COMMAND_QUEUE);
    let controller = Arc::new(CaptureController::new(controller_ports, client));
    let controller = tokio::spawn(controller_loop(controller, commands, notices));

    Runtime {
        handle: ControllerHandle { tx },
        controller,
        worker,
    }
}

async fn controller_loop<B, O, D, C, T>(
    controller: Arc<CaptureController<B, O, D, C, T>>,
    mut commands: mpsc::Receiver<CommandEnvelope>,
    mut notices: mpsc::UnboundedReceiver<WorkerNotice>,
) where
    B: Browser + 'static,
    O: OverlaySurface + 'static,
    D: Downloads + 'static,
    C: SettingsStore + 'static,
    T: RuntimeStateStore + 'static,
{
    controller.check_stale_flag().await;
    let mut in_flight = JoinSet::new();

    let shutdown_reply = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(CommandEnvelope { command: ControllerCommand::Shutdown, reply }) => {
                    break Some(reply);
                }
                Some(CommandEnvelope { command, reply }) => {
                    let controller = Arc::clone(&controller);
                    in_flight.spawn(async move {
                        let response = dispatch(controller.as_ref(), command).await;
                        let _ = reply.send(response);
                    });
                }
                None => break None,
            },
            Some(notice) = notices.recv() => controller.handle_notice(notice).await,
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(err) = joined {
                    error!(error = %err, "Command task failed");
                }
            }
        }
    };

    info!("Controller shutting down");
    controller.cancel_pending_start();
    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "Command task failed");
        }
    }
    let result = controller.shutdown().await;
    while let Ok(notice) = notices.try_recv() {
        controller.handle_notice(notice).await;
    }
    if let Some(reply) = shutdown_reply {
        let _ = reply.send(CommandResponse::from_result(result));
    }
    debug!("Controller stopped");
}

/// Run one command against the controller
pub async fn dispatch<B, O, D, C, T>(
    controller: &CaptureController<B, O, D, C, T>,
    command: ControllerCommand,
) -> CommandResponse
where
    B: Browser,
    O: OverlaySurface,
    D: Downloads,
    C: SettingsStore,
    T: RuntimeStateStore,
{
    debug!(command = ?command, "Command received");
    match command {
        ControllerCommand::StartRecording {
            countdown_seconds,
            options,
        } => CommandResponse::from_result(
            controller.start_recording(countdown_seconds, options).await,
        ),
        ControllerCommand::StopRecording => {
            CommandResponse::from_result(controller.stop_recording().await)
        }
        ControllerCommand::ToggleRecording => {
            CommandResponse::from_result(controller.toggle_recording().await)
        }
        ControllerCommand::CaptureStill => {
            CommandResponse::from_result(controller.capture_still().await.map(|_| ()))
        }
        ControllerCommand::ResizeWindow(request) => {
            CommandResponse::from_result(controller.resize_window(request).await)
        }
        ControllerCommand::ResetWindowSize => {
            CommandResponse::from_result(controller.reset_window_size().await)
        }
        ControllerCommand::TabClosed { tab_id } => {
            CommandResponse::from_result(controller.tab_closed(tab_id).await)
        }
        ControllerCommand::ResetRecordingState => {
            CommandResponse::from_result(controller.reset_recording_state().await)
        }
        ControllerCommand::Status => CommandResponse::with_status(controller.status().await),
        ControllerCommand::Shutdown => CommandResponse::from_result(controller.shutdown().await),
    }
}
