//! Scaler session — background task owning one scaler.

use std::future;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use kubesim_autoscale::{ActionId, BoundedScaler, ScalerCommand, ScalingPolicy};
use kubesim_core::ScalerSnapshot;

use crate::error::{SessionError, SessionResult};

/// Commands queued ahead of the session task before senders wait.
const COMMAND_BUFFER: usize = 32;

enum Request {
    Command {
        command: ScalerCommand,
        reply: oneshot::Sender<ScalerSnapshot>,
    },
    Poll {
        reply: oneshot::Sender<ScalerSnapshot>,
    },
}

/// The one deferred transition the task is waiting on.
struct PendingTimer {
    id: ActionId,
    deadline: Instant,
}

/// A running scaler. Dropping it (or calling `shutdown`) stops the task;
/// outstanding handles then return `SessionError::Closed`.
pub struct ScalerSession {
    handle: SessionHandle,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScalerSession {
    /// Move `scaler` onto a new task. Must be called inside a tokio runtime.
    pub fn spawn<P: ScalingPolicy>(scaler: BoundedScaler<P>) -> Self {
        let initial = scaler.snapshot();
        let kind = initial.kind;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_session(scaler, command_rx, snapshot_tx, shutdown_rx));
        info!(scaler = %kind, "scaler session started");

        Self {
            handle: SessionHandle {
                commands: command_tx,
                snapshots: snapshot_rx,
            },
            shutdown_tx,
            task,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the task and wait for it to exit. Any pending transition is
    /// dropped without firing.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "scaler session task ended abnormally");
        }
    }
}

/// Cloneable front end to a session, used by the presentation layer.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Request>,
    snapshots: watch::Receiver<ScalerSnapshot>,
}

impl SessionHandle {
    /// Apply a command and return the state right after it.
    pub async fn send(&self, command: ScalerCommand) -> SessionResult<ScalerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Request::Command { command, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Round-trip through the task for a snapshot. Any transition whose
    /// delay has already elapsed is applied first.
    pub async fn poll(&self) -> SessionResult<ScalerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Request::Poll { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Most recently published snapshot, without waiting.
    pub fn latest(&self) -> ScalerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ScalerSnapshot> {
        self.snapshots.clone()
    }

    pub async fn increase_load(&self) -> SessionResult<ScalerSnapshot> {
        self.send(ScalerCommand::IncreaseLoad).await
    }

    pub async fn decrease_load(&self) -> SessionResult<ScalerSnapshot> {
        self.send(ScalerCommand::DecreaseLoad).await
    }

    pub async fn toggle_auto_mode(&self) -> SessionResult<ScalerSnapshot> {
        self.send(ScalerCommand::ToggleAutoMode).await
    }

    pub async fn reset(&self) -> SessionResult<ScalerSnapshot> {
        self.send(ScalerCommand::Reset).await
    }
}

async fn run_session<P: ScalingPolicy>(
    mut scaler: BoundedScaler<P>,
    mut commands: mpsc::Receiver<Request>,
    snapshots: watch::Sender<ScalerSnapshot>,
    mut shutdown: watch::Receiver<bool>,
) {
    let kind = scaler.policy().kind();
    let mut timer: Option<PendingTimer> = None;

    loop {
        let deadline = timer.as_ref().map(|t| t.deadline);

        // Timer before commands: a transition that is already due lands
        // before anything queued behind it.
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            _ = wait_until(deadline) => {
                if let Some(expired) = timer.take() {
                    debug!(scaler = %kind, action = expired.id.get(), "cooldown elapsed");
                    scaler.complete(expired.id);
                }
                timer = sync_timer(&scaler, timer);
                snapshots.send_replace(scaler.snapshot());
            }

            request = commands.recv() => {
                let Some(request) = request else { break };
                match request {
                    Request::Command { command, reply } => {
                        scaler.apply(command);
                        timer = sync_timer(&scaler, timer);
                        let snapshot = scaler.snapshot();
                        snapshots.send_replace(snapshot.clone());
                        let _ = reply.send(snapshot);
                    }
                    Request::Poll { reply } => {
                        let _ = reply.send(scaler.snapshot());
                    }
                }
            }
        }
    }

    info!(scaler = %kind, "scaler session stopped");
}

/// Match the task's deadline to the scaler's armed action.
fn sync_timer<P: ScalingPolicy>(
    scaler: &BoundedScaler<P>,
    timer: Option<PendingTimer>,
) -> Option<PendingTimer> {
    let action = scaler.pending()?;
    match timer {
        Some(t) if t.id == action.id => Some(t),
        _ => Some(PendingTimer {
            id: action.id,
            deadline: Instant::now() + action.delay,
        }),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => future::pending().await,
    }
}
