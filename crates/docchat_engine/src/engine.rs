use std::future::Future;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docchat_logging::{docchat_debug, docchat_error, docchat_info, docchat_warn};
use tokio::sync::{watch, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::client::{Backend, BackendSettings, ReqwestBackend, UploadFile};
use crate::{BackendError, ChatId, EngineEvent, FailureKind, FileId, Generation, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Clear {
        generation: Generation,
    },
    Upload {
        generation: Generation,
        file_id: FileId,
        file: UploadFile,
    },
    ProcessDocuments {
        generation: Generation,
        run: RunId,
    },
    ProcessUrl {
        generation: Generation,
        run: RunId,
        url: String,
    },
    Chat {
        generation: Generation,
        chat_id: ChatId,
        message: String,
    },
}

/// Requests issued between two clears share a gate. A clear cancels the
/// previous gate and holds the next one closed until the backend confirmed
/// (or failed) the clear, so uploads never race the reset they follow.
#[derive(Clone)]
struct Gate {
    cancel: CancellationToken,
    ready: watch::Receiver<bool>,
}

impl Gate {
    fn open() -> Self {
        let (_tx, ready) = watch::channel(true);
        Self {
            cancel: CancellationToken::new(),
            ready,
        }
    }

    fn supersede(&self) -> (Self, watch::Sender<bool>) {
        self.cancel.cancel();
        let (tx, ready) = watch::channel(false);
        let gate = Self {
            cancel: CancellationToken::new(),
            ready,
        };
        (gate, tx)
    }

    /// Runs `fut` unless the gate is cancelled first. Used by the clear itself.
    async fn run<T, F>(&self, fut: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        guard(&self.cancel, fut).await
    }

    /// Waits for the preceding clear, then runs `fut` unless cancelled.
    async fn run_when_ready<T, F>(self, fut: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let Gate { cancel, mut ready } = self;
        guard(&cancel, async move {
            // A dropped sender also releases waiters.
            let _ = ready.wait_for(|ready| *ready).await;
            fut.await
        })
        .await
    }
}

async fn guard<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BackendError::new(
            FailureKind::Cancelled,
            "request superseded by a cleared session",
        )),
        result = fut => result,
    }
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts an engine talking to the HTTP backend described by `settings`.
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let max_uploads = settings.max_concurrent_uploads;
        let backend = ReqwestBackend::new(settings)?;
        Self::with_backend(Arc::new(backend), max_uploads)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        max_concurrent_uploads: usize,
    ) -> Result<Self, BackendError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|err| {
            BackendError::new(FailureKind::Io, format!("failed to start runtime: {err}"))
        })?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let uploads = Arc::new(Semaphore::new(max_concurrent_uploads.max(1)));

        thread::spawn(move || {
            let mut gate = Gate::open();
            while let Ok(command) = cmd_rx.recv() {
                let mut clear_done = None;
                if let EngineCommand::Clear { generation } = &command {
                    docchat_info!("Clearing session, generation {}", generation);
                    let (next, done) = gate.supersede();
                    gate = next;
                    clear_done = Some(done);
                }
                let backend = backend.clone();
                let gate = gate.clone();
                let uploads = uploads.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event =
                        handle_command(backend.as_ref(), command, gate, clear_done, &uploads)
                            .await;
                    if event_tx.send(event).is_err() {
                        docchat_debug!("Engine event dropped, receiver is gone");
                    }
                });
            }
            docchat_info!("Engine command channel closed; shutting down");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            docchat_error!("Engine thread is not running; command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    backend: &dyn Backend,
    command: EngineCommand,
    gate: Gate,
    clear_done: Option<watch::Sender<bool>>,
    uploads: &Semaphore,
) -> EngineEvent {
    match command {
        EngineCommand::Clear { generation } => {
            let result = gate.run(backend.clear_documents()).await;
            if let Some(done) = clear_done {
                let _ = done.send(true);
            }
            if let Err(err) = &result {
                docchat_warn!("Clearing backend documents failed: {}", err);
            }
            EngineEvent::Cleared { generation, result }
        }
        EngineCommand::Upload {
            generation,
            file_id,
            file,
        } => {
            let result = gate
                .run_when_ready(async {
                    let _permit = uploads.acquire().await.map_err(|_| {
                        BackendError::new(FailureKind::Cancelled, "upload pool closed")
                    })?;
                    backend.upload(&file).await
                })
                .await;
            EngineEvent::Uploaded {
                generation,
                file_id,
                result,
            }
        }
        EngineCommand::ProcessDocuments { generation, run } => {
            let result = gate.run_when_ready(backend.process_documents()).await;
            EngineEvent::DocumentsProcessed {
                generation,
                run,
                result,
            }
        }
        EngineCommand::ProcessUrl {
            generation,
            run,
            url,
        } => {
            let result = gate.run_when_ready(backend.process_url(&url)).await;
            EngineEvent::UrlProcessed {
                generation,
                run,
                result,
            }
        }
        EngineCommand::Chat {
            generation,
            chat_id,
            message,
        } => {
            let result = gate.run_when_ready(backend.chat(&message)).await;
            EngineEvent::ChatAnswered {
                generation,
                chat_id,
                result,
            }
        }
    }
}
