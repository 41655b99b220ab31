use docchat_core::{Effect, Msg, RequestError, UrlSummary};
use docchat_engine::{
    BackendError, BackendSettings, EngineCommand, EngineEvent, EngineHandle, UploadFile,
};
use docchat_logging::{docchat_debug, docchat_info, docchat_warn, preview};

/// Forwards core effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            log_effect(&effect);
            self.engine.send(command_for(effect));
        }
    }

    /// Next finished request, if any, as a message for `update`.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(msg_for)
    }
}

fn log_effect(effect: &Effect) {
    match effect {
        Effect::ClearBackend { generation } => {
            docchat_info!("ClearBackend generation={}", generation);
        }
        Effect::Upload {
            generation,
            file_id,
            name,
            mime,
            ..
        } => {
            docchat_info!(
                "Upload generation={} file_id={} name={} mime={:?}",
                generation,
                file_id,
                name,
                mime
            );
        }
        Effect::ProcessDocuments { generation, run } => {
            docchat_info!("ProcessDocuments generation={} run={}", generation, run);
        }
        Effect::ProcessUrl {
            generation,
            run,
            url,
        } => {
            docchat_info!(
                "ProcessUrl generation={} run={} url={}",
                generation,
                run,
                url
            );
        }
        Effect::SendChat {
            generation,
            chat_id,
            message,
        } => {
            docchat_info!(
                "SendChat generation={} chat_id={} message_len={} message={}",
                generation,
                chat_id,
                message.len(),
                preview(message)
            );
        }
    }
}

pub(crate) fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::ClearBackend { generation } => EngineCommand::Clear { generation },
        Effect::Upload {
            generation,
            file_id,
            path,
            name,
            mime,
        } => EngineCommand::Upload {
            generation,
            file_id,
            file: UploadFile { path, name, mime },
        },
        Effect::ProcessDocuments { generation, run } => {
            EngineCommand::ProcessDocuments { generation, run }
        }
        Effect::ProcessUrl {
            generation,
            run,
            url,
        } => EngineCommand::ProcessUrl {
            generation,
            run,
            url,
        },
        Effect::SendChat {
            generation,
            chat_id,
            message,
        } => EngineCommand::Chat {
            generation,
            chat_id,
            message,
        },
    }
}

pub(crate) fn msg_for(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Cleared { generation, result } => Msg::BackendCleared {
            generation,
            result: result.map_err(|err| request_error("clear-documents", err)),
        },
        EngineEvent::Uploaded {
            generation,
            file_id,
            result,
        } => Msg::UploadFinished {
            generation,
            file_id,
            result: result
                .map(|_| ())
                .map_err(|err| request_error("upload", err)),
        },
        EngineEvent::DocumentsProcessed {
            generation,
            run,
            result,
        } => Msg::DocumentsProcessed {
            generation,
            run,
            result: result
                .map(|processed| processed.processed_count)
                .map_err(|err| request_error("process-documents", err)),
        },
        EngineEvent::UrlProcessed {
            generation,
            run,
            result,
        } => Msg::UrlProcessed {
            generation,
            run,
            result: result
                .map(|info| UrlSummary {
                    num_pages: info.num_pages,
                    num_chunks: info.num_chunks,
                })
                .map_err(|err| request_error("process-url", err)),
        },
        EngineEvent::ChatAnswered {
            generation,
            chat_id,
            result,
        } => Msg::ChatReplied {
            generation,
            chat_id,
            result: result
                .map(|reply| reply.response)
                .map_err(|err| request_error("chat", err)),
        },
    }
}

fn request_error(endpoint: &str, err: BackendError) -> RequestError {
    if err.is_backend_reported() {
        docchat_debug!("{} reported: {}", endpoint, err);
        RequestError::Backend(err.message)
    } else {
        docchat_warn!("{} failed: {} ({})", endpoint, err, err.kind);
        RequestError::Network(err.to_string())
    }
}
