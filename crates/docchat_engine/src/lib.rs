//! Docchat engine: backend HTTP client and effect execution.
mod client;
mod engine;
mod types;
mod wire;

pub use client::{Backend, BackendSettings, ReqwestBackend, UploadFile};
pub use engine::{EngineCommand, EngineHandle};
pub use types::{
    BackendError, ChatId, ChatReply, EngineEvent, FailureKind, FileId, Generation,
    ProcessedDocuments, RunId, UploadReceipt, UrlDocumentInfo,
};
