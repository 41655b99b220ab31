use std::fmt;

use serde::Deserialize;

pub type Generation = u64;
pub type FileId = u64;
pub type RunId = u64;
pub type ChatId = u64;

/// Success body of `upload`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body of `process-documents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ProcessedDocuments {
    #[serde(default)]
    pub processed_count: u64,
}

/// `document_info` of a `process-url` success body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct UrlDocumentInfo {
    #[serde(default)]
    pub num_pages: u64,
    #[serde(default)]
    pub num_chunks: u64,
}

/// Success body of `chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Cleared {
        generation: Generation,
        result: Result<(), BackendError>,
    },
    Uploaded {
        generation: Generation,
        file_id: FileId,
        result: Result<UploadReceipt, BackendError>,
    },
    DocumentsProcessed {
        generation: Generation,
        run: RunId,
        result: Result<ProcessedDocuments, BackendError>,
    },
    UrlProcessed {
        generation: Generation,
        run: RunId,
        result: Result<UrlDocumentInfo, BackendError>,
    },
    ChatAnswered {
        generation: Generation,
        chat_id: ChatId,
        result: Result<ChatReply, BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error whose message is the display form of its kind.
    pub(crate) fn from_kind(kind: FailureKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    /// Whether the backend itself reported the failure in an `error` field.
    pub fn is_backend_reported(&self) -> bool {
        self.kind == FailureKind::Backend
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidRequest,
    Io,
    TooLarge { max_bytes: u64, actual: u64 },
    HttpStatus(u16),
    Timeout,
    Network,
    Backend,
    InvalidResponse,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "file too large (max {max_bytes}, actual {actual})")
            }
            FailureKind::HttpStatus(code) => write!(f, "HTTP error! status: {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Backend => write!(f, "backend error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
