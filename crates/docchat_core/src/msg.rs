use crate::{ChatId, FileId, Generation, RequestError, RunId, SelectedFile};

/// Page and chunk counts reported for a processed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlSummary {
    pub num_pages: u64,
    pub num_chunks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Add a single file to the current session and upload it.
    AddFile(SelectedFile),
    /// Files chosen through the picker. Replaces the current session.
    FilesPicked(Vec<SelectedFile>),
    /// Files dropped onto the upload area. Replaces the current session.
    FilesDropped(Vec<SelectedFile>),
    /// User removed a file from the list.
    RemoveFile { file_id: FileId },
    /// User edited the URL input.
    UrlChanged(String),
    /// User asked to process all pending documents and the URL.
    ProcessClicked,
    /// User submitted a chat message.
    ChatSubmitted(String),
    /// User cleared the session.
    ClearClicked,
    /// Backend reply to an upload.
    UploadFinished {
        generation: Generation,
        file_id: FileId,
        result: Result<(), RequestError>,
    },
    /// Backend reply to `process-documents`; carries `processed_count`.
    DocumentsProcessed {
        generation: Generation,
        run: RunId,
        result: Result<u64, RequestError>,
    },
    /// Backend reply to `process-url`.
    UrlProcessed {
        generation: Generation,
        run: RunId,
        result: Result<UrlSummary, RequestError>,
    },
    /// Backend reply to a chat message.
    ChatReplied {
        generation: Generation,
        chat_id: ChatId,
        result: Result<String, RequestError>,
    },
    /// Backend reply to `clear-documents`.
    BackendCleared {
        generation: Generation,
        result: Result<(), RequestError>,
    },
    /// UI tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
