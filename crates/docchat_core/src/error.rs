use thiserror::Error;

/// Local checks that block an action before any backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload files or enter a URL first")]
    NothingToProcess,
    #[error("No new documents to process. Wait for uploads to finish or add a URL.")]
    NothingNew,
    #[error("Documents are already being processed")]
    AlreadyProcessing,
    #[error("Unsupported file type: {mime}. Please upload PDF, DOC, DOCX, or TXT files.")]
    UnsupportedFileType { mime: String },
}

/// Failure reported for a backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request never produced a usable response.
    #[error("{0}")]
    Network(String),
    /// The backend answered with an `error` field.
    #[error("{0}")]
    Backend(String),
}
