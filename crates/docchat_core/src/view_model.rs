use crate::{ChatMessage, FileId, FileStatus, Generation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionViewModel {
    pub generation: Generation,
    pub files: Vec<FileRowView>,
    pub url: Option<String>,
    pub chat: Vec<ChatMessage>,
    /// At least one chat message is waiting for a reply.
    pub typing: bool,
    /// A processing run is in flight.
    pub processing: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub file_id: FileId,
    pub name: String,
    pub size_label: String,
    pub status: FileStatus,
}
