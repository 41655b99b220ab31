use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::files::format_file_size;
use crate::view_model::{FileRowView, SessionViewModel};
use crate::SelectedFile;

pub type FileId = u64;
pub type Generation = u64;
pub type RunId = u64;
pub type ChatId = u64;

pub const GREETING: &str = "Hello! I'm your document assistant. Upload some documents or enter URLs, then ask me anything about their content. I'll help you find answers quickly.";
pub const CLEARED_GREETING: &str = "Previous documents cleared. Ready for new uploads!";
pub const ALL_PROCESSED_MESSAGE: &str =
    "All documents and URLs have been processed successfully! You can now ask questions about them.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Uploading,
    Uploaded,
    Processing,
    Processed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub id: FileId,
    pub name: String,
    pub size_bytes: u64,
    pub mime: Option<String>,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Author,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            author: Author::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message that must be shown to the user outside the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

/// Bookkeeping for one `process-documents` / `process-url` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessRun {
    pub(crate) id: RunId,
    pub(crate) file_ids: Vec<FileId>,
    pub(crate) documents_pending: bool,
    pub(crate) url_pending: bool,
    pub(crate) failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    generation: Generation,
    next_file_id: FileId,
    next_run_id: RunId,
    next_chat_id: ChatId,
    files: BTreeMap<FileId, PendingFile>,
    url: Option<String>,
    chat: Vec<ChatMessage>,
    pending_chats: BTreeSet<ChatId>,
    run: Option<ProcessRun>,
    notices: VecDeque<Notice>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            generation: 0,
            next_file_id: 1,
            next_run_id: 1,
            next_chat_id: 1,
            files: BTreeMap::new(),
            url: None,
            chat: vec![ChatMessage::assistant(GREETING)],
            pending_chats: BTreeSet::new(),
            run: None,
            notices: VecDeque::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            generation: self.generation,
            files: self
                .files
                .values()
                .map(|file| FileRowView {
                    file_id: file.id,
                    name: file.name.clone(),
                    size_label: format_file_size(file.size_bytes),
                    status: file.status,
                })
                .collect(),
            url: self.url.clone(),
            chat: self.chat.clone(),
            typing: !self.pending_chats.is_empty(),
            processing: self.run.is_some(),
            dirty: self.dirty,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn file(&self, file_id: FileId) -> Option<&PendingFile> {
        self.files.get(&file_id)
    }

    pub fn files(&self) -> impl Iterator<Item = &PendingFile> {
        self.files.values()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Returns whether the state changed since the last call, resetting the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Takes all queued notices in the order they were raised.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Resets the session to a single welcome message and starts a new generation.
    pub(crate) fn reset_session(&mut self, greeting: &str) {
        self.generation += 1;
        self.files.clear();
        self.url = None;
        self.chat = vec![ChatMessage::assistant(greeting)];
        self.pending_chats.clear();
        self.run = None;
        self.mark_dirty();
    }

    pub(crate) fn insert_file(&mut self, file: &SelectedFile) -> FileId {
        let id = self.next_file_id;
        self.next_file_id += 1;
        self.files.insert(
            id,
            PendingFile {
                id,
                name: file.name.clone(),
                size_bytes: file.size_bytes,
                mime: file.mime.clone(),
                status: FileStatus::Uploading,
            },
        );
        self.mark_dirty();
        id
    }

    pub(crate) fn remove_file(&mut self, file_id: FileId) -> bool {
        let removed = self.files.remove(&file_id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Moves `file_id` to `to` only when it currently is in `from`.
    pub(crate) fn transition_file(
        &mut self,
        file_id: FileId,
        from: FileStatus,
        to: FileStatus,
    ) -> bool {
        match self.files.get_mut(&file_id) {
            Some(file) if file.status == from => {
                file.status = to;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn files_with_status(&self, status: FileStatus) -> Vec<FileId> {
        self.files
            .values()
            .filter(|file| file.status == status)
            .map(|file| file.id)
            .collect()
    }

    pub(crate) fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    pub(crate) fn set_url(&mut self, raw: &str) {
        let trimmed = raw.trim();
        let url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if url != self.url {
            self.url = url;
            self.mark_dirty();
        }
    }

    pub(crate) fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push(message);
        self.mark_dirty();
    }

    pub(crate) fn push_notice(&mut self, severity: Severity, text: impl Into<String>) {
        self.notices.push_back(Notice {
            severity,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn begin_chat(&mut self, text: &str) -> ChatId {
        let chat_id = self.next_chat_id;
        self.next_chat_id += 1;
        self.pending_chats.insert(chat_id);
        self.push_chat(ChatMessage::user(text));
        chat_id
    }

    pub(crate) fn finish_chat(&mut self, chat_id: ChatId) -> bool {
        let was_pending = self.pending_chats.remove(&chat_id);
        if was_pending {
            self.mark_dirty();
        }
        was_pending
    }

    pub(crate) fn begin_run(&mut self, file_ids: Vec<FileId>, with_url: bool) -> RunId {
        let id = self.next_run_id;
        self.next_run_id += 1;
        for file_id in &file_ids {
            self.transition_file(*file_id, FileStatus::Uploaded, FileStatus::Processing);
        }
        self.run = Some(ProcessRun {
            id,
            documents_pending: !file_ids.is_empty(),
            url_pending: with_url,
            file_ids,
            failure: None,
        });
        self.mark_dirty();
        id
    }

    pub(crate) fn is_processing(&self) -> bool {
        self.run.is_some()
    }

    /// The in-flight run, if `run` identifies it.
    pub(crate) fn run_mut(&mut self, run: RunId) -> Option<&mut ProcessRun> {
        self.run.as_mut().filter(|current| current.id == run)
    }

    /// Removes the run once both of its calls have resolved.
    pub(crate) fn take_finished_run(&mut self) -> Option<ProcessRun> {
        let finished = self
            .run
            .as_ref()
            .is_some_and(|run| !run.documents_pending && !run.url_pending);
        if finished {
            self.mark_dirty();
            self.run.take()
        } else {
            None
        }
    }
}
