//! Docchat core: pure session state machine and view-model helpers.
mod effect;
mod error;
mod files;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{RequestError, ValidationError};
pub use files::{
    format_file_size, is_accepted_mime, SelectedFile, ACCEPTED_EXTENSIONS, ACCEPTED_MIME_TYPES,
};
pub use msg::{Msg, UrlSummary};
pub use state::{
    AppState, Author, ChatId, ChatMessage, FileId, FileStatus, Generation, Notice, PendingFile,
    RunId, Severity, ALL_PROCESSED_MESSAGE, CLEARED_GREETING, GREETING,
};
pub use update::update;
pub use view_model::{FileRowView, SessionViewModel};
