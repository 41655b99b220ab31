use std::path::PathBuf;

use crate::{ChatId, FileId, Generation, RunId};

/// Backend work requested by `update`. Every effect is stamped with the
/// session generation it was issued under so late replies can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ClearBackend {
        generation: Generation,
    },
    Upload {
        generation: Generation,
        file_id: FileId,
        path: PathBuf,
        name: String,
        mime: Option<String>,
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
    SendChat {
        generation: Generation,
        chat_id: ChatId,
        message: String,
    },
}

impl Effect {
    pub fn generation(&self) -> Generation {
        match self {
            Effect::ClearBackend { generation }
            | Effect::Upload { generation, .. }
            | Effect::ProcessDocuments { generation, .. }
            | Effect::ProcessUrl { generation, .. }
            | Effect::SendChat { generation, .. } => *generation,
        }
    }
}
