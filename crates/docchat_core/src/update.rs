use crate::state::{ALL_PROCESSED_MESSAGE, CLEARED_GREETING};
use crate::{
    AppState, ChatMessage, Effect, FileStatus, Msg, RequestError, SelectedFile, Severity,
    ValidationError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AddFile(file) => vec![start_upload(&mut state, file)],
        Msg::FilesPicked(files) => {
            replace_with_selection(&mut state, files, SelectedFile::accepted_by_picker)
        }
        Msg::FilesDropped(files) => {
            replace_with_selection(&mut state, files, SelectedFile::accepted_by_drop)
        }
        Msg::RemoveFile { file_id } => {
            state.remove_file(file_id);
            Vec::new()
        }
        Msg::UrlChanged(raw) => {
            state.set_url(&raw);
            Vec::new()
        }
        Msg::ProcessClicked => process_all(&mut state),
        Msg::ChatSubmitted(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return (state, Vec::new());
            }
            let chat_id = state.begin_chat(text);
            vec![Effect::SendChat {
                generation: state.generation(),
                chat_id,
                message: text.to_string(),
            }]
        }
        Msg::ClearClicked => vec![clear_session(&mut state)],
        Msg::UploadFinished {
            generation,
            file_id,
            result,
        } => {
            if generation != state.generation() {
                return (state, Vec::new());
            }
            match result {
                Ok(()) => {
                    state.transition_file(file_id, FileStatus::Uploading, FileStatus::Uploaded);
                }
                Err(err) => {
                    if state.transition_file(file_id, FileStatus::Uploading, FileStatus::Error) {
                        state.push_notice(Severity::Error, format!("Error uploading file: {err}"));
                    }
                }
            }
            Vec::new()
        }
        Msg::DocumentsProcessed {
            generation,
            run,
            result,
        } => {
            if generation != state.generation() {
                return (state, Vec::new());
            }
            let Some(current) = state.run_mut(run) else {
                return (state, Vec::new());
            };
            current.documents_pending = false;
            let file_ids = current.file_ids.clone();
            match result {
                Ok(processed_count) => {
                    for file_id in file_ids {
                        state.transition_file(
                            file_id,
                            FileStatus::Processing,
                            FileStatus::Processed,
                        );
                    }
                    state.push_chat(ChatMessage::assistant(format!(
                        "Successfully processed {processed_count} files!"
                    )));
                }
                Err(err) => {
                    for file_id in file_ids {
                        state.transition_file(file_id, FileStatus::Processing, FileStatus::Error);
                    }
                    record_run_failure(&mut state, run, err);
                }
            }
            finish_run(&mut state);
            Vec::new()
        }
        Msg::UrlProcessed {
            generation,
            run,
            result,
        } => {
            if generation != state.generation() {
                return (state, Vec::new());
            }
            let Some(current) = state.run_mut(run) else {
                return (state, Vec::new());
            };
            current.url_pending = false;
            match result {
                Ok(summary) => {
                    state.push_chat(ChatMessage::assistant(format!(
                        "URL processed successfully! Found {} pages with {} text chunks.",
                        summary.num_pages, summary.num_chunks
                    )));
                }
                Err(err) => record_run_failure(&mut state, run, err),
            }
            finish_run(&mut state);
            Vec::new()
        }
        Msg::ChatReplied {
            generation,
            chat_id,
            result,
        } => {
            if generation != state.generation() || !state.finish_chat(chat_id) {
                return (state, Vec::new());
            }
            let text = match result {
                Ok(response) => response,
                Err(RequestError::Backend(message)) => {
                    format!("Sorry, I encountered an error: {message}")
                }
                Err(RequestError::Network(_)) => {
                    "Sorry, I encountered an error processing your request.".to_string()
                }
            };
            state.push_chat(ChatMessage::assistant(text));
            Vec::new()
        }
        Msg::BackendCleared { generation, result } => {
            if let Err(err) = result {
                if generation == state.generation() {
                    state.push_notice(
                        Severity::Warning,
                        format!("Could not clear documents on the server: {err}"),
                    );
                }
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_upload(state: &mut AppState, file: SelectedFile) -> Effect {
    let file_id = state.insert_file(&file);
    Effect::Upload {
        generation: state.generation(),
        file_id,
        path: file.path,
        name: file.name,
        mime: file.mime,
    }
}

fn clear_session(state: &mut AppState) -> Effect {
    state.reset_session(CLEARED_GREETING);
    Effect::ClearBackend {
        generation: state.generation(),
    }
}

/// A new selection starts a fresh session, but only when something in it is
/// acceptable; rejected files never touch the current session.
fn replace_with_selection(
    state: &mut AppState,
    files: Vec<SelectedFile>,
    accepts: fn(&SelectedFile) -> bool,
) -> Vec<Effect> {
    let (accepted, rejected): (Vec<_>, Vec<_>) = files.into_iter().partition(|file| accepts(file));

    for file in &rejected {
        let err = ValidationError::UnsupportedFileType {
            mime: file.mime_label(),
        };
        state.push_notice(Severity::Error, err.to_string());
    }

    if accepted.is_empty() {
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(accepted.len() + 1);
    effects.push(clear_session(state));
    for file in accepted {
        effects.push(start_upload(state, file));
    }
    effects
}

fn process_all(state: &mut AppState) -> Vec<Effect> {
    let url = state.url().map(ToOwned::to_owned);
    if !state.has_files() && url.is_none() {
        state.push_notice(
            Severity::Error,
            ValidationError::NothingToProcess.to_string(),
        );
        return Vec::new();
    }
    if state.is_processing() {
        state.push_notice(
            Severity::Info,
            ValidationError::AlreadyProcessing.to_string(),
        );
        return Vec::new();
    }

    // Processed, uploading and failed files are not resubmitted.
    let eligible = state.files_with_status(FileStatus::Uploaded);
    if eligible.is_empty() && url.is_none() {
        state.push_notice(Severity::Info, ValidationError::NothingNew.to_string());
        return Vec::new();
    }

    let with_documents = !eligible.is_empty();
    let run = state.begin_run(eligible, url.is_some());
    let generation = state.generation();

    let mut effects = Vec::with_capacity(2);
    if with_documents {
        effects.push(Effect::ProcessDocuments { generation, run });
    }
    if let Some(url) = url {
        effects.push(Effect::ProcessUrl {
            generation,
            run,
            url,
        });
    }
    effects
}

fn record_run_failure(state: &mut AppState, run: crate::RunId, err: RequestError) {
    if let Some(current) = state.run_mut(run) {
        current.failure.get_or_insert_with(|| err.to_string());
    }
}

fn finish_run(state: &mut AppState) {
    let Some(run) = state.take_finished_run() else {
        return;
    };
    match run.failure {
        Some(message) => state.push_notice(
            Severity::Error,
            format!("Error processing documents: {message}"),
        ),
        None => state.push_chat(ChatMessage::assistant(ALL_PROCESSED_MESSAGE)),
    }
}
