use docchat_core::{
    Author, ChatMessage, FileRowView, FileStatus, Generation, Notice, SessionViewModel, Severity,
};

use super::constants::*;

/// Turns successive view models into terminal lines, printing only what
/// changed since the previous call.
#[derive(Debug, Default)]
pub struct Renderer {
    generation: Generation,
    chat_seen: usize,
    files: Vec<FileRowView>,
    url: Option<String>,
    typing: bool,
    processing: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &SessionViewModel, notices: &[Notice]) -> Vec<String> {
        let mut lines = Vec::new();

        if view.generation != self.generation {
            self.generation = view.generation;
            self.chat_seen = 0;
            lines.push(SESSION_RULE.to_string());
        }

        if view.processing && !self.processing {
            lines.push(PROCESSING_TEXT.to_string());
        }
        self.processing = view.processing;

        if view.files != self.files {
            lines.extend(render_files(&view.files));
            self.files = view.files.clone();
        }

        if view.url != self.url {
            match &view.url {
                Some(url) => lines.push(format!("URL: {url}")),
                None if self.url.is_some() => lines.push("URL cleared".to_string()),
                None => {}
            }
            self.url = view.url.clone();
        }

        let start = self.chat_seen.min(view.chat.len());
        lines.extend(view.chat[start..].iter().map(format_message));
        self.chat_seen = view.chat.len();

        if view.typing && !self.typing {
            lines.push(TYPING_TEXT.to_string());
        }
        self.typing = view.typing;

        lines.extend(notices.iter().map(format_notice));
        lines
    }
}

pub fn render_files(files: &[FileRowView]) -> Vec<String> {
    if files.is_empty() {
        return vec!["No files.".to_string()];
    }
    files
        .iter()
        .map(|file| {
            format!(
                "[#{id}] {status:<10} {name} ({size})",
                id = file.file_id,
                status = status_label(file.status),
                name = file.name,
                size = file.size_label
            )
        })
        .collect()
}

fn status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Uploading => "uploading",
        FileStatus::Uploaded => "uploaded",
        FileStatus::Processing => "processing",
        FileStatus::Processed => "processed",
        FileStatus::Error => "error",
    }
}

fn format_message(message: &ChatMessage) -> String {
    let label = match message.author {
        Author::User => USER_LABEL,
        Author::Assistant => ASSISTANT_LABEL,
    };
    format!("{label}: {}", message.text)
}

fn format_notice(notice: &Notice) -> String {
    let tag = match notice.severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::{update, AppState, Msg, SelectedFile, GREETING};
    use pretty_assertions::assert_eq;

    #[test]
    fn first_render_prints_greeting_only_once() {
        let mut renderer = Renderer::new();
        let view = AppState::new().view();

        assert_eq!(
            renderer.render(&view, &[]),
            vec![format!("Assistant: {GREETING}")]
        );
        assert!(renderer.render(&view, &[]).is_empty());
    }

    #[test]
    fn new_chat_lines_and_typing_indicator() {
        let mut renderer = Renderer::new();
        let state = AppState::new();
        renderer.render(&state.view(), &[]);

        let (state, _) = update(state, Msg::ChatSubmitted("hello".to_string()));
        assert_eq!(
            renderer.render(&state.view(), &[]),
            vec!["You: hello".to_string(), TYPING_TEXT.to_string()]
        );
    }

    #[test]
    fn file_table_printed_when_it_changes() {
        let mut renderer = Renderer::new();
        let file = SelectedFile::new("report.pdf", 500_000, Some("application/pdf".into()));
        let (state, _) = update(AppState::new(), Msg::AddFile(file));

        let lines = renderer.render(&state.view(), &[]);
        assert_eq!(lines[0], "[#1] uploading  report.pdf (488.28 KB)");
        assert!(!renderer.render(&state.view(), &[]).contains(&lines[0]));
    }

    #[test]
    fn clear_starts_a_new_transcript() {
        let mut renderer = Renderer::new();
        let (state, _) = update(AppState::new(), Msg::UrlChanged("https://a.example".into()));
        renderer.render(&state.view(), &[]);

        let (state, _) = update(state, Msg::ClearClicked);
        let lines = renderer.render(&state.view(), &[]);
        assert_eq!(lines[0], SESSION_RULE);
        assert!(lines.contains(&"URL cleared".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Assistant: Previous documents cleared. Ready for new uploads!"
        );
    }

    #[test]
    fn notices_are_tagged_by_severity() {
        let mut renderer = Renderer::new();
        let view = AppState::new().view();
        renderer.render(&view, &[]);

        let notices = [Notice {
            severity: Severity::Error,
            text: "Please upload files or enter a URL first".to_string(),
        }];
        assert_eq!(
            renderer.render(&view, &notices),
            vec!["[error] Please upload files or enter a URL first".to_string()]
        );
    }
}
