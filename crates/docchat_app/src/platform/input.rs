use std::fs;
use std::path::{Path, PathBuf};

use docchat_core::{FileId, Msg, SelectedFile};

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Add(Vec<PathBuf>),
    Pick(Vec<PathBuf>),
    Drop(Vec<PathBuf>),
    Remove(FileId),
    Url(String),
    Process,
    Clear,
    Files,
    Help,
    Quit,
    Chat(String),
    Empty,
    Invalid(String),
}

/// What the frontend should do with an [`Input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dispatch(Vec<Msg>),
    ShowFiles,
    Help,
    Quit,
    Nothing,
}

/// Parses a line. Paths are separated by whitespace.
pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Chat(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let paths = || -> Vec<PathBuf> { rest.split_whitespace().map(PathBuf::from).collect() };

    match name {
        "add" | "pick" | "drop" if rest.is_empty() => {
            Input::Invalid(format!("usage: /{name} <path>..."))
        }
        "add" => Input::Add(paths()),
        "pick" => Input::Pick(paths()),
        "drop" => Input::Drop(paths()),
        "rm" => match rest.parse::<FileId>() {
            Ok(file_id) => Input::Remove(file_id),
            Err(_) => Input::Invalid("usage: /rm <id>".to_string()),
        },
        "url" => Input::Url(rest.to_string()),
        "process" => Input::Process,
        "clear" => Input::Clear,
        "files" => Input::Files,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("unknown command /{other}; try /help")),
    }
}

/// Resolves an input into an action, reading file metadata where needed.
/// Files that cannot be read are reported in the returned problem list.
pub fn resolve(input: Input) -> (Action, Vec<String>) {
    let mut problems = Vec::new();
    let action = match input {
        Input::Add(paths) => Action::Dispatch(
            describe_all(&paths, &mut problems)
                .into_iter()
                .map(Msg::AddFile)
                .collect(),
        ),
        Input::Pick(paths) => {
            selection(describe_all(&paths, &mut problems), Msg::FilesPicked)
        }
        Input::Drop(paths) => {
            selection(describe_all(&paths, &mut problems), Msg::FilesDropped)
        }
        Input::Remove(file_id) => Action::Dispatch(vec![Msg::RemoveFile { file_id }]),
        Input::Url(url) => Action::Dispatch(vec![Msg::UrlChanged(url)]),
        Input::Process => Action::Dispatch(vec![Msg::ProcessClicked]),
        Input::Clear => Action::Dispatch(vec![Msg::ClearClicked]),
        Input::Chat(text) => Action::Dispatch(vec![Msg::ChatSubmitted(text)]),
        Input::Files => Action::ShowFiles,
        Input::Help => Action::Help,
        Input::Quit => Action::Quit,
        Input::Empty => Action::Nothing,
        Input::Invalid(problem) => {
            problems.push(problem);
            Action::Nothing
        }
    };
    (action, problems)
}

fn selection(files: Vec<SelectedFile>, msg: fn(Vec<SelectedFile>) -> Msg) -> Action {
    if files.is_empty() {
        Action::Nothing
    } else {
        Action::Dispatch(vec![msg(files)])
    }
}

fn describe_all(paths: &[PathBuf], problems: &mut Vec<String>) -> Vec<SelectedFile> {
    paths
        .iter()
        .filter_map(|path| match describe_file(path) {
            Ok(file) => Some(file),
            Err(err) => {
                problems.push(format!("cannot read {}: {err}", path.display()));
                None
            }
        })
        .collect()
}

/// Size from file metadata and a MIME type guessed from the extension.
pub fn describe_file(path: &Path) -> std::io::Result<SelectedFile> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    let mime = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    Ok(SelectedFile::new(path, meta.len(), mime))
}
