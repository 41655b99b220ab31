use std::path::{Path, PathBuf};

/// MIME types the backend accepts for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Extensions accepted by the file picker, which does not trust reported MIME types.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A file chosen by the user, before it becomes part of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub mime: Option<String>,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64, mime: Option<String>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            path,
            name,
            size_bytes,
            mime,
        }
    }

    pub(crate) fn mime_label(&self) -> String {
        match self.mime.as_deref() {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => "unknown".to_string(),
        }
    }

    /// Strict check used for drag-and-drop: only the reported MIME type counts.
    pub(crate) fn accepted_by_drop(&self) -> bool {
        self.mime.as_deref().is_some_and(is_accepted_mime)
    }

    /// Loose check used for the picker: a known extension is enough.
    pub(crate) fn accepted_by_picker(&self) -> bool {
        let by_extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            });
        by_extension || self.accepted_by_drop()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Compares the MIME essence (parameters stripped) against [`ACCEPTED_MIME_TYPES`].
pub fn is_accepted_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Human readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }
    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", SIZE_UNITS[unit])
}
