use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BackendError, FailureKind, UrlDocumentInfo};

#[derive(Debug, Serialize)]
pub(crate) struct UrlRequest<'a> {
    pub(crate) url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub(crate) message: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UrlProcessedBody {
    pub(crate) document_info: UrlDocumentInfo,
}

/// Interprets a backend response body.
///
/// The body is parsed as JSON whatever the status code, because the backend
/// reports failures as `{"error": ...}` on 4xx/5xx responses too. An `error`
/// field wins over the status; a non-2xx status without one is reported as
/// such; anything else must deserialize into `T`.
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<T, BackendError> {
    let success = (200..300).contains(&status);
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if !success => {
            return Err(BackendError::from_kind(FailureKind::HttpStatus(status)))
        }
        Err(err) => {
            return Err(BackendError::new(
                FailureKind::InvalidResponse,
                format!("response is not JSON: {err}"),
            ))
        }
    };

    if let Some(message) = error_field(&value) {
        return Err(BackendError::new(FailureKind::Backend, message));
    }
    if !success {
        return Err(BackendError::from_kind(FailureKind::HttpStatus(status)));
    }

    serde_json::from_value(value)
        .map_err(|err| BackendError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
