use std::path::PathBuf;
use std::time::Duration;

use docchat_logging::{docchat_debug, docchat_info};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::wire::{decode_response, ChatRequest, UrlProcessedBody, UrlRequest};
use crate::{
    BackendError, ChatReply, FailureKind, ProcessedDocuments, UploadReceipt, UrlDocumentInfo,
};

const ENDPOINT_CLEAR: &str = "clear-documents";
const ENDPOINT_UPLOAD: &str = "upload";
const ENDPOINT_PROCESS_DOCUMENTS: &str = "process-documents";
const ENDPOINT_PROCESS_URL: &str = "process-url";
const ENDPOINT_CHAT: &str = "chat";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Base URL the endpoint names are joined onto.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
    pub max_concurrent_uploads: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 50 * 1024 * 1024,
            max_concurrent_uploads: 4,
        }
    }
}

/// A local file to send to the `upload` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: Option<String>,
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn clear_documents(&self) -> Result<(), BackendError>;

    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, BackendError>;

    async fn process_documents(&self) -> Result<ProcessedDocuments, BackendError>;

    async fn process_url(&self, url: &str) -> Result<UrlDocumentInfo, BackendError>;

    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, name: &str) -> Result<Url, BackendError> {
        self.base
            .join(name)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post_empty<T: DeserializeOwned>(&self, name: &str) -> Result<T, BackendError> {
        let request = self
            .client
            .post(self.endpoint(name)?)
            .header(CONTENT_TYPE, "application/json");
        self.send(name, request).await
    }

    async fn post_json<B, T>(&self, name: &str, body: &B) -> Result<T, BackendError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| BackendError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let request = self
            .client
            .post(self.endpoint(name)?)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.send(name, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        name: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        docchat_debug!("POST {} -> {}", name, status);
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        decode_response(status.as_u16(), &body)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn clear_documents(&self) -> Result<(), BackendError> {
        let _: serde_json::Value = self.post_empty(ENDPOINT_CLEAR).await?;
        Ok(())
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, BackendError> {
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|err| io_error(&file.path, err))?;
        let len = handle
            .metadata()
            .await
            .map_err(|err| io_error(&file.path, err))?
            .len();
        if len > self.settings.max_upload_bytes {
            return Err(BackendError::from_kind(FailureKind::TooLarge {
                max_bytes: self.settings.max_upload_bytes,
                actual: len,
            }));
        }

        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
        let mut part = Part::stream_with_length(body, len).file_name(file.name.clone());
        if let Some(mime) = file.mime.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|err| BackendError::new(FailureKind::InvalidRequest, err.to_string()))?;
        }
        docchat_info!("Uploading {} ({} bytes)", file.name, len);

        let request = self
            .client
            .post(self.endpoint(ENDPOINT_UPLOAD)?)
            .multipart(Form::new().part("file", part));
        self.send(ENDPOINT_UPLOAD, request).await
    }

    async fn process_documents(&self) -> Result<ProcessedDocuments, BackendError> {
        self.post_empty(ENDPOINT_PROCESS_DOCUMENTS).await
    }

    async fn process_url(&self, url: &str) -> Result<UrlDocumentInfo, BackendError> {
        let body: UrlProcessedBody = self
            .post_json(ENDPOINT_PROCESS_URL, &UrlRequest { url })
            .await?;
        Ok(body.document_info)
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError> {
        self.post_json(ENDPOINT_CHAT, &ChatRequest { message }).await
    }
}

/// Parses the base URL, making sure endpoint names join below it rather than
/// replacing its last path segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let mut base = Url::parse(raw.trim())
        .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(BackendError::new(
            FailureKind::InvalidUrl,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn io_error(path: &std::path::Path, err: std::io::Error) -> BackendError {
    BackendError::new(FailureKind::Io, format!("{}: {err}", path.display()))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let base = parse_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(base.join("chat").unwrap().as_str(), "http://localhost:8000/api/chat");

        let root = parse_base_url("http://localhost:8000").unwrap();
        assert_eq!(root.join("upload").unwrap().as_str(), "http://localhost:8000/upload");
    }

    #[test]
    fn base_url_must_be_absolute() {
        let err = parse_base_url("/api/").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);

        let err = parse_base_url("mailto:someone@example.com").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
