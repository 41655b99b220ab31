use std::io::Write;
use std::time::Duration;

use docchat_engine::{
    Backend, BackendSettings, FailureKind, ProcessedDocuments, ReqwestBackend, UploadFile,
    UrlDocumentInfo,
};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let settings = BackendSettings {
        base_url: format!("{}/api", server.uri()),
        ..BackendSettings::default()
    };
    ReqwestBackend::new(settings).expect("backend")
}

fn temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "File uploaded successfully",
            "document_info": {"filename": "report.pdf", "status": "uploaded"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let local = temp_file(b"%PDF-1.4 fake");
    let file = UploadFile {
        path: local.path().to_path_buf(),
        name: "report.pdf".to_string(),
        mime: Some("application/pdf".to_string()),
    };

    let receipt = backend_for(&server).upload(&file).await.expect("upload ok");
    assert_eq!(receipt.message.as_deref(), Some("File uploaded successfully"));

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="report.pdf""#));
    assert!(body
        .to_ascii_lowercase()
        .contains("content-type: application/pdf"));
    assert!(body.contains("%PDF-1.4 fake"));
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn upload_reports_backend_error_from_400() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "Unsupported file type"})),
        )
        .mount(&server)
        .await;

    let local = temp_file(b"plain");
    let file = UploadFile {
        path: local.path().to_path_buf(),
        name: "notes.txt".to_string(),
        mime: Some("text/plain".to_string()),
    };

    let err = backend_for(&server).upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Backend);
    assert_eq!(err.message, "Unsupported file type");
    assert!(err.is_backend_reported());
}

#[tokio::test]
async fn oversized_upload_is_refused_locally() {
    let server = MockServer::start().await;
    let local = temp_file(&[b'x'; 64]);
    let settings = BackendSettings {
        base_url: server.uri(),
        max_upload_bytes: 16,
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(settings).expect("backend");
    let file = UploadFile {
        path: local.path().to_path_buf(),
        name: "big.txt".to_string(),
        mime: None,
    };

    let err = backend.upload(&file).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 16,
            actual: 64
        }
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_local_file_is_io_error() {
    let server = MockServer::start().await;
    let file = UploadFile {
        path: "/definitely/not/here.pdf".into(),
        name: "here.pdf".to_string(),
        mime: None,
    };

    let err = backend_for(&server).upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn process_documents_reads_processed_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-documents"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"processed_count": 1})),
        )
        .mount(&server)
        .await;

    let processed = backend_for(&server).process_documents().await.expect("ok");
    assert_eq!(processed, ProcessedDocuments { processed_count: 1 });
}

#[tokio::test]
async fn process_documents_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-documents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = backend_for(&server).process_documents().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn process_url_posts_url_and_reads_document_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-url"))
        .and(body_json(serde_json::json!({"url": "http://example.com/doc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "URL processed successfully",
            "document_info": {
                "url": "http://example.com/doc",
                "status": "processed",
                "type": "url",
                "num_pages": 5,
                "num_chunks": 20
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = backend_for(&server)
        .process_url("http://example.com/doc")
        .await
        .expect("ok");
    assert_eq!(
        info,
        UrlDocumentInfo {
            num_pages: 5,
            num_chunks: 20
        }
    );
}

#[tokio::test]
async fn chat_posts_message_and_reads_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({"message": "hello"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": "Hi there"})),
        )
        .mount(&server)
        .await;

    let reply = backend_for(&server).chat("hello").await.expect("ok");
    assert_eq!(reply.response, "Hi there");
}

#[tokio::test]
async fn chat_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "no documents loaded"})),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).chat("hello").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Backend);
    assert_eq!(err.to_string(), "no documents loaded");
}

#[tokio::test]
async fn clear_documents_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/clear-documents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "Documents cleared successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server).clear_documents().await.expect("ok");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({"response": "late"})),
        )
        .mount(&server)
        .await;

    let settings = BackendSettings {
        base_url: format!("{}/api/", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(settings).expect("backend");

    let err = backend.chat("hello").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let settings = BackendSettings {
        base_url: "http://127.0.0.1:9/api/".to_string(),
        connect_timeout: Duration::from_millis(200),
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(settings).expect("backend");

    let err = backend.clear_documents().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[test]
fn invalid_base_url_is_rejected() {
    let settings = BackendSettings {
        base_url: "not a url".to_string(),
        ..BackendSettings::default()
    };
    let err = ReqwestBackend::new(settings).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
