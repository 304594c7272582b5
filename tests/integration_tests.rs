//! Integration tests for the resume upload service

use std::io::Cursor;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use resume_parser::{
    client::{ResumeClient, SelectedFile, StatusKind, UploadSession},
    create_router,
    models::MIME_DOCX,
    AppState, ClientConfig, Config,
};

const BOUNDARY: &str = "resume-test-boundary";

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        upload_dir: dir.path().to_path_buf(),
        max_file_size_mb: 1,
        ..Config::default()
    };
    (create_router(AppState::new(config)), dir)
}

fn docx_bytes(lines: &[&str]) -> Vec<u8> {
    let mut doc = Docx::new();
    for line in lines {
        doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut buf = Cursor::new(Vec::new());
    doc.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

fn pdf_bytes(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![16.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn sample_resume() -> Vec<u8> {
    docx_bytes(&[
        "Jane Doe",
        "jane.doe@example.com",
        "",
        "Skills",
        "Python, Rust, Docker",
    ])
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_file_part() {
    let (app, _dir) = test_app();
    let body = multipart_body("document", "cv.pdf", "application/pdf", b"%PDF");

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "No file part");
    assert_eq!(json["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_empty_file_name() {
    let (app, _dir) = test_app();
    let body = multipart_body("file", "", "application/octet-stream", b"");

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No selected file");
}

#[tokio::test]
async fn test_invalid_file_type() {
    let (app, _dir) = test_app();
    let body = multipart_body("file", "notes.txt", "text/plain", b"hello");

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid file type");
    assert_eq!(json["code"], "INVALID_FILE_TYPE");
    assert!(json["request_id"].is_string());
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let (app, _dir) = test_app();
    let content = vec![b'a'; 1024 * 1024 + 1];
    let body = multipart_body("file", "cv.pdf", "application/pdf", &content);

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = json_body(response).await;
    assert_eq!(json["code"], "FILE_TOO_LARGE");
    assert_eq!(json["error"], "File too large: 2MB exceeds limit of 1MB");
}

#[tokio::test]
async fn test_body_far_past_limit_is_payload_too_large() {
    let (app, dir) = test_app();
    let content = vec![b'a'; 2 * 1024 * 1024];
    let body = multipart_body("file", "cv.pdf", "application/pdf", &content);
    let mut request = upload_request(body.clone());
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, body.len().into());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = json_body(response).await;
    assert_eq!(json["code"], "FILE_TOO_LARGE");
    assert_eq!(json["error"], "File too large: 3MB exceeds limit of 1MB");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pdf_upload_is_parsed() {
    let (app, dir) = test_app();
    let pdf = pdf_bytes(&["Jane Doe", "jane.doe@example.com"]);
    let body = multipart_body("file", "cv.pdf", "application/pdf", &pdf);

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["contact"]["email"], "jane.doe@example.com");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_corrupt_pdf_is_server_error() {
    let (app, dir) = test_app();
    let body = multipart_body("file", "cv.pdf", "application/pdf", b"%PDF-1.4\nnot really a pdf");

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "EXTRACTION_ERROR");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_error_body_carries_the_request_id() {
    let (app, _dir) = test_app();
    let body = multipart_body("file", "notes.txt", "text/plain", b"hello");
    let mut request = upload_request(body);
    request
        .headers_mut()
        .insert("x-request-id", "req-0001-abcdef".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-0001-abcdef");
    assert_eq!(json_body(response).await["request_id"], "req-0001-abcdef");
}

#[tokio::test]
async fn test_unreadable_document_is_server_error() {
    let (app, dir) = test_app();
    let body = multipart_body("file", "cv.docx", MIME_DOCX, b"definitely not a zip");

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "EXTRACTION_ERROR");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_docx_upload_is_parsed() {
    let (app, dir) = test_app();
    let body = multipart_body("file", "Jane Doe Resume.docx", MIME_DOCX, &sample_resume());

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = json_body(response).await;
    let data = &json["data"];
    assert_eq!(data["name"], "Jane Doe");
    assert_eq!(data["contact"]["email"], "jane.doe@example.com");
    assert_eq!(
        data["skills"]["Programming Languages"],
        serde_json::json!(["Python", "Rust"])
    );
    assert!(data["education"].as_array().unwrap().is_empty());

    // The staged copy is gone once the request completes.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _dir) = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _dir) = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"]["text_extractor"], true);
    assert_eq!(json["limits"]["max_file_size_mb"], 1);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ready_fails_without_upload_dir() {
    let config = Config {
        upload_dir: "/definitely/not/here".into(),
        ..Config::default()
    };
    let app = create_router(AppState::new(config));

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_client_round_trip_over_http() {
    let (app, _dir) = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::default().with_upload_url(format!("http://{addr}/upload"));
    let client = ResumeClient::new(&config).unwrap();

    // Server-side rejection surfaces the server's message.
    let mut session = UploadSession::default();
    session.select_file(Some(SelectedFile::new("cv.doc", "application/msword", b"junk".to_vec())));
    session.submit(&client).await;
    assert_eq!(session.status_kind(), StatusKind::Error);
    assert!(session.error().is_some());
    assert!(session.selected_file().is_some());

    session.select_file(Some(SelectedFile::new("cv.docx", MIME_DOCX, sample_resume())));
    session.submit(&client).await;
    assert_eq!(session.status(), Some("Resume parsed successfully!"));
    let parsed = session.parsed().unwrap();
    assert_eq!(parsed.name, "Jane Doe");
    assert_eq!(parsed.contact.email, "jane.doe@example.com");
}
