//! Integration tests for static storage serving.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_documents_are_served() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");
    app.upload("42", "report.txt", b"hello", &token).await;

    let response = app.request("GET", "/storage/42/report.txt", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.raw.as_ref(), b"hello");
}

#[tokio::test]
async fn test_trash_is_not_served() {
    let app = TestApp::new().await;
    app.create_topic("42").await;
    let token = app.token("jane@example.com");
    app.request("DELETE", "/topic/42", None, Some(&token)).await;

    let trashed = std::fs::read_dir(app.path(".trash"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .file_name()
        .to_string_lossy()
        .to_string();

    let response = app
        .request("GET", &format!("/storage/.trash/{trashed}/42.docx"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
