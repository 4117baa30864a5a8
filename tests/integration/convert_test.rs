//! Integration tests for manual conversion.

use axum::http::StatusCode;

use docgate_core::traits::ConversionOutcome;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_convert_polls_until_done() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");
    app.upload("42", "notes.odt", b"odt", &token).await;

    app.documents
        .answer_conversions(ConversionOutcome::Pending { percent: 40 });
    let response = app
        .request("GET", "/convert?topic=42&filename=notes.odt", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        serde_json::json!({"filename": "notes.odt", "step": 40})
    );

    app.documents.serve("http://ds/notes.docx", b"docx");
    app.documents
        .answer_conversions(ConversionOutcome::Completed("http://ds/notes.docx".to_string()));
    let response = app
        .request("GET", "/convert?topic=42&filename=notes.odt", None, Some(&token))
        .await;
    assert_eq!(response.body, serde_json::json!({"filename": "notes.docx"}));
    assert!(!app.path("42/notes.odt").exists());
    assert_eq!(std::fs::read(app.path("42/notes.docx")).unwrap(), b"docx");
}

#[tokio::test]
async fn test_convert_reports_failures() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");
    app.upload("42", "notes.odt", b"odt", &token).await;

    let response = app
        .request("GET", "/convert?topic=42&filename=notes.odt", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["error"].is_string());

    let response = app
        .request("GET", "/convert?topic=42", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
