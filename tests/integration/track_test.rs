//! Integration tests for the document server callback.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_must_save_cuts_a_version() {
    let app = TestApp::new().await;
    app.create_topic("42").await;
    app.documents.serve("http://ds/edited.docx", b"edited");

    let payload = serde_json::json!({
        "status": 2,
        "key": "session-1",
        "url": "http://ds/edited.docx",
    });

    let response = app
        .request("POST", "/track?topic=42&filename=42.docx", Some(payload.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::json!({"error": 0}));

    assert_eq!(std::fs::read(app.path("42/42.docx")).unwrap(), b"edited");
    assert_eq!(
        std::fs::read_to_string(app.path("42/42.docx-history/1/key.txt")).unwrap(),
        "session-1"
    );
    assert!(app.path("42/42.docx-history/1/prev.docx").is_file());

    // The same notification again does not add a version.
    app.request("POST", "/track?topic=42&filename=42.docx", Some(payload), None)
        .await;
    assert!(!app.path("42/42.docx-history/2").exists());
}

#[tokio::test]
async fn test_filename_defaults_to_topic_document() {
    let app = TestApp::new().await;
    app.create_topic("42").await;
    app.documents.serve("http://ds/edited.docx", b"forced");

    let response = app
        .request(
            "POST",
            "/track?topic=42",
            Some(serde_json::json!({"status": 6, "key": "s", "url": "http://ds/edited.docx"})),
            None,
        )
        .await;
    assert_eq!(response.body["error"], 0);
    assert_eq!(std::fs::read(app.path("42/42.docx")).unwrap(), b"forced");
    assert!(!app.path("42/42.docx-history/1").exists());
}

#[tokio::test]
async fn test_departed_editor_triggers_force_save() {
    let app = TestApp::new().await;
    app.create_topic("42").await;

    let payload = serde_json::json!({
        "status": 1,
        "key": "session-9",
        "actions": [{"type": 0, "userid": "jane@example.com"}],
        "users": [],
    });
    app.request("POST", "/track?topic=42&filename=42.docx", Some(payload), None)
        .await;

    let commands = app.documents.commands.lock().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].key(), "session-9");
}

#[tokio::test]
async fn test_failures_are_still_acknowledged() {
    let app = TestApp::new().await;
    app.create_topic("42").await;

    // Document server cannot deliver the content.
    let response = app
        .request(
            "POST",
            "/track?topic=42&filename=42.docx",
            Some(serde_json::json!({"status": 2, "key": "k", "url": "http://ds/missing.docx"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["error"], 0);
    assert!(!app.path("42/42.docx-history/1").exists());

    // No topic at all.
    let response = app
        .request("POST", "/track", Some(serde_json::json!({"status": 2})), None)
        .await;
    assert_eq!(response.body["error"], 0);
}
