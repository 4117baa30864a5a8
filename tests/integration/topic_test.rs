//! Integration tests for the topic endpoints.

use axum::http::StatusCode;

use crate::helpers::{FixedPermissions, PUBLIC_URL, TestApp};

#[tokio::test]
async fn test_create_and_probe_topic() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");

    let response = app.request("GET", "/topic/42/exists", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            "/topic",
            Some(serde_json::json!({"topicId": 42})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["filename"], "42.docx");
    assert!(app.path("42/42.docx").is_file());

    let response = app.request("GET", "/topic/42/exists", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/topic",
            Some(serde_json::json!({"topicId": "42"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_without_topic_id() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");

    let response = app
        .request("POST", "/topic", Some(serde_json::json!({})), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "No Topic id given");
}

#[tokio::test]
async fn test_requests_need_a_valid_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/topic/42", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/topic/42", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_editor_config() {
    let app = TestApp::new().await;
    app.create_topic("42").await;
    let token = app.token("jane@example.com");

    let response = app.request("GET", "/topic/42", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let config = &response.body;
    assert_eq!(config["file"]["name"], "42.docx");
    assert_eq!(config["file"]["ext"], "docx");
    assert_eq!(config["file"]["version"], 1);
    assert_eq!(
        config["file"]["uri"],
        format!("{PUBLIC_URL}/storage/42/42.docx")
    );
    assert_eq!(config["editor"]["documentType"], "text");
    assert_eq!(config["editor"]["mode"], "edit");
    assert_eq!(config["editor"]["isEdit"], true);
    assert_eq!(config["editor"]["userid"], "jane@example.com");
    assert_eq!(
        config["editor"]["callbackUrl"],
        format!("{PUBLIC_URL}/track?topic=42&filename=42.docx")
    );
    assert_eq!(config["history"].as_array().unwrap().len(), 1);
    assert_eq!(config["history"][0]["user"]["id"], "jane@example.com");
    assert_eq!(config["setHistoryData"]["urlDiff"][0], serde_json::Value::Null);

    let response = app
        .request("GET", "/topic/42?mode=view", None, Some(&token))
        .await;
    assert_eq!(response.body["editor"]["mode"], "view");
}

#[tokio::test]
async fn test_editor_config_for_missing_topic() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");

    let response = app.request("GET", "/topic/7", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unassociated_user_is_forbidden() {
    let app = TestApp::with_permissions(FixedPermissions {
        edit: false,
        associated: false,
    })
    .await;
    let token = app.token("mallory@example.com");

    let response = app
        .request(
            "POST",
            "/topic",
            Some(serde_json::json!({"topicId": "42"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(!app.path("42").exists());
}

#[tokio::test]
async fn test_upload() {
    let app = TestApp::new().await;
    let token = app.token("jane@example.com");

    let response = app.upload("42", "notes.odt", b"odt bytes", &token).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["filename"], "notes.odt");

    let response = app.upload("42", "notes.odt", b"again", &token).await;
    assert_eq!(response.body["filename"], "notes (1).odt");

    let response = app.upload("42", "setup.exe", b"MZ", &token).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "File type is not supported");

    let response = app.upload("42", "empty.docx", b"", &token).await;
    assert_eq!(response.body["message"], "File size is incorrect");
}

#[tokio::test]
async fn test_delete_moves_topic_to_trash() {
    let app = TestApp::new().await;
    app.create_topic("42").await;
    let token = app.token("jane@example.com");

    let response = app.request("DELETE", "/topic/42", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.path("42").exists());
    assert_eq!(std::fs::read_dir(app.path(".trash")).unwrap().count(), 1);

    let response = app.request("DELETE", "/topic/42", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
