//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use docgate_core::config::AppConfig;
use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::{
    CommandRequest, ConversionOutcome, ConversionRequest, DocumentService, PermissionChecker,
};
use docgate_core::types::TopicId;

pub const SECRET: &str = "integration-secret";
pub const PUBLIC_URL: &str = "http://gate.test";
const BOUNDARY: &str = "docgate-test-boundary";

/// Document server double.
#[derive(Debug, Default)]
pub struct MockDocuments {
    /// URI → content served by `download`.
    pub files: Mutex<HashMap<String, Bytes>>,
    /// Answer to every conversion; `None` fails it.
    pub conversion: Mutex<Option<ConversionOutcome>>,
    /// Received commands.
    pub commands: Mutex<Vec<CommandRequest>>,
}

impl MockDocuments {
    pub fn serve(&self, uri: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(uri.to_string(), Bytes::copy_from_slice(data));
    }

    pub fn answer_conversions(&self, outcome: ConversionOutcome) {
        *self.conversion.lock().unwrap() = Some(outcome);
    }
}

#[async_trait]
impl DocumentService for MockDocuments {
    async fn convert(&self, _request: &ConversionRequest) -> AppResult<ConversionOutcome> {
        self.conversion
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::conversion_failed("conversion rejected"))
    }

    async fn command(&self, command: &CommandRequest) -> AppResult<()> {
        self.commands.lock().unwrap().push(command.clone());
        Ok(())
    }

    async fn download(&self, uri: &str) -> AppResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| AppError::external(format!("nothing at {uri}")))
    }
}

/// Permission double with fixed answers.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermissions {
    pub edit: bool,
    pub associated: bool,
}

#[async_trait]
impl PermissionChecker for FixedPermissions {
    async fn is_allowed_to_edit(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(self.edit)
    }

    async fn is_associated_to(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(self.associated)
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Storage root
    pub dir: tempfile::TempDir,
    /// Document server double
    pub documents: Arc<MockDocuments>,
}

impl TestApp {
    /// Application where every caller may view and edit.
    pub async fn new() -> Self {
        Self::with_permissions(FixedPermissions {
            edit: true,
            associated: true,
        })
        .await
    }

    pub async fn with_permissions(permissions: FixedPermissions) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create storage root");

        let mut config = AppConfig::default();
        config.storage.root_path = dir.path().to_string_lossy().to_string();
        config.server.public_url = PUBLIC_URL.to_string();
        config.auth.enabled = true;
        config.auth.jwt_secret = SECRET.to_string();

        let documents = Arc::new(MockDocuments::default());
        let state = docgate_api::build_state(
            config,
            Arc::clone(&documents) as Arc<dyn DocumentService>,
            Arc::new(permissions),
        )
        .await
        .expect("Failed to build state");

        Self {
            router: docgate_api::build_app(state),
            dir,
            documents,
        }
    }

    /// HS256 token for `user`, valid for an hour.
    pub fn token(&self, user: &str) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        encode(
            &Header::default(),
            &serde_json::json!({"unique_name": user, "name": "Jane Doe", "exp": exp}),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to sign token")
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Upload `data` as the `uploadedFile` field of a multipart form.
    pub async fn upload(&self, topic: &str, file_name: &str, data: &[u8], token: &str) -> TestResponse {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploadedFile\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(format!("/topic/{topic}"))
            .header("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            raw: body_bytes,
        }
    }

    /// Creates topic `id` through the API.
    pub async fn create_topic(&self, id: &str) {
        let token = self.token("jane@example.com");
        let response = self
            .request(
                "POST",
                "/topic",
                Some(serde_json::json!({"topicId": id})),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    pub fn path(&self, relative: &str) -> std::path::PathBuf {
        self.dir.path().join(relative)
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
    /// Raw body
    pub raw: Bytes,
}
