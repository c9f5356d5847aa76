//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the full router with a
//! test double behind the persistence seam, enabling end-to-end testing
//! without a GitHub repository.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use helpdesk_core::testing::{MockRepository, RecordingAdapter};
use helpdesk_core::{
    AdminPasswordAuthenticator, AuthConfig, Config, PersistenceAdapter, PersistenceConfig,
    RemoteFileAdapter, ServerConfig,
};
use helpdesk_server::api::middleware::SESSION_HEADER;
use helpdesk_server::state::AppState;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Test fixture for in-process API testing.
///
/// Behaves like a single browser: the session id returned by the server is
/// remembered and sent with every following request.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/tickets", json!({
///         "subject": "Printer down",
///         "description": "Won't turn on",
///         "priority": "High"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Adapter the server saves through
    pub adapter: Arc<dyn PersistenceAdapter>,
    session_id: Mutex<Option<String>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub session_id: Option<String>,
}

impl TestFixture {
    /// Fixture backed by a [`RecordingAdapter`].
    pub fn new() -> Self {
        Self::with_recording(Arc::new(RecordingAdapter::new())).0
    }

    /// Fixture backed by the given recording adapter, returned for assertions.
    pub fn with_recording(adapter: Arc<RecordingAdapter>) -> (Self, Arc<RecordingAdapter>) {
        let fixture = Self::with_adapter(Arc::clone(&adapter) as Arc<dyn PersistenceAdapter>);
        (fixture, adapter)
    }

    /// Fixture whose tickets live in a [`MockRepository`] file.
    pub fn with_repository(repository: Arc<MockRepository>) -> Self {
        Self::with_adapter(Arc::new(RemoteFileAdapter::new(
            repository,
            "tickets.json",
            "Update support tickets",
        )))
    }

    pub fn with_adapter(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let config = Config {
            auth: AuthConfig {
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                ..ServerConfig::default()
            },
            persistence: PersistenceConfig::default(),
        };

        let authenticator = Arc::new(AdminPasswordAuthenticator::new(
            ADMIN_USERNAME.to_string(),
            ADMIN_PASSWORD.to_string(),
        ));

        let state = Arc::new(AppState::new(config, authenticator, Arc::clone(&adapter)));
        let router = helpdesk_server::api::create_router(state);

        Self {
            router,
            adapter,
            session_id: Mutex::new(None),
        }
    }

    /// Session id the fixture currently sends.
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().unwrap().clone()
    }

    /// Stop sending a session id, as a new browser would.
    pub fn forget_session(&self) {
        *self.session_id.lock().unwrap() = None;
    }

    /// Log in with the configured admin credential.
    pub async fn login_as_admin(&self) -> TestResponse {
        self.post(
            "/api/v1/session/login",
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await
    }

    /// Submit a ticket and return the response.
    pub async fn submit(&self, subject: &str, description: &str, priority: &str) -> TestResponse {
        self.post(
            "/api/v1/tickets",
            json!({
                "subject": subject,
                "description": description,
                "priority": priority,
            }),
        )
        .await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = self
            .builder("POST", path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch the Prometheus text output.
    pub async fn metrics_text(&self) -> String {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match self.session_id() {
            Some(id) => builder.header(SESSION_HEADER, id),
            None => builder,
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = self.builder(method, path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(id) = &session_id {
            *self.session_id.lock().unwrap() = Some(id.clone());
        }

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            session_id,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
