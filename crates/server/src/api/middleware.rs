//! Session and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use helpdesk_core::SessionHandle;

use crate::metrics::{
    normalize_path, ACTIVE_SESSIONS, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION, PERSISTENCE_FAILURES_TOTAL,
};
use crate::state::AppState;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Session middleware: resolves the caller's session before the handler runs.
///
/// The id is read from [`SESSION_HEADER`]. A missing or unknown id starts a
/// new session (which loads the ticket collection once). The resolved id is
/// echoed on the response unless the session is gone by the time the handler
/// returns.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let requested = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (id, handle) = state.sessions().get_or_create(requested.as_deref()).await;

    if requested.as_deref() != Some(id.as_str()) {
        ACTIVE_SESSIONS.set(state.sessions().count().await as i64);
        if handle.lock().await.load_warning().is_some() {
            PERSISTENCE_FAILURES_TOTAL.with_label_values(&["load"]).inc();
        }
    }

    request.extensions_mut().insert(ActiveSession {
        id: id.clone(),
        handle,
    });

    let mut response = next.run(request).await;

    if state.sessions().get(&id).await.is_some() {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            Err(e) => warn!(session = %id, "Session id is not a valid header value: {}", e),
        }
    }

    response
}

/// Extractor for the session resolved by [`session_middleware`].
///
/// Rejects with 500 if the route is not behind the session middleware.
#[derive(Clone)]
pub struct ActiveSession {
    pub id: String,
    pub handle: SessionHandle,
}

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = parts
            .extensions
            .get::<ActiveSession>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR);
        std::future::ready(session)
    }
}
