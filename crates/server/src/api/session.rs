//! Session API handlers: admin login/logout, status, and teardown.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use helpdesk_core::{Credentials, Session};

use super::error::ApiError;
use super::middleware::{ActiveSession, SESSION_HEADER};
use crate::metrics::ACTIVE_SESSIONS;
use crate::state::AppState;

/// Response describing the caller's session
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub authenticated: bool,
    pub ticket_count: usize,
    pub load_warning: Option<String>,
}

impl From<&Session> for SessionStatus {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            authenticated: session.is_authenticated(),
            ticket_count: session.tickets().len(),
            load_warning: session.load_warning().map(str::to_string),
        }
    }
}

/// Log in as admin.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: ActiveSession,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionStatus>, ApiError> {
    let mut session = session.handle.lock().await;
    session.login(state.authenticator(), &credentials).await?;
    Ok(Json(SessionStatus::from(&*session)))
}

/// Drop admin rights; the session and its tickets stay.
pub async fn logout(session: ActiveSession) -> Json<SessionStatus> {
    let mut session = session.handle.lock().await;
    session.logout();
    Json(SessionStatus::from(&*session))
}

pub async fn get_session(session: ActiveSession) -> Json<SessionStatus> {
    let session = session.handle.lock().await;
    Json(SessionStatus::from(&*session))
}

/// End the session named by the session header. The next request starts a
/// fresh one. Ending a missing or unknown session is a no-op.
pub async fn end_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> StatusCode {
    let requested = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
    if let Some(id) = requested {
        if state.sessions().end(id).await {
            ACTIVE_SESSIONS.set(state.sessions().count().await as i64);
        }
    }
    StatusCode::NO_CONTENT
}
