use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use helpdesk_core::{Priority, SanitizedConfig, TicketStatus};

use crate::metrics::{encode_metrics, ACTIVE_SESSIONS};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Values accepted for the `priority` and `status` fields, in display order.
#[derive(Serialize)]
pub struct OptionsResponse {
    pub priorities: &'static [Priority],
    pub statuses: &'static [TicketStatus],
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        priorities: &Priority::ALL,
        statuses: &TicketStatus::ALL,
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ACTIVE_SESSIONS.set(state.sessions().count().await as i64);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
