//! Mapping from core errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use helpdesk_core::{AuthError, DeskError, TicketError};

use crate::metrics::{AUTH_FAILURES_TOTAL, PERSISTENCE_FAILURES_TOTAL};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<DeskError> for ApiError {
    fn from(e: DeskError) -> Self {
        match e {
            DeskError::Ticket(TicketError::Validation { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            DeskError::Ticket(TicketError::NotFound(_)) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            DeskError::Unauthorized => {
                AUTH_FAILURES_TOTAL
                    .with_label_values(&["admin_required"])
                    .inc();
                Self::new(StatusCode::UNAUTHORIZED, e.to_string())
            }
            DeskError::NotDurable { ref source } => {
                PERSISTENCE_FAILURES_TOTAL.with_label_values(&["save"]).inc();
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    format!(
                        "Change applied in this session but not saved: {}",
                        source
                    ),
                )
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                AUTH_FAILURES_TOTAL
                    .with_label_values(&["invalid_credentials"])
                    .inc();
                Self::new(StatusCode::UNAUTHORIZED, e.to_string())
            }
            AuthError::ConfigurationError(_) => {
                AUTH_FAILURES_TOTAL
                    .with_label_values(&["internal_error"])
                    .inc();
                error!("Authenticator misconfigured: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
