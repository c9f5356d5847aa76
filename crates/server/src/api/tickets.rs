//! Ticket API handlers.
//!
//! Every handler goes through the caller's [`Session`](helpdesk_core::Session),
//! which owns the ticket collection and decides what needs admin rights.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use helpdesk_core::{NewTicket, StatusChange, Ticket, TicketId, TicketStatus};

use super::error::ApiError;
use super::middleware::ActiveSession;
use crate::metrics::{TICKETS_CREATED_TOTAL, TICKETS_DELETED_TOTAL, TICKET_STATUS_CHANGES};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for changing a ticket's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: TicketStatus,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub total: usize,
    /// Present when the session could not load the stored tickets and
    /// started empty.
    pub warning: Option<String>,
}

/// Response for a status change
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub ticket: Ticket,
    /// False when the ticket already had the requested status.
    pub changed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new ticket. No login required.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    session: ActiveSession,
    Json(request): Json<NewTicket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let mut session = session.handle.lock().await;
    let ticket = session.submit(state.sessions().adapter(), request).await?;

    TICKETS_CREATED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// List the session's tickets in submission order.
pub async fn list_tickets(session: ActiveSession) -> Json<ListTicketsResponse> {
    let session = session.handle.lock().await;
    let tickets = session.tickets().to_vec();

    Json(ListTicketsResponse {
        total: tickets.len(),
        tickets,
        warning: session.load_warning().map(str::to_string),
    })
}

/// Change a ticket's status. Admin only.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    session: ActiveSession,
    Path(id): Path<TicketId>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let mut session = session.handle.lock().await;
    let update = session
        .change_status(state.sessions().adapter(), id, body.status)
        .await?;

    if let StatusChange::Changed { from, to } = update.change {
        TICKET_STATUS_CHANGES
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
    }

    Ok(Json(UpdateStatusResponse {
        changed: update.change.is_changed(),
        ticket: update.ticket,
    }))
}

/// Delete a ticket. Admin only.
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    session: ActiveSession,
    Path(id): Path<TicketId>,
) -> Result<Json<Ticket>, ApiError> {
    let mut session = session.handle.lock().await;
    let removed = session.remove(state.sessions().adapter(), id).await?;

    TICKETS_DELETED_TOTAL.inc();
    Ok(Json(removed))
}
