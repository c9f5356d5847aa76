//! In-memory ticket collection for one session.

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use super::types::{format_timestamp, NewTicket, StatusChange, Ticket, TicketId, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// A required text field was empty; nothing was stored.
    #[error("Please fill in both the subject and description ({field} is empty)")]
    Validation { field: &'static str },

    /// No ticket carries this id.
    #[error("Ticket not found: {0}")]
    NotFound(TicketId),
}

/// Ordered ticket collection.
///
/// Insertion order is preserved. Ids are derived from the collection length
/// at creation time and are never renumbered, so a delete followed by a
/// create can produce a duplicate id. Lookups always act on the first match.
///
/// The store does no permission checks; callers decide who may mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
}

impl TicketStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a store from a previously saved snapshot.
    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        Self { tickets }
    }

    /// Create a ticket stamped with the current local time.
    pub fn create(&mut self, request: NewTicket) -> Result<Ticket, TicketError> {
        self.create_at(request, Local::now())
    }

    /// Create a ticket stamped with `at`.
    pub fn create_at(
        &mut self,
        request: NewTicket,
        at: DateTime<Local>,
    ) -> Result<Ticket, TicketError> {
        if request.subject.is_empty() {
            return Err(TicketError::Validation { field: "subject" });
        }
        if request.description.is_empty() {
            return Err(TicketError::Validation {
                field: "description",
            });
        }

        let ticket = Ticket {
            id: self.tickets.len() as TicketId + 1,
            timestamp: format_timestamp(at),
            subject: request.subject,
            description: request.description,
            priority: request.priority,
            status: TicketStatus::Open,
        };

        debug!(ticket_id = ticket.id, priority = %ticket.priority, "Ticket created");
        self.tickets.push(ticket.clone());
        Ok(ticket)
    }

    /// All tickets in insertion order.
    pub fn list(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Owned copy of the collection, for handing to a persistence adapter.
    pub fn snapshot(&self) -> Vec<Ticket> {
        self.tickets.clone()
    }

    /// First ticket with this id.
    pub fn get(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Set the status of the first ticket with this id.
    ///
    /// Setting the status a ticket already has is reported as
    /// [`StatusChange::Unchanged`] and leaves the store untouched.
    pub fn update_status(
        &mut self,
        id: TicketId,
        status: TicketStatus,
    ) -> Result<StatusChange, TicketError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TicketError::NotFound(id))?;

        if ticket.status == status {
            return Ok(StatusChange::Unchanged);
        }

        let from = ticket.status;
        ticket.status = status;
        debug!(ticket_id = id, %from, to = %status, "Ticket status changed");
        Ok(StatusChange::Changed { from, to: status })
    }

    /// Remove the first ticket with this id and return it.
    pub fn delete(&mut self, id: TicketId) -> Result<Ticket, TicketError> {
        let index = self
            .tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or(TicketError::NotFound(id))?;

        let removed = self.tickets.remove(index);
        debug!(ticket_id = id, "Ticket deleted");
        Ok(removed)
    }
}
