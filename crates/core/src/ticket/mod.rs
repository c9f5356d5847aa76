//! Ticket model and the per-session ticket store.

mod store;
mod types;

pub use store::{TicketError, TicketStore};
pub use types::{
    format_timestamp, NewTicket, Priority, StatusChange, Ticket, TicketId, TicketStatus,
    TIMESTAMP_FORMAT,
};
