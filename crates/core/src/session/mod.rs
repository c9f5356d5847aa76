//! Per-client session: the ticket store plus the admin flag.
//!
//! A [`Session`] is the only caller of [`TicketStore`]. It decides who may
//! mutate the collection and saves the full collection through the
//! configured [`PersistenceAdapter`] after every change that must be durable.

mod manager;

pub use manager::{SessionHandle, SessionManager};

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{AuthError, Authenticator, Credentials, Identity};
use crate::persistence::{LoadOutcome, PersistenceAdapter, PersistenceError};
use crate::ticket::{
    NewTicket, StatusChange, Ticket, TicketError, TicketId, TicketStatus, TicketStore,
};

/// Errors surfaced to whoever drives a session.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// Operation reserved to the logged-in admin.
    #[error("Admin login required")]
    Unauthorized,

    /// The in-memory change stands but the durable copy was not updated.
    #[error("Change applied but not saved: {source}")]
    NotDurable {
        #[source]
        source: PersistenceError,
    },
}

/// Outcome of a status change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Ticket as it is after the request.
    pub ticket: Ticket,
    pub change: StatusChange,
}

/// State held for one interactive client.
#[derive(Debug)]
pub struct Session {
    id: String,
    store: TicketStore,
    identity: Option<Identity>,
    load_warning: Option<String>,
}

impl Session {
    /// Start a session from what the persistence adapter returned.
    pub fn new(id: impl Into<String>, loaded: LoadOutcome) -> Self {
        Self {
            id: id.into(),
            store: TicketStore::from_tickets(loaded.tickets),
            identity: None,
            load_warning: loaded.warning,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tickets in insertion order.
    pub fn tickets(&self) -> &[Ticket] {
        self.store.list()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Why the session started empty, if loading failed.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Check credentials and mark the session as admin on success.
    ///
    /// A failed attempt leaves the current login state as it was.
    pub async fn login(
        &mut self,
        authenticator: &dyn Authenticator,
        credentials: &Credentials,
    ) -> Result<&Identity, AuthError> {
        match authenticator.authenticate(credentials).await {
            Ok(identity) => {
                info!(session = %self.id, user = %identity.username, "Admin logged in");
                Ok(self.identity.insert(identity))
            }
            Err(e) => {
                warn!(session = %self.id, user = %credentials.username, "Login rejected");
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(identity) = self.identity.take() {
            info!(session = %self.id, user = %identity.username, "Admin logged out");
        }
    }

    /// Submit a new ticket. Anyone may submit.
    pub async fn submit(
        &mut self,
        adapter: &dyn PersistenceAdapter,
        request: NewTicket,
    ) -> Result<Ticket, DeskError> {
        let ticket = self.store.create(request)?;
        self.persist(adapter).await?;
        info!(session = %self.id, ticket_id = ticket.id, "Ticket submitted");
        Ok(ticket)
    }

    /// Change a ticket's status. Admin only.
    ///
    /// Setting the current status again is a no-op and does not save.
    pub async fn change_status(
        &mut self,
        adapter: &dyn PersistenceAdapter,
        id: TicketId,
        status: TicketStatus,
    ) -> Result<StatusUpdate, DeskError> {
        self.require_admin()?;

        let change = self.store.update_status(id, status)?;
        if change.is_changed() {
            self.persist(adapter).await?;
            info!(session = %self.id, ticket_id = id, %status, "Ticket updated");
        }

        let ticket = self
            .store
            .get(id)
            .cloned()
            .ok_or(TicketError::NotFound(id))?;
        Ok(StatusUpdate { ticket, change })
    }

    /// Delete a ticket. Admin only.
    pub async fn remove(
        &mut self,
        adapter: &dyn PersistenceAdapter,
        id: TicketId,
    ) -> Result<Ticket, DeskError> {
        self.require_admin()?;

        let removed = self.store.delete(id)?;
        self.persist(adapter).await?;
        info!(session = %self.id, ticket_id = id, "Ticket deleted");
        Ok(removed)
    }

    fn require_admin(&self) -> Result<(), DeskError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(DeskError::Unauthorized)
        }
    }

    async fn persist(&self, adapter: &dyn PersistenceAdapter) -> Result<(), DeskError> {
        adapter.save(self.store.list()).await.map_err(|source| {
            warn!(session = %self.id, backend = adapter.backend_name(), "Save failed: {}", source);
            DeskError::NotDurable { source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AdminPasswordAuthenticator;
    use crate::persistence::load_or_empty;
    use crate::remote::RemoteError;
    use crate::testing::RecordingAdapter;
    use crate::ticket::Priority;

    fn authenticator() -> AdminPasswordAuthenticator {
        AdminPasswordAuthenticator::new("admin".to_string(), "secret".to_string())
    }

    async fn admin_session() -> Session {
        let mut session = Session::new("s1", LoadOutcome::default());
        session
            .login(&authenticator(), &Credentials::new("admin", "secret"))
            .await
            .unwrap();
        session
    }

    fn save_failure() -> PersistenceError {
        PersistenceError::Save {
            location: "mock:tickets.json".to_string(),
            source: RemoteError::Api {
                status: 500,
                message: "down".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_submit_saves_full_collection() {
        let adapter = RecordingAdapter::new();
        let mut session = Session::new("s1", LoadOutcome::default());

        session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await
            .unwrap();
        session
            .submit(&adapter, NewTicket::new("c", "d", Priority::High))
            .await
            .unwrap();

        assert_eq!(adapter.save_count(), 2);
        assert_eq!(adapter.stored().await, session.tickets().to_vec());
    }

    #[tokio::test]
    async fn test_submit_validation_does_not_save() {
        let adapter = RecordingAdapter::new();
        let mut session = Session::new("s1", LoadOutcome::default());

        let result = session
            .submit(&adapter, NewTicket::new("", "b", Priority::Low))
            .await;

        assert!(matches!(
            result,
            Err(DeskError::Ticket(TicketError::Validation { .. }))
        ));
        assert_eq!(adapter.save_count(), 0);
        assert!(session.tickets().is_empty());
    }

    #[tokio::test]
    async fn test_submit_save_failure_keeps_ticket_in_memory() {
        let adapter = RecordingAdapter::new();
        adapter.fail_next_save(save_failure()).await;
        let mut session = Session::new("s1", LoadOutcome::default());

        let result = session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await;

        assert!(matches!(result, Err(DeskError::NotDurable { .. })));
        assert_eq!(session.tickets().len(), 1);
        assert!(adapter.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_change_status_requires_admin() {
        let adapter = RecordingAdapter::new();
        let mut session = Session::new("s1", LoadOutcome::default());
        session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await
            .unwrap();

        let result = session
            .change_status(&adapter, 1, TicketStatus::Closed)
            .await;

        assert!(matches!(result, Err(DeskError::Unauthorized)));
        assert_eq!(session.tickets()[0].status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_change_status_same_value_skips_save() {
        let adapter = RecordingAdapter::new();
        let mut session = admin_session().await;
        session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await
            .unwrap();
        let saves_before = adapter.save_count();
        let before = session.tickets().to_vec();

        let update = session
            .change_status(&adapter, 1, TicketStatus::Open)
            .await
            .unwrap();

        assert_eq!(update.change, StatusChange::Unchanged);
        assert_eq!(adapter.save_count(), saves_before);
        assert_eq!(session.tickets(), before.as_slice());
    }

    #[tokio::test]
    async fn test_change_status_saves_on_change() {
        let adapter = RecordingAdapter::new();
        let mut session = admin_session().await;
        session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await
            .unwrap();

        let update = session
            .change_status(&adapter, 1, TicketStatus::InProgress)
            .await
            .unwrap();

        assert!(update.change.is_changed());
        assert_eq!(update.ticket.status, TicketStatus::InProgress);
        assert_eq!(adapter.save_count(), 2);
        assert_eq!(adapter.stored().await[0].status, TicketStatus::InProgress);
    }

    #[tokio::test]
    async fn test_change_status_unknown_id() {
        let adapter = RecordingAdapter::new();
        let mut session = admin_session().await;

        let result = session
            .change_status(&adapter, 42, TicketStatus::Closed)
            .await;

        assert!(matches!(
            result,
            Err(DeskError::Ticket(TicketError::NotFound(42)))
        ));
        assert_eq!(adapter.save_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_requires_admin_then_deletes() {
        let adapter = RecordingAdapter::new();
        let mut session = Session::new("s1", LoadOutcome::default());
        session
            .submit(&adapter, NewTicket::new("a", "b", Priority::Low))
            .await
            .unwrap();

        assert!(matches!(
            session.remove(&adapter, 1).await,
            Err(DeskError::Unauthorized)
        ));

        session
            .login(&authenticator(), &Credentials::new("admin", "secret"))
            .await
            .unwrap();
        let removed = session.remove(&adapter, 1).await.unwrap();

        assert_eq!(removed.id, 1);
        assert!(session.tickets().is_empty());
        assert!(adapter.stored().await.is_empty());
        assert!(matches!(
            session.remove(&adapter, 1).await,
            Err(DeskError::Ticket(TicketError::NotFound(1)))
        ));
    }

    #[tokio::test]
    async fn test_failed_login_stays_anonymous() {
        let mut session = Session::new("s1", LoadOutcome::default());

        let result = session
            .login(&authenticator(), &Credentials::new("admin", "nope"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_admin() {
        let mut session = admin_session().await;
        assert_eq!(session.identity().unwrap().username, "admin");

        session.logout();

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_support_desk_scenario_persists() {
        let adapter = RecordingAdapter::new();
        let mut session = admin_session().await;

        session
            .submit(
                &adapter,
                NewTicket::new("Printer down", "Won't turn on", Priority::High),
            )
            .await
            .unwrap();
        session
            .submit(
                &adapter,
                NewTicket::new("VPN issue", "Can't connect", Priority::Medium),
            )
            .await
            .unwrap();
        session
            .change_status(&adapter, 1, TicketStatus::Resolved)
            .await
            .unwrap();
        session.remove(&adapter, 2).await.unwrap();

        let reloaded = Session::new("s2", load_or_empty(&adapter).await);
        let tickets = reloaded.tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, 1);
        assert_eq!(tickets[0].subject, "Printer down");
        assert_eq!(tickets[0].status, TicketStatus::Resolved);
    }

    #[tokio::test]
    async fn test_load_warning_is_kept() {
        let session = Session::new(
            "s1",
            LoadOutcome {
                tickets: Vec::new(),
                warning: Some("unreachable".to_string()),
            },
        );
        assert_eq!(session.load_warning(), Some("unreachable"));
    }
}
