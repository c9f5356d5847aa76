use async_trait::async_trait;

use super::{PersistenceAdapter, PersistenceError};
use crate::ticket::Ticket;

/// Adapter that keeps nothing: tickets live only as long as the session.
pub struct EphemeralAdapter;

impl EphemeralAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EphemeralAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceAdapter for EphemeralAdapter {
    async fn load(&self) -> Result<Vec<Ticket>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn save(&self, _tickets: &[Ticket]) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "ephemeral"
    }
}
