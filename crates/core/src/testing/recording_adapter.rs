//! Spy persistence adapter for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::persistence::{PersistenceAdapter, PersistenceError};
use crate::ticket::Ticket;

/// Persistence adapter that keeps the last saved collection in memory and
/// counts calls.
///
/// Unlike [`crate::persistence::EphemeralAdapter`], a later `load` returns
/// what was saved, so it can stand in for a durable backend shared by
/// several sessions.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    stored: Arc<RwLock<Vec<Ticket>>>,
    load_count: AtomicUsize,
    save_count: AtomicUsize,
    next_load_error: Arc<RwLock<Option<PersistenceError>>>,
    next_save_error: Arc<RwLock<Option<PersistenceError>>>,
}

impl RecordingAdapter {
    /// Create an adapter with nothing stored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter that already holds `tickets`.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            stored: Arc::new(RwLock::new(tickets)),
            ..Self::default()
        }
    }

    /// Collection written by the most recent successful save.
    pub async fn stored(&self) -> Vec<Ticket> {
        self.stored.read().await.clone()
    }

    /// Number of save calls, failed ones included.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Number of load calls, failed ones included.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// Configure the next load to fail with the given error.
    pub async fn fail_next_load(&self, error: PersistenceError) {
        *self.next_load_error.write().await = Some(error);
    }

    /// Configure the next save to fail with the given error.
    pub async fn fail_next_save(&self, error: PersistenceError) {
        *self.next_save_error.write().await = Some(error);
    }
}

#[async_trait]
impl PersistenceAdapter for RecordingAdapter {
    async fn load(&self) -> Result<Vec<Ticket>, PersistenceError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_load_error.write().await.take() {
            return Err(error);
        }
        Ok(self.stored.read().await.clone())
    }

    async fn save(&self, tickets: &[Ticket]) -> Result<(), PersistenceError> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_save_error.write().await.take() {
            return Err(error);
        }
        *self.stored.write().await = tickets.to_vec();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
