//! Session lifecycle: created on first access, dropped on session end or
//! after sitting idle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use super::Session;
use crate::persistence::{load_or_empty, PersistenceAdapter};

/// Shared handle to one session. The mutex serializes that session's
/// operations, including the save that follows a mutation.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Idle time after which a session is dropped, unless configured otherwise.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    handle: SessionHandle,
    last_access: Instant,
}

impl SessionEntry {
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.last_access) >= timeout
    }
}

/// Owns all live sessions and the persistence adapter they share.
pub struct SessionManager {
    adapter: Arc<dyn PersistenceAdapter>,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            adapter,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Drop sessions that have not been accessed for `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Adapter used for loading new sessions and saving mutations.
    pub fn adapter(&self) -> &dyn PersistenceAdapter {
        self.adapter.as_ref()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Return the session for `id`, or start a new one.
    ///
    /// Unknown ids are not adopted: a new session always gets a freshly
    /// generated id, which is returned alongside the handle. Starting a
    /// session first drops every idle one.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle) {
        if let Some(id) = id {
            if let Some(handle) = self.get(id).await {
                return (id.to_string(), handle);
            }
        }

        self.evict_idle().await;

        let id = uuid::Uuid::new_v4().to_string();
        // Load before taking the write lock so a slow backend only delays this session
        let loaded = load_or_empty(self.adapter.as_ref()).await;
        let ticket_count = loaded.tickets.len();
        let handle = Arc::new(Mutex::new(Session::new(id.clone(), loaded)));

        self.sessions.write().await.insert(
            id.clone(),
            SessionEntry {
                handle: Arc::clone(&handle),
                last_access: Instant::now(),
            },
        );
        info!(
            session = %id,
            tickets = ticket_count,
            backend = self.adapter.backend_name(),
            "Session started"
        );

        (id, handle)
    }

    /// Look up a live session and mark it as accessed.
    ///
    /// A session past its idle timeout is dropped here rather than returned.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        if entry.is_idle(now, self.idle_timeout) {
            sessions.remove(id);
            info!(session = %id, "Session expired");
            return None;
        }
        entry.last_access = now;
        Some(Arc::clone(&entry.handle))
    }

    /// End a session. Returns false if it did not exist.
    pub async fn end(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(session = %id, "Session ended");
        }
        removed
    }

    /// Drop every session idle for at least the idle timeout.
    /// Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let timeout = self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = !entry.is_idle(now, timeout);
            if !keep {
                debug!(session = %id, "Session expired");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle sessions dropped");
        }
        evicted
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
