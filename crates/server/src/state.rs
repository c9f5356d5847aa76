use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use helpdesk_core::{
    Authenticator, Config, PersistenceAdapter, SanitizedConfig, SessionManager,
};

use crate::metrics::ACTIVE_SESSIONS;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    sessions: SessionManager,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        persistence: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        let idle_timeout = Duration::from_secs(config.server.session_idle_secs);
        Self {
            config,
            authenticator,
            sessions: SessionManager::new(persistence).with_idle_timeout(idle_timeout),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

/// Drop idle sessions in the background, twice per idle timeout.
///
/// Sessions are also dropped lazily when a new one starts; this sweep keeps
/// memory and the active-sessions gauge down while no new visitors arrive.
pub fn spawn_idle_sweep(state: Arc<AppState>) -> JoinHandle<()> {
    let period = (state.sessions().idle_timeout() / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if state.sessions().evict_idle().await > 0 {
                ACTIVE_SESSIONS.set(state.sessions().count().await as i64);
            }
        }
    })
}
