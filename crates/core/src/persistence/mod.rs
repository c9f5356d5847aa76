//! Durable storage of the full ticket collection.
//!
//! Adapters always load and save the entire collection; there is no delta
//! persistence. Two backends exist: [`EphemeralAdapter`] keeps nothing and
//! [`RemoteFileAdapter`] stores a JSON document in a remote repository.

mod ephemeral;
mod remote_file;

pub use ephemeral::EphemeralAdapter;
pub use remote_file::RemoteFileAdapter;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::config::{PersistenceBackend, PersistenceConfig};
use crate::remote::{GithubRepository, RemoteError};
use crate::ticket::Ticket;

/// Errors raised by persistence adapters.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading the durable collection failed.
    #[error("Failed to load tickets from {location}: {source}")]
    Load {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Writing the durable collection failed.
    #[error("Failed to save tickets to {location}: {source}")]
    Save {
        location: String,
        #[source]
        source: RemoteError,
    },

    /// The in-memory collection could not be serialized.
    #[error("Failed to serialize tickets: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend selected but not usable with the given settings.
    #[error("Persistence configuration error: {0}")]
    Configuration(String),
}

/// Load/save capability over the whole ticket collection.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Read the stored collection. A location that holds nothing yet is an
    /// empty collection, not an error.
    async fn load(&self) -> Result<Vec<Ticket>, PersistenceError>;

    /// Replace the stored collection with `tickets`.
    async fn save(&self, tickets: &[Ticket]) -> Result<(), PersistenceError>;

    /// Name of this backend
    fn backend_name(&self) -> &'static str;
}

/// Collection obtained at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub tickets: Vec<Ticket>,
    /// Set when loading failed and the collection fell back to empty.
    pub warning: Option<String>,
}

/// Load through `adapter`, falling back to an empty collection on failure.
///
/// A failed read looks like an empty board to the user, so the failure is
/// kept as a warning that callers can display.
pub async fn load_or_empty(adapter: &dyn PersistenceAdapter) -> LoadOutcome {
    match adapter.load().await {
        Ok(tickets) => LoadOutcome {
            tickets,
            warning: None,
        },
        Err(e) => {
            warn!(backend = adapter.backend_name(), "Starting with no tickets: {}", e);
            LoadOutcome {
                tickets: Vec::new(),
                warning: Some(e.to_string()),
            }
        }
    }
}

/// Factory function to create the configured persistence adapter
pub fn create_persistence(
    config: &PersistenceConfig,
) -> Result<Arc<dyn PersistenceAdapter>, PersistenceError> {
    match config.backend {
        PersistenceBackend::Ephemeral => Ok(Arc::new(EphemeralAdapter::new())),
        PersistenceBackend::Github => {
            let github = config.github.as_ref().ok_or_else(|| {
                PersistenceError::Configuration(
                    "[persistence.github] must be set when backend = \"github\"".to_string(),
                )
            })?;
            let repository = GithubRepository::new(github)
                .map_err(|e| PersistenceError::Configuration(e.to_string()))?;
            Ok(Arc::new(RemoteFileAdapter::new(
                Arc::new(repository),
                github.path.clone(),
                github.commit_message.clone(),
            )))
        }
    }
}
