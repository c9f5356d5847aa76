//! Ticket collection stored as one JSON file in a remote repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{PersistenceAdapter, PersistenceError};
use crate::remote::RemoteRepository;
use crate::ticket::Ticket;

/// Adapter that keeps the collection in a version-controlled JSON file.
///
/// Saves are optimistic overwrites: the current version marker is fetched
/// and the write is made against it, or the file is created when it does
/// not exist. Two writers that both fetch before either writes race, and the
/// last one wins.
pub struct RemoteFileAdapter {
    repository: Arc<dyn RemoteRepository>,
    path: String,
    commit_message: String,
}

impl RemoteFileAdapter {
    pub fn new(
        repository: Arc<dyn RemoteRepository>,
        path: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            path: path.into(),
            commit_message: commit_message.into(),
        }
    }

    fn location(&self) -> String {
        format!("{}:{}", self.repository.describe(), self.path)
    }

    fn save_error(&self, source: crate::remote::RemoteError) -> PersistenceError {
        PersistenceError::Save {
            location: self.location(),
            source,
        }
    }
}

#[async_trait]
impl PersistenceAdapter for RemoteFileAdapter {
    async fn load(&self) -> Result<Vec<Ticket>, PersistenceError> {
        let file = self
            .repository
            .fetch(&self.path)
            .await
            .map_err(|e| PersistenceError::Load {
                location: self.location(),
                source: Box::new(e),
            })?;

        let Some(file) = file else {
            info!("No ticket file at {} yet, starting empty", self.location());
            return Ok(Vec::new());
        };

        let tickets: Vec<Ticket> =
            serde_json::from_slice(&file.content).map_err(|e| PersistenceError::Load {
                location: self.location(),
                source: Box::new(e),
            })?;

        debug!(
            "Loaded {} tickets from {} at {}",
            tickets.len(),
            self.location(),
            file.version
        );
        Ok(tickets)
    }

    async fn save(&self, tickets: &[Ticket]) -> Result<(), PersistenceError> {
        let content = serde_json::to_vec_pretty(tickets)?;

        let current = self
            .repository
            .fetch(&self.path)
            .await
            .map_err(|e| self.save_error(e))?;

        match current {
            Some(file) => {
                self.repository
                    .write_update(&self.path, &content, &file.version, &self.commit_message)
                    .await
                    .map_err(|e| self.save_error(e))?;
                debug!("Updated {} ({} tickets)", self.location(), tickets.len());
            }
            None => {
                self.repository
                    .write_create(&self.path, &content, &self.commit_message)
                    .await
                    .map_err(|e| self.save_error(e))?;
                info!("Created {} ({} tickets)", self.location(), tickets.len());
            }
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "remote_file"
    }
}
