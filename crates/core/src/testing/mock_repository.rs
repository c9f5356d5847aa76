//! In-memory remote repository for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::remote::{RemoteError, RemoteFile, RemoteRepository, VersionMarker};

/// A successful write, recorded for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    Create {
        path: String,
        content: Vec<u8>,
        message: String,
    },
    Update {
        path: String,
        content: Vec<u8>,
        version: VersionMarker,
        message: String,
    },
}

/// Mock implementation of the RemoteRepository trait.
///
/// Behaves like a version-controlled store: every write gets a fresh
/// version marker, creating an existing file or updating with a stale
/// marker is a [`RemoteError::Conflict`]. Failures can be injected for the
/// next fetch or the next write.
#[derive(Debug, Default)]
pub struct MockRepository {
    files: Arc<RwLock<HashMap<String, RemoteFile>>>,
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    fetch_count: AtomicU64,
    next_version: AtomicU64,
    next_fetch_error: Arc<RwLock<Option<RemoteError>>>,
    next_write_error: Arc<RwLock<Option<RemoteError>>>,
}

impl MockRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file directly (not recorded as a write). Returns its marker.
    pub async fn put_file(&self, path: &str, content: &[u8]) -> VersionMarker {
        let version = self.bump_version();
        self.files.write().await.insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                version: version.clone(),
            },
        );
        version
    }

    /// Current content of a file, if it exists.
    pub async fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(path).map(|f| f.content.clone())
    }

    /// Current version marker of a file, if it exists.
    pub async fn current_version(&self, path: &str) -> Option<VersionMarker> {
        self.files.read().await.get(path).map(|f| f.version.clone())
    }

    /// Get all successful writes.
    pub async fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    /// Number of fetch calls, failed ones included.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn fail_next_fetch(&self, error: RemoteError) {
        *self.next_fetch_error.write().await = Some(error);
    }

    /// Configure the next create/update to fail with the given error.
    pub async fn fail_next_write(&self, error: RemoteError) {
        *self.next_write_error.write().await = Some(error);
    }

    fn bump_version(&self) -> VersionMarker {
        let n = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        VersionMarker::new(format!("v{}", n))
    }

    async fn take_write_error(&self) -> Result<(), RemoteError> {
        match self.next_write_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteRepository for MockRepository {
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_fetch_error.write().await.take() {
            return Err(error);
        }
        Ok(self.files.read().await.get(path).cloned())
    }

    async fn write_create(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), RemoteError> {
        self.take_write_error().await?;

        let mut files = self.files.write().await;
        if files.contains_key(path) {
            return Err(RemoteError::Conflict {
                path: path.to_string(),
            });
        }
        files.insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                version: self.bump_version(),
            },
        );

        self.writes.write().await.push(RecordedWrite::Create {
            path: path.to_string(),
            content: content.to_vec(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn write_update(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionMarker,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.take_write_error().await?;

        let mut files = self.files.write().await;
        match files.get(path) {
            Some(current) if &current.version == version => {}
            _ => {
                return Err(RemoteError::Conflict {
                    path: path.to_string(),
                })
            }
        }
        files.insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                version: self.bump_version(),
            },
        );

        self.writes.write().await.push(RecordedWrite::Update {
            path: path.to_string(),
            content: content.to_vec(),
            version: version.clone(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
