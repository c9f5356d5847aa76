//! Remote version-controlled file storage.
//!
//! The persistence layer only needs three things from a hosted repository:
//! read a file together with its version marker, create a file, and
//! overwrite a file given the marker it was read at. [`GithubRepository`]
//! provides them over the GitHub contents API.

mod github;

pub use github::{GithubConfig, GithubRepository};
pub(crate) use github::is_owner_and_name;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to a remote repository.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential rejected or lacking permission.
    #[error("Remote repository rejected the credential: {0}")]
    Unauthorized(String),

    /// The file changed (or appeared) since its version marker was read.
    #[error("Write conflict on {path}")]
    Conflict { path: String },

    /// API returned an unexpected error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing token, malformed repository, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Opaque token identifying the last-known state of a remote file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionMarker(String);

impl VersionMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub version: VersionMarker,
}

/// Narrow read/write contract of a hosted source-control service.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Fetch a file. `Ok(None)` means the file does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, RemoteError>;

    /// Create a file that does not exist yet.
    async fn write_create(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), RemoteError>;

    /// Overwrite a file that was last seen at `version`.
    async fn write_update(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionMarker,
        message: &str,
    ) -> Result<(), RemoteError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
