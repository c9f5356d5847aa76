use async_trait::async_trait;
use thiserror::Error;

use super::types::{Credentials, Identity};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check a login attempt and return the identity it grants
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
