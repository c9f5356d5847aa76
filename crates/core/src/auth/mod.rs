mod admin;
mod traits;
mod types;

pub use admin::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    if config.username.is_empty() {
        return Err(AuthError::ConfigurationError(
            "auth.username must not be empty".to_string(),
        ));
    }
    if config.password.is_empty() {
        return Err(AuthError::ConfigurationError(
            "auth.password must not be empty".to_string(),
        ));
    }
    Ok(Box::new(AdminPasswordAuthenticator::new(
        config.username.clone(),
        config.password.clone(),
    )))
}
