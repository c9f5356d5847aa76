//! Shared admin credential authentication.

use async_trait::async_trait;

use super::{AuthError, Authenticator, Credentials, Identity};

/// Authenticator that compares a login attempt against the single configured
/// admin username and password.
///
/// Both values are compared verbatim (no trimming, no case folding, no
/// hashing).
pub struct AdminPasswordAuthenticator {
    username: String,
    password: String,
}

impl AdminPasswordAuthenticator {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

#[async_trait]
impl Authenticator for AdminPasswordAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        // Evaluate both so a wrong username costs the same as a wrong password
        let username_ok =
            constant_time_eq(credentials.username.as_bytes(), self.username.as_bytes());
        let password_ok =
            constant_time_eq(credentials.password.as_bytes(), self.password.as_bytes());

        if username_ok && password_ok {
            Ok(Identity {
                username: self.username.clone(),
                method: self.method_name().to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn method_name(&self) -> &'static str {
        "admin_password"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
