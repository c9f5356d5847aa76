use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::remote::GithubConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds a session may sit unused before it is dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_session_idle_secs() -> u64 {
    1800
}

/// Admin credential. There is exactly one admin account.
#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where tickets are kept between sessions
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: PersistenceBackend,
    /// GitHub-specific configuration (required when backend = "github")
    #[serde(default)]
    pub github: Option<GithubConfig>,
}

/// Available persistence backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    /// Tickets live only for the session
    #[default]
    Ephemeral,
    /// Tickets are a JSON file in a GitHub repository
    Github,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub persistence: SanitizedPersistenceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub username: String,
    pub password_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPersistenceConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<SanitizedGithubConfig>,
}

/// Sanitized GitHub config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGithubConfig {
    pub repository: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                username: config.auth.username.clone(),
                password_configured: !config.auth.password.is_empty(),
            },
            server: config.server.clone(),
            persistence: SanitizedPersistenceConfig {
                backend: match config.persistence.backend {
                    PersistenceBackend::Ephemeral => "ephemeral".to_string(),
                    PersistenceBackend::Github => "github".to_string(),
                },
                github: config
                    .persistence
                    .github
                    .as_ref()
                    .map(|g| SanitizedGithubConfig {
                        repository: g.repository.clone(),
                        path: g.path.clone(),
                        branch: g.branch.clone(),
                        token_configured: !g.token.is_empty(),
                        timeout_secs: g.timeout_secs,
                    }),
            },
        }
    }
}
