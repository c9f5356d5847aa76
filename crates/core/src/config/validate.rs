use super::{types::Config, ConfigError, PersistenceBackend};
use crate::remote::is_owner_and_name;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Session idle timeout is not 0
/// - Admin username and password are set
/// - GitHub backend has its section, an `owner/name` repository, a token and a path
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.session_idle_secs == 0 {
        return Err(ConfigError::ValidationError(
            "server.session_idle_secs cannot be 0".to_string(),
        ));
    }

    // Auth validation
    if config.auth.username.is_empty() || config.auth.password.is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.username and auth.password must both be set".to_string(),
        ));
    }

    // Persistence validation
    if config.persistence.backend == PersistenceBackend::Github {
        let github = config.persistence.github.as_ref().ok_or_else(|| {
            ConfigError::ValidationError(
                "persistence.github is required when persistence.backend = \"github\"".to_string(),
            )
        })?;

        if github.token.is_empty() {
            return Err(ConfigError::ValidationError(
                "persistence.github.token cannot be empty".to_string(),
            ));
        }

        if !is_owner_and_name(&github.repository) {
            return Err(ConfigError::ValidationError(format!(
                "persistence.github.repository must be 'owner/name', got '{}'",
                github.repository
            )));
        }

        if github.path.trim_matches('/').is_empty() {
            return Err(ConfigError::ValidationError(
                "persistence.github.path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, PersistenceConfig, ServerConfig};
    use crate::remote::GithubConfig;
    use std::net::IpAddr;

    fn base_config() -> Config {
        Config {
            auth: AuthConfig {
                username: "admin".to_string(),
                password: "secret".to_string(),
            },
            server: ServerConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }

    fn github_config(repository: &str) -> GithubConfig {
        GithubConfig {
            token: "ghp_test".to_string(),
            repository: repository.to_string(),
            path: "tickets.json".to_string(),
            branch: None,
            api_url: None,
            timeout_secs: 30,
            commit_message: "Update support tickets".to_string(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
            ..ServerConfig::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_idle_timeout_fails() {
        let mut config = base_config();
        config.server.session_idle_secs = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_empty_password_fails() {
        let mut config = base_config();
        config.auth.password.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_github_requires_section() {
        let mut config = base_config();
        config.persistence.backend = PersistenceBackend::Github;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_github_valid() {
        let mut config = base_config();
        config.persistence = PersistenceConfig {
            backend: PersistenceBackend::Github,
            github: Some(github_config("acme/support")),
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_github_bad_repository() {
        for repository in ["acme", "acme/", "/support", "a/b/c", "acme/support/"] {
            let mut config = base_config();
            config.persistence = PersistenceConfig {
                backend: PersistenceBackend::Github,
                github: Some(github_config(repository)),
            };
            assert!(
                validate_config(&config).is_err(),
                "{} should be rejected",
                repository
            );
        }
    }

    #[test]
    fn test_validate_github_section_ignored_for_ephemeral() {
        let mut config = base_config();
        let mut github = github_config("not-a-repo");
        github.token.clear();
        config.persistence.github = Some(github);
        assert!(validate_config(&config).is_ok());
    }
}
