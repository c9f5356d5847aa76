//! GitHub repository contents API client.
//!
//! Files are read with `GET /repos/{owner}/{repo}/contents/{path}` and
//! written with `PUT` on the same URL. The blob `sha` returned by GitHub is
//! the version marker; an update must echo it back.
//!
//! For files between 1 MB and 100 MB the JSON response carries the `sha` but
//! reports `encoding: "none"` with empty content. Those bodies are fetched a
//! second time with the raw media type. Files above 100 MB are not served by
//! the contents API at all.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RemoteError, RemoteFile, RemoteRepository, VersionMarker};

/// GitHub API base URL
const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent header required by GitHub API
const USER_AGENT: &str = concat!("helpdesk/", env!("CARGO_PKG_VERSION"));

/// REST API version pinned in every request
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Media type for JSON metadata responses
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type returning the file body itself
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// GitHub-backed ticket file configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token with contents read/write permission.
    pub token: String,
    /// Target repository as `owner/name`.
    pub repository: String,
    /// File path inside the repository.
    #[serde(default = "default_path")]
    pub path: String,
    /// Branch to read and commit to (default: repository default branch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// API base URL (default: https://api.github.com).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Commit message used for every save.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("commit_message", &self.commit_message)
            .finish()
    }
}

fn default_path() -> String {
    "tickets.json".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_commit_message() -> String {
    "Update support tickets".to_string()
}

/// GitHub contents API client bound to one repository.
pub struct GithubRepository {
    client: Client,
    base_url: String,
    repository: String,
    branch: Option<String>,
    token: String,
}

impl GithubRepository {
    /// Create a new GitHub client.
    pub fn new(config: &GithubConfig) -> Result<Self, RemoteError> {
        if config.token.is_empty() {
            return Err(RemoteError::NotConfigured(
                "GitHub token is required".to_string(),
            ));
        }
        if !is_owner_and_name(&config.repository) {
            return Err(RemoteError::NotConfigured(format!(
                "repository must be 'owner/name', got '{}'",
                config.repository
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        let base_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| GITHUB_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            repository: config.repository.clone(),
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/contents/{}",
            self.base_url,
            self.repository,
            encoded.join("/")
        )
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        self.with_accept(request, JSON_MEDIA_TYPE)
    }

    fn with_accept(&self, request: RequestBuilder, accept: &str) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    fn get(&self, url: &str, accept: &str) -> RequestBuilder {
        let request = self.with_accept(self.client.get(url), accept);
        match &self.branch {
            Some(branch) => request.query(&[("ref", branch)]),
            None => request,
        }
    }

    /// Fetch the file body alone; used when the JSON response omits it.
    async fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.get(url, RAW_MEDIA_TYPE).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), RemoteError> {
        let url = self.contents_url(path);
        let body = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            sha,
            branch: self.branch.as_deref(),
        };

        debug!("GitHub put contents: repo={}, path={}, sha={:?}", self.repository, path, sha);

        let response = self
            .with_headers(self.client.put(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RemoteError::Conflict {
                path: path.to_string(),
            });
        }
        Err(error_from_response(response).await)
    }
}

#[async_trait]
impl RemoteRepository for GithubRepository {
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        let url = self.contents_url(path);

        debug!("GitHub get contents: repo={}, path={}", self.repository, path);

        let response = self.get(&url, JSON_MEDIA_TYPE).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let contents: ContentsResponse = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse contents response: {}", e))
        })?;

        let content = match contents.encoding.as_str() {
            "base64" => {
                // GitHub wraps base64 payloads at 60 columns.
                let packed: String = contents
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(packed)
                    .map_err(|e| RemoteError::Parse(format!("Invalid base64 content: {}", e)))?
            }
            "none" => {
                debug!("GitHub content too large for JSON, fetching raw: path={}", path);
                self.fetch_raw(&url).await?
            }
            other => {
                return Err(RemoteError::Parse(format!(
                    "Unsupported content encoding '{}' for {}",
                    other, path
                )));
            }
        };

        Ok(Some(RemoteFile {
            content,
            version: VersionMarker::new(contents.sha),
        }))
    }

    async fn write_create(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), RemoteError> {
        self.put(path, content, None, message).await
    }

    async fn write_update(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionMarker,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.put(path, content, Some(version.as_str()), message).await
    }

    fn describe(&self) -> String {
        match &self.branch {
            Some(branch) => format!("github:{}@{}", self.repository, branch),
            None => format!("github:{}", self.repository),
        }
    }
}

async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return RemoteError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), body));
    }
    RemoteError::Api {
        status: status.as_u16(),
        message: body,
    }
}

/// `owner/name` with both parts non-empty and no further slashes.
pub(crate) fn is_owner_and_name(repository: &str) -> bool {
    match repository.split_once('/') {
        Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}

/// Response from GitHub GET contents endpoint (only fields we care about).
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Body of GitHub PUT contents endpoint.
#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}
