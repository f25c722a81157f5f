//! GitHub REST client for the latest-release read/modify/write cycle.

use crate::error::{ConfigError, GitHubError, Result};
use crate::github::{Release, ReleaseHost};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// Repository owner (organization or user)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// GitHub token
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise installs
    pub api_url: String,
}

impl GitHubReleaseConfig {
    /// Configuration against the public API
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Error payload GitHub sends with non-success responses
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// GitHub release client scoped to one repository
#[derive(Debug, Clone)]
pub struct GitHubReleaseManager {
    client: reqwest::Client,
    config: GitHubReleaseConfig,
}

impl GitHubReleaseManager {
    /// Create a client; fails when no token is configured
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            GitHubError::ClientInit {
                reason: format!("token is not a valid header value: {}", e),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ergo/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GitHubError::ClientInit {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Repository owner
    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.config.repo
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: String,
    ) -> std::result::Result<Release, GitHubError> {
        let response = request.send().await.map_err(|source| GitHubError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiMessage>(&text)
                .map(|m| m.message)
                .unwrap_or(text);
            return Err(GitHubError::Api {
                status: status.as_u16(),
                url,
                message,
            });
        }

        response
            .json::<Release>()
            .await
            .map_err(|source| GitHubError::Transport { url, source })
    }
}

impl ReleaseHost for GitHubReleaseManager {
    async fn fetch_latest(&self) -> std::result::Result<Release, GitHubError> {
        let url = format!("{}/latest", self.releases_url());
        log::debug!("GET {}", url);
        self.send(self.client.get(&url), url).await
    }

    async fn edit_release(&self, release: &Release) -> std::result::Result<Release, GitHubError> {
        let url = format!("{}/{}", self.releases_url(), release.id);
        log::debug!("PATCH {}", url);
        let payload = serde_json::json!({ "body": release.body_text() });
        self.send(self.client.patch(&url).json(&payload), url).await
    }
}
