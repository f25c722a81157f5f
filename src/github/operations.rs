//! Release host capability and the release record it exchanges.

use crate::error::GitHubError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A release as returned by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,
    /// Tag the release points at
    pub tag_name: String,
    /// Markdown body carrying the deployment badges
    #[serde(default)]
    pub body: Option<String>,
    /// Release URL
    #[serde(default)]
    pub html_url: String,
}

impl Release {
    /// Body text, empty when the release has none
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Trait for reading and rewriting the latest release of one repository
pub trait ReleaseHost {
    /// Fetch the latest published release
    fn fetch_latest(&self) -> impl Future<Output = Result<Release, GitHubError>>;

    /// Persist `release` (the whole body is written back)
    fn edit_release(&self, release: &Release) -> impl Future<Output = Result<Release, GitHubError>>;
}
