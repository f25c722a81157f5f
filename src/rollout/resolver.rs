//! Picks the reference a rollout promotes.
//!
//! With release tracking on, the tag of the latest release is deployed; when
//! the lookup fails the rollout degrades to the base branch with a warning.

use crate::cli::RuntimeConfig;
use crate::github::ReleaseHost;
use crate::state::Reference;

/// Resolves the promotion source once per rollout
#[derive(Debug)]
pub struct ReferenceResolver<'a, H> {
    base_branch: String,
    host: Option<&'a H>,
}

impl<'a, H: ReleaseHost> ReferenceResolver<'a, H> {
    /// Resolver that consults `host` when one is given
    pub fn new(base_branch: impl Into<String>, host: Option<&'a H>) -> Self {
        Self {
            base_branch: base_branch.into(),
            host,
        }
    }

    /// Return the latest release tag, or the base branch
    pub async fn resolve(&self, config: &RuntimeConfig) -> Reference {
        let fallback = Reference::branch(&self.base_branch);

        let Some(host) = self.host else {
            config.verbose_println("Release tracking disabled, deploying the base branch");
            return fallback;
        };

        match host.fetch_latest().await {
            Ok(release) => {
                config.println(&format!("Deploying {}", release.html_url));
                Reference::tag(&release.tag_name)
            }
            Err(e) => {
                log::warn!("latest release lookup failed: {}", e);
                config.warning_println(&format!(
                    "Could not fetch the latest release ({}), deploying {} instead",
                    e, self.base_branch
                ));
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitHubError;
    use crate::github::Release;
    use crate::state::ReferenceKind;

    struct StaticHost(Option<Release>);

    impl ReleaseHost for StaticHost {
        async fn fetch_latest(&self) -> Result<Release, GitHubError> {
            self.0.clone().ok_or_else(|| GitHubError::Api {
                status: 404,
                url: "https://api.github.com/repos/acme/web/releases/latest".to_string(),
                message: "Not Found".to_string(),
            })
        }

        async fn edit_release(&self, release: &Release) -> Result<Release, GitHubError> {
            Ok(release.clone())
        }
    }

    fn release() -> Release {
        Release {
            id: 42,
            tag_name: "v2.0.0".to_string(),
            body: None,
            html_url: "https://github.com/acme/web/releases/tag/v2.0.0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_latest_release_tag_is_used() {
        let host = StaticHost(Some(release()));
        let reference = ReferenceResolver::new("master", Some(&host))
            .resolve(&RuntimeConfig::quiet())
            .await;
        assert_eq!(reference, Reference::tag("v2.0.0"));
    }

    #[tokio::test]
    async fn test_lookup_failure_falls_back_to_base_branch() {
        let host = StaticHost(None);
        let reference = ReferenceResolver::new("main", Some(&host))
            .resolve(&RuntimeConfig::quiet())
            .await;
        assert_eq!(reference.name, "main");
        assert_eq!(reference.kind, ReferenceKind::Branch);
    }

    #[tokio::test]
    async fn test_disabled_tracking_uses_base_branch() {
        let reference = ReferenceResolver::<StaticHost>::new("master", None)
            .resolve(&RuntimeConfig::quiet())
            .await;
        assert_eq!(reference, Reference::branch("master"));
    }
}
