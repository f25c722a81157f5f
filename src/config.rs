//! Layered configuration: command line, environment, `.ergo.toml`, defaults.
//!
//! ```toml
//! [generic]
//! remote = "origin"
//! base-branch = "master"
//! release-branches = ["staging", "prod"]
//!
//! [github]
//! organization = "acme"
//!
//! [release]
//! repo = "web"
//!
//! [release.branch-map]
//! staging = "Staging"
//!
//! [release.on-deploy]
//! body-branch-suffix-find = "-No-red.svg"
//! body-branch-suffix-replace = "-green.svg"
//! ```

use crate::cli::DeployArgs;
use crate::error::{ConfigError, Result};
use crate::github::{BadgeTemplate, DEFAULT_API_URL, DEFAULT_BADGE_BASE, GitHubReleaseConfig};
use crate::rollout::RolloutSettings;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working and home directories
pub const CONFIG_FILE_NAME: &str = ".ergo.toml";

/// Environment variables consulted for the GitHub token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Contents of `.ergo.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    /// `[generic]`
    pub generic: GenericSection,
    /// `[github]`
    pub github: GitHubSection,
    /// `[release]`
    pub release: ReleaseSection,
}

/// `[generic]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenericSection {
    /// Git remote to push to
    pub remote: Option<String>,
    /// Branch deployed without release tracking
    pub base_branch: Option<String>,
    /// Target branches in deployment order
    pub release_branches: Vec<String>,
    /// Repository directory
    pub directory: Option<PathBuf>,
}

/// `[github]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitHubSection {
    /// Owner of the release repository
    pub organization: Option<String>,
    /// API token
    pub access_token: Option<String>,
    /// API base URL
    pub api_url: Option<String>,
}

/// `[release]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReleaseSection {
    /// Repository whose latest release is deployed
    pub repo: Option<String>,
    /// Badge image URL prefix
    pub badge_base: Option<String>,
    /// Deployment branch to release-body label
    pub branch_map: BTreeMap<String, String>,
    /// `[release.on-deploy]`
    pub on_deploy: OnDeploySection,
}

/// `[release.on-deploy]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OnDeploySection {
    /// Badge suffix to replace
    pub body_branch_suffix_find: Option<String>,
    /// Badge suffix written after the deployment time
    pub body_branch_suffix_replace: Option<String>,
}

impl FileConfig {
    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        Self::read(path).map_err(|e| {
            ConfigError::InvalidConfigFile {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            }
            .into()
        })
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&text).context("failed to parse TOML")?;
        Ok(config)
    }

    /// Find and load the configuration.
    ///
    /// An explicit path must exist. Otherwise `./.ergo.toml` and then
    /// `~/.ergo.toml` are tried, and defaults are used when neither exists.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let cwd = std::env::current_dir()?;
        Self::discover_in(explicit, &cwd, dirs::home_dir().as_deref())
    }

    /// [`FileConfig::discover`] with explicit search directories
    pub fn discover_in(
        explicit: Option<&Path>,
        cwd: &Path,
        home: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates = std::iter::once(cwd.join(CONFIG_FILE_NAME))
            .chain(home.map(|h| h.join(CONFIG_FILE_NAME)));
        for candidate in candidates {
            if candidate.is_file() {
                log::debug!("using configuration file {}", candidate.display());
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }
}

/// Release tracking settings, present when a release repository is configured
#[derive(Debug, Clone)]
pub struct ReleaseTracking {
    /// Repository owner
    pub organization: Option<String>,
    /// Repository name
    pub repo: String,
    /// API token
    pub token: Option<String>,
    /// API base URL
    pub api_url: String,
    /// Badge find/replace texts
    pub badge: BadgeTemplate,
    /// Deployment branch to release-body label
    pub labels: BTreeMap<String, String>,
}

impl ReleaseTracking {
    /// Client configuration; organization and token are required here
    pub fn github_config(&self) -> Result<GitHubReleaseConfig> {
        let organization = self
            .organization
            .clone()
            .ok_or_else(|| ConfigError::MissingOrganization {
                repo: self.repo.clone(),
            })?;
        let token = self.token.clone().ok_or(ConfigError::MissingCredential)?;

        let mut config = GitHubReleaseConfig::new(organization, &self.repo, Some(token));
        config.api_url = self.api_url.clone();
        Ok(config)
    }
}

/// Fully resolved deploy settings
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Scheduling inputs
    pub rollout: RolloutSettings,
    /// Repository directory the push runs in
    pub directory: PathBuf,
    /// Release tracking, when enabled
    pub release: Option<ReleaseTracking>,
}

impl DeploySettings {
    /// Merge flags, environment and file; flags win, then environment, then file
    pub fn resolve<F>(args: &DeployArgs, file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RolloutSettings::default();

        let branches = if args.branches.is_empty() {
            file.generic.release_branches.clone()
        } else {
            args.branches.clone()
        };
        if branches.is_empty() {
            return Err(ConfigError::NoTargetBranches.into());
        }

        let rollout = RolloutSettings {
            remote: pick(&args.remote, &file.generic.remote).unwrap_or(defaults.remote),
            base_branch: pick(&args.base_branch, &file.generic.base_branch)
                .unwrap_or(defaults.base_branch),
            branches,
            offset: args.release_offset.clone().unwrap_or(defaults.offset),
            interval: args.release_interval.clone().unwrap_or(defaults.interval),
        };

        let directory = args
            .directory
            .clone()
            .or_else(|| file.generic.directory.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let release = pick(&args.release_repo, &file.release.repo).map(|repo| {
            let token = non_empty(args.github_token.clone())
                .or_else(|| TOKEN_ENV_VARS.iter().find_map(|var| non_empty(env(var))))
                .or_else(|| non_empty(file.github.access_token.clone()));

            let badge = BadgeTemplate {
                base: pick(&args.badge_base, &file.release.badge_base)
                    .unwrap_or_else(|| DEFAULT_BADGE_BASE.to_string()),
                find_suffix: args
                    .suffix_find
                    .clone()
                    .or_else(|| file.release.on_deploy.body_branch_suffix_find.clone())
                    .unwrap_or_default(),
                replace_suffix: args
                    .suffix_replace
                    .clone()
                    .or_else(|| file.release.on_deploy.body_branch_suffix_replace.clone())
                    .unwrap_or_default(),
            };

            ReleaseTracking {
                organization: pick(&args.organization, &file.github.organization),
                repo,
                token,
                api_url: pick(&args.api_url, &file.github.api_url)
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                badge,
                labels: file.release.branch_map.clone(),
            }
        });

        Ok(Self {
            rollout,
            directory,
            release,
        })
    }
}

/// First non-empty value of flag then file
fn pick(flag: &Option<String>, file: &Option<String>) -> Option<String> {
    non_empty(flag.clone()).or_else(|| non_empty(file.clone()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RolloutError;
    use std::fs;
    use tempfile::TempDir;

    const FULL: &str = r#"
[generic]
remote = "upstream"
base-branch = "main"
release-branches = ["staging", "prod"]
directory = "/srv/web"

[github]
organization = "acme"
access-token = "file-token"

[release]
repo = "web"

[release.branch-map]
staging = "Staging"
prod = "Production"

[release.on-deploy]
body-branch-suffix-find = "-No-red.svg"
body-branch-suffix-replace = "-green.svg"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse(text: &str) -> FileConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_file_values_apply_when_flags_are_absent() {
        let settings = DeploySettings::resolve(&DeployArgs::default(), &parse(FULL), no_env).unwrap();
        assert_eq!(settings.rollout.remote, "upstream");
        assert_eq!(settings.rollout.base_branch, "main");
        assert_eq!(settings.rollout.branches, ["staging", "prod"]);
        assert_eq!(settings.rollout.offset, "1m");
        assert_eq!(settings.rollout.interval, "25m");
        assert_eq!(settings.directory, PathBuf::from("/srv/web"));

        let release = settings.release.unwrap();
        assert_eq!(release.repo, "web");
        assert_eq!(release.token.as_deref(), Some("file-token"));
        assert_eq!(release.labels.get("prod").map(String::as_str), Some("Production"));
        assert_eq!(release.badge.find_suffix, "-No-red.svg");
        assert_eq!(release.badge.base, DEFAULT_BADGE_BASE);
        assert_eq!(release.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_flags_override_environment_override_file() {
        let file = parse(FULL);
        let env = |var: &str| (var == "GH_TOKEN").then(|| "env-token".to_string());

        let settings = DeploySettings::resolve(&DeployArgs::default(), &file, env).unwrap();
        assert_eq!(settings.release.unwrap().token.as_deref(), Some("env-token"));

        let args = DeployArgs {
            remote: Some("origin".to_string()),
            branches: vec!["qa".to_string()],
            github_token: Some("flag-token".to_string()),
            release_interval: Some("5m".to_string()),
            ..DeployArgs::default()
        };
        let settings = DeploySettings::resolve(&args, &file, env).unwrap();
        assert_eq!(settings.rollout.remote, "origin");
        assert_eq!(settings.rollout.branches, ["qa"]);
        assert_eq!(settings.rollout.interval, "5m");
        assert_eq!(settings.release.unwrap().token.as_deref(), Some("flag-token"));
    }

    #[test]
    fn test_github_token_is_preferred_over_gh_token() {
        let env = |var: &str| Some(format!("{}-value", var));
        let args = DeployArgs {
            branches: vec!["qa".to_string()],
            release_repo: Some("web".to_string()),
            ..DeployArgs::default()
        };
        let settings = DeploySettings::resolve(&args, &FileConfig::default(), env).unwrap();
        assert_eq!(settings.release.unwrap().token.as_deref(), Some("GITHUB_TOKEN-value"));
    }

    #[test]
    fn test_defaults_without_release_repo() {
        let args = DeployArgs {
            branches: vec!["staging".to_string()],
            ..DeployArgs::default()
        };
        let settings = DeploySettings::resolve(&args, &FileConfig::default(), no_env).unwrap();
        assert_eq!(settings.rollout.remote, "origin");
        assert_eq!(settings.rollout.base_branch, "master");
        assert_eq!(settings.directory, PathBuf::from("."));
        assert!(settings.release.is_none());
    }

    #[test]
    fn test_no_branches_anywhere_is_an_error() {
        let result = DeploySettings::resolve(&DeployArgs::default(), &FileConfig::default(), no_env);
        assert!(matches!(
            result,
            Err(RolloutError::Config(ConfigError::NoTargetBranches))
        ));
    }

    #[test]
    fn test_github_config_requires_token_and_organization() {
        let args = DeployArgs {
            branches: vec!["qa".to_string()],
            release_repo: Some("web".to_string()),
            ..DeployArgs::default()
        };
        let release = DeploySettings::resolve(&args, &FileConfig::default(), no_env)
            .unwrap()
            .release
            .unwrap();
        assert!(matches!(
            release.github_config(),
            Err(RolloutError::Config(ConfigError::MissingOrganization { .. }))
        ));

        let release = ReleaseTracking {
            organization: Some("acme".to_string()),
            ..release
        };
        assert!(matches!(
            release.github_config(),
            Err(RolloutError::Config(ConfigError::MissingCredential))
        ));

        let release = ReleaseTracking {
            token: Some("t".to_string()),
            ..release
        };
        let config = release.github_config().unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "web");
    }

    #[test]
    fn test_discover_prefers_working_directory() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(CONFIG_FILE_NAME), "[generic]\nremote = \"home\"\n").unwrap();

        let (config, path) = FileConfig::discover_in(None, cwd.path(), Some(home.path())).unwrap();
        assert_eq!(config.generic.remote.as_deref(), Some("home"));
        assert_eq!(path, Some(home.path().join(CONFIG_FILE_NAME)));

        fs::write(cwd.path().join(CONFIG_FILE_NAME), "[generic]\nremote = \"local\"\n").unwrap();
        let (config, _) = FileConfig::discover_in(None, cwd.path(), Some(home.path())).unwrap();
        assert_eq!(config.generic.remote.as_deref(), Some("local"));
    }

    #[test]
    fn test_discover_without_files_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, path) = FileConfig::discover_in(None, dir.path(), None).unwrap();
        assert!(path.is_none());
        assert!(config.generic.release_branches.is_empty());
    }

    #[test]
    fn test_invalid_file_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[generic\nremote = ").unwrap();

        let err = FileConfig::discover_in(Some(&path), dir.path(), None).unwrap_err();
        assert!(matches!(
            err,
            RolloutError::Config(ConfigError::InvalidConfigFile { .. })
        ));
        assert!(err.to_string().contains("broken.toml"));

        let missing = dir.path().join("missing.toml");
        assert!(FileConfig::load(&missing).is_err());
    }
}
