//! Error types for rollout operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use thiserror::Error;

use crate::state::StageStatus;

/// Result type alias for rollout operations
pub type Result<T> = std::result::Result<T, RolloutError>;

/// Main error type for all rollout operations
#[derive(Error, Debug)]
pub enum RolloutError {
    /// Configuration and input errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scheduling errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// GitHub API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Release annotation errors
    #[error("Release annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Plan state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration and operator input errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Duration string could not be parsed
    #[error("Invalid {field} duration '{value}': {reason}")]
    InvalidDuration {
        /// Which setting carried the value
        field: String,
        /// Raw value
        value: String,
        /// Reason for the error
        reason: String,
    },

    /// No target branches were given
    #[error("No target branches configured. Use --branches or [generic] release-branches.")]
    NoTargetBranches,

    /// Release integration requested without a token
    #[error("GitHub access token not provided. Set GITHUB_TOKEN or GH_TOKEN, use --github-token, or [github] access-token")]
    MissingCredential,

    /// Release integration requested without an organization
    #[error("GitHub organization not provided for release repository '{repo}'")]
    MissingOrganization {
        /// Release repository name
        repo: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidConfigFile {
        /// Path of the file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Scheduling errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The first stage should already have started
    #[error(
        "Deployment stopped since first release time {} has passed (now {}). Please run again.",
        scheduled_at.format("%H:%M:%S"),
        now.format("%H:%M:%S")
    )]
    FirstStageExpired {
        /// Scheduled start of the first stage
        scheduled_at: DateTime<Local>,
        /// Time the check was made
        now: DateTime<Local>,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// git executable not available
    #[error("git executable not found on PATH: {reason}")]
    GitNotFound {
        /// Reason for the error
        reason: String,
    },

    /// Command could not be started
    #[error("Failed to run '{command}': {reason}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Push failed
    #[error("Git push to '{branch}' failed ({command}): {reason}")]
    PushFailed {
        /// Destination branch
        branch: String,
        /// Command line
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// GitHub API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Request could not be sent or response could not be read
    #[error("Request to {url} failed: {source}")]
    Transport {
        /// Request URL
        url: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },

    /// API answered with a non-success status
    #[error("GitHub API returned {status} for {url}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
        /// Message from the response body
        message: String,
    },

    /// Client could not be constructed
    #[error("Failed to initialize GitHub client: {reason}")]
    ClientInit {
        /// Reason for the error
        reason: String,
    },
}

/// Release annotation errors, raised after the stage push already succeeded
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// Re-fetching the latest release failed
    #[error("Failed to fetch latest release after deploying '{branch}': {source}")]
    FetchFailed {
        /// Branch whose badge was being updated
        branch: String,
        /// Underlying error
        #[source]
        source: GitHubError,
    },

    /// Writing the edited body back failed
    #[error("Failed to edit release {release_id} after deploying '{branch}': {source}")]
    EditFailed {
        /// Branch whose badge was being updated
        branch: String,
        /// Release being edited
        release_id: u64,
        /// Underlying error
        #[source]
        source: GitHubError,
    },
}

/// Plan state errors
#[derive(Error, Debug)]
pub enum StateError {
    /// Stage status moved backwards or skipped a step
    #[error("Invalid stage transition for '{branch}': {from} -> {to}")]
    InvalidTransition {
        /// Stage branch
        branch: String,
        /// Current status
        from: StageStatus,
        /// Requested status
        to: StageStatus,
    },
}

impl RolloutError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            RolloutError::Config(ConfigError::InvalidDuration { .. }) => vec![
                "Use compound durations such as '30s', '5m' or '1h25m'".to_string(),
            ],
            RolloutError::Config(ConfigError::MissingCredential) => vec![
                "Export a token: export GITHUB_TOKEN=<token>".to_string(),
                "Or drop --release-repo to deploy the base branch without release tracking"
                    .to_string(),
            ],
            RolloutError::Schedule(ScheduleError::FirstStageExpired { .. }) => vec![
                "Confirm the timetable before the first start time".to_string(),
                "Increase --release-offset to allow more time for confirmation".to_string(),
            ],
            RolloutError::Git(GitError::PushFailed { .. }) => vec![
                "Check the remote and branch names: git remote -v".to_string(),
                "Branches deployed before the failure were not rolled back".to_string(),
                "Re-run with only the remaining branches in --branches".to_string(),
            ],
            RolloutError::Git(GitError::GitNotFound { .. }) => {
                vec!["Install git and make sure it is on PATH".to_string()]
            }
            RolloutError::Annotation(_) => vec![
                "The branch itself was pushed; update the release badge manually".to_string(),
                "Re-run with only the remaining branches in --branches".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error leaves already-pushed branches behind
    pub fn is_partial_rollout(&self) -> bool {
        matches!(
            self,
            RolloutError::Git(GitError::PushFailed { .. }) | RolloutError::Annotation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_failure_suggests_trimming_branches() {
        let err = RolloutError::from(GitError::PushFailed {
            branch: "prod".to_string(),
            command: "git push origin v1:prod".to_string(),
            reason: "rejected".to_string(),
        });
        assert!(err.is_partial_rollout());
        assert!(
            err.recovery_suggestions()
                .iter()
                .any(|s| s.contains("remaining branches"))
        );
    }

    #[test]
    fn test_config_errors_are_not_partial() {
        let err = RolloutError::from(ConfigError::NoTargetBranches);
        assert!(!err.is_partial_rollout());
        assert!(err.to_string().contains("No target branches"));
    }
}
