//! Command line argument parsing and validation.
//!
//! Every deploy flag is optional on the command line; unset flags fall back to
//! the configuration file and then to built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Staged rollout of a release reference across deployment branches
#[derive(Parser, Debug)]
#[command(
    name = "ergo",
    version,
    about = "Staged rollout of a release reference across deployment branches",
    long_about = "Push the base branch, or the tag of the latest GitHub release, onto each
target branch in turn, waiting a fixed interval between branches, and stamp
the deployment time into the release body.

Usage:
  ergo deploy --branches staging,prod
  ergo deploy --release-repo web --release-offset 5m --release-interval 1h
  ergo plan --branches staging,prod"
)]
pub struct Args {
    /// Configuration file (defaults to ./.ergo.toml, then ~/.ergo.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show extra progress output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show prompts and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy the reference to the target branches, one stage at a time
    Deploy(DeployArgs),

    /// Show the deployment timetable without deploying anything
    Plan {
        /// Deployment settings
        #[command(flatten)]
        deploy: DeployArgs,

        /// Query the latest release to show the real reference
        #[arg(long)]
        resolve: bool,

        /// Print the timetable as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Deploy(_) => "deploy",
            Command::Plan { .. } => "plan",
        }
    }

    /// Deployment settings shared by all commands
    pub fn deploy_args(&self) -> &DeployArgs {
        match self {
            Command::Deploy(deploy) | Command::Plan { deploy, .. } => deploy,
        }
    }
}

/// Settings for one rollout
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Git remote to push to [default: origin]
    #[arg(long)]
    pub remote: Option<String>,

    /// Branch deployed when release tracking is off [default: master]
    #[arg(long)]
    pub base_branch: Option<String>,

    /// Target branches in deployment order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub branches: Vec<String>,

    /// Repository directory the push runs in [default: .]
    #[arg(long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Duration to wait before the first release ('5m', '1h25m', '30s') [default: 1m]
    #[arg(long, allow_hyphen_values = true)]
    pub release_offset: Option<String>,

    /// Duration to wait between releases ('5m', '1h25m', '30s') [default: 25m]
    #[arg(long, allow_hyphen_values = true)]
    pub release_interval: Option<String>,

    /// GitHub organization owning the release repository
    #[arg(long)]
    pub organization: Option<String>,

    /// Repository whose latest release is deployed; enables release tracking
    #[arg(long)]
    pub release_repo: Option<String>,

    /// Badge suffix to look for in the release body
    #[arg(long, allow_hyphen_values = true)]
    pub suffix_find: Option<String>,

    /// Badge suffix written after the deployment time
    #[arg(long, allow_hyphen_values = true)]
    pub suffix_replace: Option<String>,

    /// Badge image URL prefix
    #[arg(long)]
    pub badge_base: Option<String>,

    /// GitHub access token (falls back to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long)]
    pub github_token: Option<String>,

    /// GitHub API URL, for GitHub Enterprise
    #[arg(long)]
    pub api_url: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let deploy = self.command.deploy_args();
        if deploy.branches.iter().any(|b| b.trim().is_empty()) {
            return Err("--branches must not contain empty branch names".to_string());
        }
        if deploy.release_repo.as_deref() == Some("") {
            return Err("--release-repo must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Runtime configuration that only shows prompts and errors
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Print a prompt (always shown)
    pub fn prompt(&self, message: &str) {
        let _ = self.output.prompt(message);
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let _ = self.output.table(headers, rows);
    }

    /// Print context for a prompt (always shown)
    pub fn notice_println(&self, message: &str) {
        let _ = self.output.notice(message);
    }

    /// Print a table for a prompt (always shown)
    pub fn notice_table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let _ = self.output.notice_table(headers, rows);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branches_are_comma_separated_in_order() {
        let args = Args::try_parse_from([
            "ergo",
            "deploy",
            "--branches",
            "staging,prod,staging",
            "--release-offset",
            "0s",
        ])
        .unwrap();
        let deploy = args.command.deploy_args();
        assert_eq!(deploy.branches, ["staging", "prod", "staging"]);
        assert_eq!(deploy.release_offset.as_deref(), Some("0s"));
        assert!(deploy.release_interval.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_negative_durations_are_accepted_as_values() {
        let args = Args::try_parse_from(["ergo", "plan", "--release-offset", "-5m", "--json"]).unwrap();
        assert_eq!(args.command.name(), "plan");
        assert_eq!(args.command.deploy_args().release_offset.as_deref(), Some("-5m"));
    }

    #[test]
    fn test_empty_branch_name_fails_validation() {
        let args = Args::try_parse_from(["ergo", "deploy", "--branches", "staging,,prod"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["ergo", "-v", "-q", "deploy"]).is_err());
    }
}
