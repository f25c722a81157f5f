//! Command execution functions.
//!
//! Each command loads the layered configuration, wires production
//! capabilities into the rollout engine and reports errors with recovery
//! suggestions.

mod deploy;
mod plan;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{DeploySettings, FileConfig};
use crate::error::Result;
use crate::github::GitHubReleaseManager;

use deploy::execute_deploy;
use plan::execute_plan;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Deploy(_) => execute_deploy(&args, &config).await,
        Command::Plan { .. } => execute_plan(&args, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}

/// Load the configuration file and merge it with the command line
fn load_settings(args: &Args, config: &RuntimeConfig) -> Result<DeploySettings> {
    let (file, path) = FileConfig::discover(args.config.as_deref())?;
    match &path {
        Some(path) => config.verbose_println(&format!("Using configuration {}", path.display())),
        None => config.verbose_println("No configuration file found, using defaults"),
    }

    DeploySettings::resolve(args.command.deploy_args(), &file, |var| {
        std::env::var(var).ok()
    })
}

/// GitHub client for the release repository, when tracking is enabled
fn release_host(settings: &DeploySettings) -> Result<Option<GitHubReleaseManager>> {
    match &settings.release {
        Some(release) => {
            let manager = GitHubReleaseManager::new(release.github_config()?)?;
            log::debug!("tracking releases of {}/{}", manager.owner(), manager.repo());
            Ok(Some(manager))
        }
        None => Ok(None),
    }
}
