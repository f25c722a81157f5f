//! Plan command implementation.
//!
//! Shows the reference and timetable a deploy would use, without prompting
//! and without pushing.

use super::{load_settings, release_host};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{ConfigError, Result, RolloutError};
use crate::github::GitHubReleaseManager;
use crate::rollout::{RolloutEngine, render_timetable};
use crate::schedule::{SystemClock, format_duration};

/// Execute plan command
pub(super) async fn execute_plan(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Plan { resolve, json, .. } = &args.command else {
        return Err(RolloutError::Config(ConfigError::InvalidArguments {
            reason: "plan command expected".to_string(),
        }));
    };

    let settings = load_settings(args, config)?;
    let host = if *resolve { release_host(&settings)? } else { None };
    let clock = SystemClock;

    let mut engine = RolloutEngine::<SystemClock, GitHubReleaseManager>::new(
        settings.rollout.clone(),
        &clock,
    );
    if let Some(host) = &host {
        engine = engine.with_release_host(host);
    }

    // JSON goes to stdout alone
    let prepare_config = if *json { RuntimeConfig::quiet() } else { config.clone() };
    let plan = engine.prepare(&prepare_config).await?;

    if *json {
        let output = serde_json::json!({
            "reference": plan.reference,
            "base_branch": plan.base_branch,
            "interval": format_duration(plan.interval),
            "stages": plan.stages,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        config.println(&format!("Release reference: {}", plan.reference));
        render_timetable(&plan, config);
        config.verbose_println(&format!(
            "{} stage{}, {} apart",
            plan.stages.len(),
            if plan.stages.len() == 1 { "" } else { "s" },
            format_duration(plan.interval)
        ));
    }

    Ok(0)
}
