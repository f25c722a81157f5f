//! Deploy command implementation.

use super::{load_settings, release_host};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::git::SystemGitPusher;
use crate::rollout::{RolloutEngine, RolloutOutcome};
use crate::schedule::{SystemClock, TimetableBuilder};

/// Execute deploy command
pub(super) async fn execute_deploy(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let settings = load_settings(args, config)?;
    // Bad durations fail before git or GitHub are touched
    TimetableBuilder::new(&settings.rollout.offset, &settings.rollout.interval)?;

    let pusher = SystemGitPusher::new(&settings.directory)?;
    let host = release_host(&settings)?;
    let clock = SystemClock;

    config.verbose_println(&format!(
        "Pushing to '{}' from {}",
        settings.rollout.remote,
        pusher.work_dir().display()
    ));

    let mut engine = RolloutEngine::new(settings.rollout.clone(), &clock);
    if let (Some(host), Some(release)) = (&host, &settings.release) {
        engine = engine
            .with_release_host(host)
            .with_badges(release.badge.clone(), release.labels.clone());
    }

    let stdin = std::io::stdin();
    match engine.run(&pusher, stdin.lock(), config).await? {
        RolloutOutcome::Aborted { .. } => Ok(0),
        RolloutOutcome::Completed { plan, report } => {
            config.success_println(&format!(
                "Deployed {} to {} branch{}",
                plan.reference,
                report.stages_succeeded,
                if report.stages_succeeded == 1 { "" } else { "es" }
            ));
            if report.releases_updated > 0 {
                config.verbose_println(&format!(
                    "Release body updated {} time{}",
                    report.releases_updated,
                    if report.releases_updated == 1 { "" } else { "s" }
                ));
            }
            Ok(0)
        }
    }
}
