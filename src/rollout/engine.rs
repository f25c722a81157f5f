//! Resolve, schedule, confirm and execute one rollout.

use super::executor::{PromotionExecutor, RolloutReport};
use super::gate::{Confirmation, ConfirmationGate};
use super::resolver::ReferenceResolver;
use crate::cli::RuntimeConfig;
use crate::error::{ConfigError, Result};
use crate::git::Pusher;
use crate::github::{BadgeTemplate, ReleaseAnnotator, ReleaseHost};
use crate::schedule::{Clock, TimetableBuilder};
use crate::state::{RolloutPlan, StageStatus};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Scheduling inputs for one rollout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutSettings {
    /// Git remote to push to
    pub remote: String,
    /// Branch deployed when no release is resolved
    pub base_branch: String,
    /// Target branches in deployment order
    pub branches: Vec<String>,
    /// Wait before the first stage, as a duration string
    pub offset: String,
    /// Wait between stages, as a duration string
    pub interval: String,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            base_branch: "master".to_string(),
            branches: Vec::new(),
            offset: "1m".to_string(),
            interval: "25m".to_string(),
        }
    }
}

/// How a rollout ended
#[derive(Debug)]
pub enum RolloutOutcome {
    /// The operator declined the timetable; nothing was pushed
    Aborted {
        /// Plan as shown to the operator
        plan: RolloutPlan,
    },
    /// Every stage ran
    Completed {
        /// Plan with final stage statuses
        plan: RolloutPlan,
        /// Counters
        report: RolloutReport,
    },
}

impl RolloutOutcome {
    /// The plan, whatever the outcome
    pub fn plan(&self) -> &RolloutPlan {
        match self {
            RolloutOutcome::Aborted { plan } | RolloutOutcome::Completed { plan, .. } => plan,
        }
    }
}

/// Wires the resolver, timetable, gate and executor together
#[derive(Debug)]
pub struct RolloutEngine<'a, C, H> {
    settings: RolloutSettings,
    clock: &'a C,
    host: Option<&'a H>,
    badges: Option<(BadgeTemplate, BTreeMap<String, String>)>,
}

impl<'a, C: Clock, H: ReleaseHost> RolloutEngine<'a, C, H> {
    /// Engine without release tracking
    pub fn new(settings: RolloutSettings, clock: &'a C) -> Self {
        Self {
            settings,
            clock,
            host: None,
            badges: None,
        }
    }

    /// Track the latest release of `host`
    pub fn with_release_host(mut self, host: &'a H) -> Self {
        self.host = Some(host);
        self
    }

    /// Stamp deployment badges for the labelled branches
    pub fn with_badges(mut self, template: BadgeTemplate, labels: BTreeMap<String, String>) -> Self {
        self.badges = Some((template, labels));
        self
    }

    /// Scheduling inputs
    pub fn settings(&self) -> &RolloutSettings {
        &self.settings
    }

    /// Resolve the reference and compute the timetable.
    ///
    /// Durations and the branch list are validated before the release host is
    /// contacted. Stage times are relative to the clock after resolution.
    pub async fn prepare(&self, config: &RuntimeConfig) -> Result<RolloutPlan> {
        let timetable = TimetableBuilder::new(&self.settings.offset, &self.settings.interval)?;
        if self.settings.branches.is_empty() {
            return Err(ConfigError::NoTargetBranches.into());
        }

        let reference = ReferenceResolver::new(&self.settings.base_branch, self.host)
            .resolve(config)
            .await;

        let stages = timetable.build(&self.settings.branches, self.clock.now())?;
        Ok(RolloutPlan::new(
            reference,
            &self.settings.base_branch,
            timetable.interval(),
            stages,
        ))
    }

    /// Prepare, show the timetable, ask for confirmation and execute
    pub async fn run<P: Pusher, R: BufRead>(
        &self,
        pusher: &P,
        input: R,
        config: &RuntimeConfig,
    ) -> Result<RolloutOutcome> {
        let mut plan = self.prepare(config).await?;
        render_confirmation(&plan, config);

        let mut gate = ConfirmationGate::new(input);
        if gate.confirm(config)? == Confirmation::Aborted {
            config.println("No deployment");
            return Ok(RolloutOutcome::Aborted { plan });
        }

        let mut executor = PromotionExecutor::new(pusher, self.clock, &self.settings.remote);
        if let (Some(host), Some((template, labels))) = (self.host, &self.badges) {
            executor = executor.with_annotator(ReleaseAnnotator::new(
                host,
                template.clone(),
                labels.clone(),
            ));
        }

        let report = match executor.execute(&mut plan, config).await {
            Ok(report) => report,
            Err(e) => {
                report_stopped(&plan, config);
                return Err(e);
            }
        };
        log::info!("{}", plan.summary());
        Ok(RolloutOutcome::Completed { plan, report })
    }
}

/// Two-column timetable, start times as `HH:MM`
pub fn render_timetable(plan: &RolloutPlan, config: &RuntimeConfig) {
    config.table(TIMETABLE_HEADERS, &timetable_rows(plan));
}

const TIMETABLE_HEADERS: &[&str] = &["Branch", "Start Time"];

fn timetable_rows(plan: &RolloutPlan) -> Vec<Vec<String>> {
    plan.stages
        .iter()
        .map(|stage| {
            vec![
                stage.branch.clone(),
                stage.scheduled_at.format("%H:%M").to_string(),
            ]
        })
        .collect()
}

/// Reference and timetable ahead of the confirmation prompt, shown even in quiet mode
fn render_confirmation(plan: &RolloutPlan, config: &RuntimeConfig) {
    config.notice_println(&format!("Release reference: {}", plan.reference));
    config.notice_println("Deployment start times are estimates.");
    config.notice_table(TIMETABLE_HEADERS, &timetable_rows(plan));
}

/// Stage outcome after the rollout stopped early
fn report_stopped(plan: &RolloutPlan, config: &RuntimeConfig) {
    log::warn!("{}", plan.summary());
    config.error_println(&plan.summary());
    for (label, status) in [
        ("Deployed", StageStatus::Succeeded),
        ("Failed", StageStatus::Failed),
        ("Not deployed", StageStatus::Pending),
    ] {
        let branches = plan.branches_with(status);
        if !branches.is_empty() {
            config.error_println(&format!("{}: {}", label, branches.join(", ")));
        }
    }
}
