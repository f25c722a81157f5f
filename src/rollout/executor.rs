//! Stage-by-stage promotion of a confirmed plan.
//!
//! The executor owns the only mutations of stage status. Stages run strictly
//! in order; the first push failure or annotation failure stops the rollout
//! and leaves every later stage `Pending`.

use crate::cli::RuntimeConfig;
use crate::error::{Result, ScheduleError};
use crate::git::{PushRequest, Pusher};
use crate::github::{ReleaseAnnotator, ReleaseHost};
use crate::schedule::{Clock, format_duration};
use crate::state::{RolloutPlan, StageStatus};
use chrono::{DateTime, Local};

/// Counters for a finished rollout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutReport {
    /// Stages whose push succeeded
    pub stages_succeeded: usize,
    /// Release bodies written back after a stage
    pub releases_updated: usize,
}

/// Drives a plan through its stages using the injected capabilities
#[derive(Debug)]
pub struct PromotionExecutor<'a, P, C, H> {
    pusher: &'a P,
    clock: &'a C,
    remote: String,
    annotator: Option<ReleaseAnnotator<'a, H>>,
}

impl<'a, P, C, H> PromotionExecutor<'a, P, C, H>
where
    P: Pusher,
    C: Clock,
    H: ReleaseHost,
{
    /// Executor pushing to `remote`, without release annotation
    pub fn new(pusher: &'a P, clock: &'a C, remote: impl Into<String>) -> Self {
        Self {
            pusher,
            clock,
            remote: remote.into(),
            annotator: None,
        }
    }

    /// Annotate the latest release after each successful stage
    pub fn with_annotator(mut self, annotator: ReleaseAnnotator<'a, H>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Run every stage of `plan` in order.
    ///
    /// Fails without pushing anything when the first stage should already
    /// have started.
    pub async fn execute(
        &self,
        plan: &mut RolloutPlan,
        config: &RuntimeConfig,
    ) -> Result<RolloutReport> {
        let mut report = RolloutReport::default();
        let Some(first_start) = plan.first_start() else {
            return Ok(report);
        };

        let now = self.clock.now();
        if first_start < now {
            return Err(ScheduleError::FirstStageExpired {
                scheduled_at: first_start,
                now,
            }
            .into());
        }

        let wait = first_start - now;
        config.println(&format!("Deployment will start in {}", format_duration(wait)));
        log::info!(
            "rollout of {} to {} branches starts at {}",
            plan.reference,
            plan.stages.len(),
            first_start.format("%H:%M:%S")
        );
        self.clock.sleep(wait).await;

        for i in 0..plan.stages.len() {
            if i > 0 {
                self.clock.sleep(plan.interval).await;
            }

            let branch = plan.stages[i].branch.clone();
            let request = PushRequest::for_stage(plan, &self.remote, &branch);

            plan.stages[i].transition(StageStatus::InProgress, self.clock.now())?;
            config.println(&format!("{} Deploying {}", self.timestamp(), branch));
            config.println(&format!(
                "{} Executing {}",
                self.timestamp(),
                request.command_line()
            ));

            let info = match self.pusher.push(&request).await {
                Ok(info) => info,
                Err(e) => {
                    plan.stages[i].transition(StageStatus::Failed, self.clock.now())?;
                    log::warn!("stage {} ({}) failed: {}", i + 1, branch, e);
                    return Err(e);
                }
            };

            plan.stages[i].transition(StageStatus::Succeeded, self.clock.now())?;
            report.stages_succeeded += 1;
            config.success_println(&format!(
                "{} Triggered Successfully {}",
                self.timestamp(),
                push_output(&info.stdout, &info.stderr)
            ));

            if self.annotate(&branch, config).await? {
                report.releases_updated += 1;
            }
        }

        Ok(report)
    }

    async fn annotate(&self, branch: &str, config: &RuntimeConfig) -> Result<bool> {
        let Some(annotator) = &self.annotator else {
            return Ok(false);
        };
        if annotator.label_for(branch).is_none() {
            return Ok(false);
        }

        config.println(&format!("{} Updating release on github", self.timestamp()));
        let Some(outcome) = annotator.annotate(branch, self.clock.now()).await? else {
            return Ok(false);
        };

        if outcome.changed {
            config.success_println(&format!("{} Updated release on github", self.timestamp()));
        } else {
            config.warning_println(&format!(
                "No badge for {} found in release {}; body written back unchanged",
                branch, outcome.release.tag_name
            ));
        }
        Ok(true)
    }

    fn timestamp(&self) -> String {
        clock_time(self.clock.now())
    }
}

fn clock_time(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

fn push_output(stdout: &str, stderr: &str) -> String {
    [stdout, stderr]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_output_joins_non_empty_streams() {
        assert_eq!(push_output("", "  \n"), "");
        assert_eq!(push_output("", "To origin\n"), "To origin");
        assert_eq!(push_output("a\n", "b"), "a\nb");
    }

    #[test]
    fn test_clock_time_is_zero_padded() {
        use chrono::TimeZone;
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 3).unwrap();
        assert_eq!(clock_time(at), "09:05:03");
    }
}
