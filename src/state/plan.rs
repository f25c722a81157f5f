//! Rollout plan and stage lifecycle tracking.

use crate::error::{Result, StateError};
use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;

/// Kind of reference being promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    /// A branch on the remote
    Branch,
    /// A release tag
    Tag,
}

/// Promotion source, resolved once per rollout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Branch or tag name
    pub name: String,
    /// Whether `name` is a branch or a tag
    pub kind: ReferenceKind,
}

impl Reference {
    /// Reference to a branch
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ReferenceKind::Branch,
        }
    }

    /// Reference to a tag
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ReferenceKind::Tag,
        }
    }

    /// Whether this reference is a tag
    pub fn is_tag(&self) -> bool {
        self.kind == ReferenceKind::Tag
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lifecycle of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageStatus {
    /// Waiting for its turn
    Pending,
    /// Push running
    InProgress,
    /// Push (and annotation, if any) started successfully
    Succeeded,
    /// Push failed
    Failed,
}

impl StageStatus {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, StageStatus::Succeeded | StageStatus::Failed)
    }

    fn can_transition_to(self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (StageStatus::Pending, StageStatus::InProgress)
                | (StageStatus::InProgress, StageStatus::Succeeded)
                | (StageStatus::InProgress, StageStatus::Failed)
        )
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "Pending"),
            StageStatus::InProgress => write!(f, "In Progress"),
            StageStatus::Succeeded => write!(f, "Succeeded"),
            StageStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One scheduled promotion onto one target branch
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    /// Target branch
    pub branch: String,
    /// Expected start time
    pub scheduled_at: DateTime<Local>,
    /// Current lifecycle status
    status: StageStatus,
    /// When the stage moved to `InProgress`
    pub started_at: Option<DateTime<Local>>,
    /// When the stage reached a terminal status
    pub finished_at: Option<DateTime<Local>>,
}

impl Stage {
    /// Create a pending stage
    pub fn new(branch: impl Into<String>, scheduled_at: DateTime<Local>) -> Self {
        Self {
            branch: branch.into(),
            scheduled_at,
            status: StageStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Current status
    pub fn status(&self) -> StageStatus {
        self.status
    }

    /// Move the stage forward in its lifecycle.
    ///
    /// Only `Pending -> InProgress -> {Succeeded | Failed}` is accepted.
    pub fn transition(&mut self, next: StageStatus, at: DateTime<Local>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                branch: self.branch.clone(),
                from: self.status,
                to: next,
            }
            .into());
        }

        match next {
            StageStatus::InProgress => self.started_at = Some(at),
            StageStatus::Succeeded | StageStatus::Failed => self.finished_at = Some(at),
            StageStatus::Pending => {}
        }
        self.status = next;
        Ok(())
    }
}

/// Full ordered rollout for one invocation
#[derive(Debug, Clone)]
pub struct RolloutPlan {
    /// Promotion source
    pub reference: Reference,
    /// Base branch; pushing the base branch uses the remote-qualified form
    pub base_branch: String,
    /// Fixed wait between consecutive stages
    pub interval: TimeDelta,
    /// Stages in execution order
    pub stages: Vec<Stage>,
}

impl RolloutPlan {
    /// Create a plan
    pub fn new(
        reference: Reference,
        base_branch: impl Into<String>,
        interval: TimeDelta,
        stages: Vec<Stage>,
    ) -> Self {
        Self {
            reference,
            base_branch: base_branch.into(),
            interval,
            stages,
        }
    }

    /// Whether the reference is the base branch itself
    pub fn deploys_base_branch(&self) -> bool {
        self.reference.name == self.base_branch
    }

    /// Scheduled start of the first stage
    pub fn first_start(&self) -> Option<DateTime<Local>> {
        self.stages.first().map(|s| s.scheduled_at)
    }

    /// Number of stages in the given status
    pub fn count(&self, status: StageStatus) -> usize {
        self.stages.iter().filter(|s| s.status() == status).count()
    }

    /// Branches of the stages in the given status, in plan order
    pub fn branches_with(&self, status: StageStatus) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.status() == status)
            .map(|s| s.branch.as_str())
            .collect()
    }

    /// Whether every stage succeeded
    pub fn is_complete(&self) -> bool {
        self.stages
            .iter()
            .all(|s| s.status() == StageStatus::Succeeded)
    }

    /// Create a summary of the plan state
    pub fn summary(&self) -> String {
        format!(
            "Rollout of {} - {}/{} stages succeeded, {} failed, {} pending",
            self.reference,
            self.count(StageStatus::Succeeded),
            self.stages.len(),
            self.count(StageStatus::Failed),
            self.count(StageStatus::Pending),
        )
    }
}
