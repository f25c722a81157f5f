//! Deployment timetable computation.

use super::duration::parse_duration;
use crate::error::{ConfigError, Result};
use crate::state::Stage;
use chrono::{DateTime, Local, TimeDelta};

/// Builds the per-branch start times of a rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetableBuilder {
    offset: TimeDelta,
    interval: TimeDelta,
}

impl TimetableBuilder {
    /// Parse the offset and interval duration strings.
    ///
    /// Negative values are accepted and yield start times in the past.
    pub fn new(offset: &str, interval: &str) -> Result<Self> {
        let offset = parse_field("offset", offset)?;
        let interval = parse_field("interval", interval)?;
        Ok(Self::from_deltas(offset, interval))
    }

    /// Builder from already parsed durations
    pub fn from_deltas(offset: TimeDelta, interval: TimeDelta) -> Self {
        Self { offset, interval }
    }

    /// Delay between `now` and the first stage
    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    /// Delay between consecutive stages
    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// Compute one pending stage per branch, in the given order.
    ///
    /// Duplicate branches produce duplicate stages.
    pub fn build<S: AsRef<str>>(&self, branches: &[S], now: DateTime<Local>) -> Result<Vec<Stage>> {
        if branches.is_empty() {
            return Err(ConfigError::NoTargetBranches.into());
        }

        let mut at = shift(now, self.offset)?;
        let mut stages = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            if i > 0 {
                at = shift(at, self.interval)?;
            }
            stages.push(Stage::new(branch.as_ref(), at));
        }
        Ok(stages)
    }
}

fn parse_field(field: &str, value: &str) -> Result<TimeDelta> {
    parse_duration(value).map_err(|e| {
        ConfigError::InvalidDuration {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn shift(at: DateTime<Local>, by: TimeDelta) -> Result<DateTime<Local>> {
    at.checked_add_signed(by).ok_or_else(|| {
        ConfigError::InvalidArguments {
            reason: format!("schedule time {} + {} is out of range", at, by),
        }
        .into()
    })
}
