//! State tracking for rollout operations.
//!
//! A plan lives for one invocation only; nothing here is persisted.

mod plan;

pub use plan::{Reference, ReferenceKind, RolloutPlan, Stage, StageStatus};
