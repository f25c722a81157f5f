//! Scheduled rollout engine.
//!
//! A rollout resolves the reference to promote, computes a timetable, asks
//! the operator to confirm it and then pushes the reference onto each target
//! branch in turn.

mod engine;
mod executor;
mod gate;
mod resolver;

pub use engine::{RolloutEngine, RolloutOutcome, RolloutSettings, render_timetable};
pub use executor::{PromotionExecutor, RolloutReport};
pub use gate::{CONFIRMATION_PROMPT, CONFIRMATION_TOKEN, Confirmation, ConfirmationGate, read_confirmation};
pub use resolver::ReferenceResolver;
