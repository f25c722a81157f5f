//! # ergo
//!
//! Scheduled, staged promotion of a release reference across deployment
//! branches.
//!
//! A rollout pushes the base branch, or the tag of the latest GitHub release,
//! onto each target branch in turn, waiting a fixed interval between
//! branches. After every stage the deployment time can be stamped into a
//! badge in the release body.
//!
//! ## Features
//!
//! - **Timetable**: offset and interval as compound durations (`1h25m`, `30s`)
//! - **Confirmation**: nothing is pushed until the operator types `ok`
//! - **Release tracking**: deploy the latest release tag and update its badges
//! - **Layered configuration**: flags, environment, `.ergo.toml`, defaults
//!
//! ## Usage
//!
//! ```bash
//! ergo deploy --branches staging,prod                      # base branch, 1m then every 25m
//! ergo deploy --release-repo web --release-interval 1h     # latest release tag
//! ergo plan --branches staging,prod --json                 # timetable only
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod rollout;
pub mod schedule;
pub mod state;

pub use cli::Args;
pub use config::{DeploySettings, FileConfig};
pub use error::{Result, RolloutError};
pub use git::{PushRequest, Pusher, SystemGitPusher};
pub use github::{GitHubReleaseManager, Release, ReleaseAnnotator, ReleaseHost};
pub use rollout::{RolloutEngine, RolloutOutcome, RolloutSettings};
pub use schedule::{Clock, SystemClock, TimetableBuilder};
pub use state::{Reference, RolloutPlan, Stage, StageStatus};
