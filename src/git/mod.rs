//! Git integration for rollout stages.
//!
//! A rollout only ever pushes; everything else about the repository is left
//! to the operator.

mod operations;
mod system_git;

pub use operations::{PushInfo, PushRequest, Pusher};
pub use system_git::SystemGitPusher;
