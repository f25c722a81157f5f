//! Push capability and push request shapes for rollout stages.
//!
//! This module defines the Pusher trait that specifies the single Git operation
//! a rollout needs. The production implementation lives in `system_git`, which
//! shells out to the `git` executable.

use crate::error::Result;
use crate::state::RolloutPlan;
use std::future::Future;

/// Trait for pushing a reference onto a remote branch
pub trait Pusher {
    /// Push `request.source` onto `request.destination` at `request.remote`
    fn push(&self, request: &PushRequest) -> impl Future<Output = Result<PushInfo>>;
}

/// A single `git push <remote> <source>:<destination>` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    /// Remote name
    pub remote: String,
    /// Source side of the refspec
    pub source: String,
    /// Destination branch on the remote
    pub destination: String,
}

impl PushRequest {
    /// Push the remote's copy of a branch: `<remote> <remote>/<branch>:<destination>`
    pub fn branch(remote: &str, branch: &str, destination: &str) -> Self {
        Self {
            remote: remote.to_string(),
            source: format!("{}/{}", remote, branch),
            destination: destination.to_string(),
        }
    }

    /// Push a tag: `<remote> <tag>:<destination>`
    pub fn tag(remote: &str, tag: &str, destination: &str) -> Self {
        Self {
            remote: remote.to_string(),
            source: tag.to_string(),
            destination: destination.to_string(),
        }
    }

    /// Build the request for one stage of a plan.
    ///
    /// The remote-qualified branch form is used exactly when the reference
    /// is the base branch; anything else is pushed as a tag.
    pub fn for_stage(plan: &RolloutPlan, remote: &str, destination: &str) -> Self {
        if plan.deploys_base_branch() {
            Self::branch(remote, &plan.reference.name, destination)
        } else {
            Self::tag(remote, &plan.reference.name, destination)
        }
    }

    /// `<source>:<destination>`
    pub fn refspec(&self) -> String {
        format!("{}:{}", self.source, self.destination)
    }

    /// Arguments passed to `git`
    pub fn args(&self) -> [String; 3] {
        ["push".to_string(), self.remote.clone(), self.refspec()]
    }

    /// Human-readable command line
    pub fn command_line(&self) -> String {
        format!("git push {} {}", self.remote, self.refspec())
    }
}

/// Information about a push operation
#[derive(Debug, Clone, Default)]
pub struct PushInfo {
    /// Trimmed standard output of the push
    pub stdout: String,
    /// Trimmed standard error of the push (git reports progress here)
    pub stderr: String,
}
