//! Pusher backed by the system `git` executable.

use crate::error::{GitError, Result};
use crate::git::{PushInfo, PushRequest, Pusher};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs `git push` inside a working directory
#[derive(Debug, Clone)]
pub struct SystemGitPusher {
    git: PathBuf,
    work_dir: PathBuf,
}

impl SystemGitPusher {
    /// Locate `git` on PATH and bind it to `work_dir`
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let git = which::which("git").map_err(|e| GitError::GitNotFound {
            reason: e.to_string(),
        })?;

        Ok(Self {
            git,
            work_dir: work_dir.as_ref().to_path_buf(),
        })
    }

    /// Directory the push runs in
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Pusher for SystemGitPusher {
    async fn push(&self, request: &PushRequest) -> Result<PushInfo> {
        let command = request.command_line();
        log::debug!("running {} in {}", command, self.work_dir.display());

        let output = Command::new(&self.git)
            .args(request.args())
            .current_dir(&self.work_dir)
            // Never block the rollout on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| GitError::CommandFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let reason = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(GitError::PushFailed {
                branch: request.destination.clone(),
                command,
                reason,
            }
            .into());
        }

        Ok(PushInfo { stdout, stderr })
    }
}
