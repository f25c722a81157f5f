//! Recording fakes for the rollout capabilities.

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use ergo::error::{GitError, GitHubError, Result};
use ergo::git::{PushInfo, PushRequest, Pusher};
use ergo::github::{Release, ReleaseHost};
use ergo::schedule::Clock;
use std::sync::{Arc, Mutex};

/// 2024-03-07 09:05:00 local time
pub fn start_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap()
}

/// Clock that only moves when slept on
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Local>>>,
    sleeps: Arc<Mutex<Vec<TimeDelta>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Durations passed to `sleep`, in order
    pub fn sleeps(&self) -> Vec<TimeDelta> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: TimeDelta) {
        self.sleeps.lock().unwrap().push(duration);
        if duration > TimeDelta::zero() {
            self.advance(duration);
        }
    }
}

/// Pusher that records each request with the clock time it was made
#[derive(Debug)]
pub struct RecordingPusher {
    clock: FakeClock,
    fail_on: Option<usize>,
    pushes: Mutex<Vec<(PushRequest, DateTime<Local>)>>,
}

impl RecordingPusher {
    pub fn new(clock: &FakeClock) -> Self {
        Self {
            clock: clock.clone(),
            fail_on: None,
            pushes: Mutex::new(Vec::new()),
        }
    }

    /// Fail the push with the given zero-based index
    pub fn failing_on(clock: &FakeClock, index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::new(clock)
        }
    }

    pub fn pushes(&self) -> Vec<(PushRequest, DateTime<Local>)> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.pushes()
            .iter()
            .map(|(request, _)| request.command_line())
            .collect()
    }
}

impl Pusher for RecordingPusher {
    async fn push(&self, request: &PushRequest) -> Result<PushInfo> {
        let index = {
            let mut pushes = self.pushes.lock().unwrap();
            pushes.push((request.clone(), self.clock.now()));
            pushes.len() - 1
        };

        if self.fail_on == Some(index) {
            return Err(GitError::PushFailed {
                branch: request.destination.clone(),
                command: request.command_line(),
                reason: "! [rejected] (non-fast-forward)".to_string(),
            }
            .into());
        }

        Ok(PushInfo {
            stdout: String::new(),
            stderr: format!("To {}\n   abc123..def456  {}", request.remote, request.refspec()),
        })
    }
}

/// In-memory release host
#[derive(Debug)]
pub struct FakeReleaseHost {
    release: Mutex<Release>,
    fetch_limit: Option<usize>,
    reject_edits: bool,
    fetches: Mutex<usize>,
    edits: Mutex<Vec<Release>>,
}

impl FakeReleaseHost {
    pub fn new(tag: &str, body: &str) -> Self {
        Self {
            release: Mutex::new(Release {
                id: 7,
                tag_name: tag.to_string(),
                body: Some(body.to_string()),
                html_url: format!("https://github.com/acme/web/releases/tag/{}", tag),
            }),
            fetch_limit: None,
            reject_edits: false,
            fetches: Mutex::new(0),
            edits: Mutex::new(Vec::new()),
        }
    }

    /// Host whose fetches fail once `limit` fetches have succeeded
    pub fn failing_after(tag: &str, body: &str, limit: usize) -> Self {
        Self {
            fetch_limit: Some(limit),
            ..Self::new(tag, body)
        }
    }

    /// Host that serves the release but refuses every edit
    pub fn rejecting_edits(tag: &str, body: &str) -> Self {
        Self {
            reject_edits: true,
            ..Self::new(tag, body)
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    pub fn edits(&self) -> Vec<Release> {
        self.edits.lock().unwrap().clone()
    }

    pub fn body(&self) -> String {
        self.release.lock().unwrap().body_text().to_string()
    }
}

impl ReleaseHost for FakeReleaseHost {
    async fn fetch_latest(&self) -> std::result::Result<Release, GitHubError> {
        let mut fetches = self.fetches.lock().unwrap();
        if self.fetch_limit.is_some_and(|limit| *fetches >= limit) {
            return Err(GitHubError::Api {
                status: 502,
                url: "https://api.github.com/repos/acme/web/releases/latest".to_string(),
                message: "Bad Gateway".to_string(),
            });
        }
        *fetches += 1;
        Ok(self.release.lock().unwrap().clone())
    }

    async fn edit_release(&self, release: &Release) -> std::result::Result<Release, GitHubError> {
        if self.reject_edits {
            return Err(GitHubError::Api {
                status: 422,
                url: format!("https://api.github.com/repos/acme/web/releases/{}", release.id),
                message: "Validation Failed".to_string(),
            });
        }
        self.edits.lock().unwrap().push(release.clone());
        *self.release.lock().unwrap() = release.clone();
        Ok(release.clone())
    }
}
