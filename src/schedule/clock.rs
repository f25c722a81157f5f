//! Wall-clock access for scheduled waits.

use chrono::{DateTime, Local, TimeDelta};
use std::future::Future;

/// Source of the current time and of blocking waits
pub trait Clock {
    /// Current local time
    fn now(&self) -> DateTime<Local>;

    /// Suspend for `duration`; zero or negative durations return immediately
    fn sleep(&self, duration: TimeDelta) -> impl Future<Output = ()>;
}

/// Real clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: TimeDelta) {
        if let Ok(duration) = duration.to_std() {
            tokio::time::sleep(duration).await;
        }
    }
}
