//! Scheduler settings structure.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Scheduler settings from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Where the persisted state record lives.
    pub state_path: PathBuf,

    /// The profile source for a fresh run. A recovered state record's own
    /// profile reference wins on resume.
    pub profile_path: PathBuf,

    /// Repeat the cycle forever (default) or run it exactly once.
    #[serde(default = "default_run_continuously")]
    pub run_continuously: bool,

    /// Poll interval while waiting for the next transition, in
    /// milliseconds (1-5000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bounded attempt count per device command (1-10).
    #[serde(default = "default_command_retries")]
    pub command_retries: u32,

    /// Pause between device command attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_run_continuously() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_command_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    200
}

impl SchedulerSettings {
    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The retry backoff as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
