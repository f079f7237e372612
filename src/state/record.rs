//! The crash-recoverable schedule state record.

use std::path::PathBuf;

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::profile::Intensity;

/// Truncate an instant to whole seconds for persistence.
pub(crate) fn trunc_secs(instant: DateTime<Local>) -> DateTime<Local> {
    instant.with_nanosecond(0).unwrap_or(instant)
}

/// Persisted record of a running schedule.
///
/// Serialized as JSON with instants as ISO-8601 text so the visualization
/// process can read it without sharing this crate's types. Field order in
/// the struct is the stable key order on disk.
///
/// Invariants:
/// - `started` is set exactly once per logical run;
/// - `last_updated` never decreases across saves;
/// - `last_intensity` reflects only commands actually accepted by the
///   device, never a merely computed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Instant the schedule was first activated.
    pub started: DateTime<Local>,

    /// Instant of the most recent persisted change.
    pub last_updated: DateTime<Local>,

    /// Repeat the cycle forever, or run it exactly once.
    pub run_continuously: bool,

    /// Instant a single-cycle run completed, clamped to the cycle end.
    #[serde(default)]
    pub finished_at: Option<DateTime<Local>>,

    /// Path of the profile source driving this schedule.
    pub profile_path: PathBuf,

    /// Last intensity actually issued to the device.
    pub last_intensity: Intensity,

    /// Process id of the owning driver, if one is running.
    #[serde(default)]
    pub pid: Option<u32>,
}

impl ScheduleState {
    /// Create a fresh record for a schedule activated at `now`.
    pub fn new(profile_path: PathBuf, run_continuously: bool, now: DateTime<Local>) -> Self {
        let now = trunc_secs(now);
        Self {
            started: now,
            last_updated: now,
            run_continuously,
            finished_at: None,
            profile_path,
            last_intensity: Intensity::OFF,
            pid: Some(std::process::id()),
        }
    }

    /// Record an intensity command the device accepted.
    pub fn record_intensity(&mut self, intensity: Intensity, now: DateTime<Local>) {
        self.last_intensity = intensity;
        self.touch(now);
    }

    /// Advance `last_updated`, never backwards.
    pub fn touch(&mut self, now: DateTime<Local>) {
        self.last_updated = self.last_updated.max(trunc_secs(now));
    }

    /// Mark a single-cycle run finished at the given (already clamped)
    /// instant.
    pub fn mark_finished(&mut self, at: DateTime<Local>) {
        self.finished_at = Some(trunc_secs(at));
        self.touch(at);
    }
}
