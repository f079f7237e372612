//! State record persistence.
//!
//! The writer performs atomic replace-on-save (write a temporary file, then
//! rename into place) so a concurrent reader process never observes a torn
//! record. There is no cross-process lock; reader staleness is bounded by
//! the driver's polling interval.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StateError};
use crate::profile::Intensity;

use super::record::{trunc_secs, ScheduleState};

/// Loosely-typed mirror of [`ScheduleState`] used during recovery.
///
/// Every field is optional; missing or null fields fall back to safe
/// defaults with a logged warning instead of failing the resume.
#[derive(Debug, Deserialize)]
struct RawState {
    #[serde(default)]
    started: Option<DateTime<Local>>,
    #[serde(default)]
    last_updated: Option<DateTime<Local>>,
    #[serde(default)]
    run_continuously: Option<bool>,
    #[serde(default)]
    finished_at: Option<DateTime<Local>>,
    #[serde(default)]
    profile_path: Option<PathBuf>,
    #[serde(default)]
    last_intensity: Option<Intensity>,
    #[serde(default)]
    pid: Option<u32>,
}

/// Reads, writes, and tears down the persisted state record.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl StateStore {
    /// Create a store backed by the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            artifacts: Vec::new(),
        }
    }

    /// The backing file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register an extra file to be removed on teardown (plot images and
    /// the like).
    pub fn register_artifact<P: Into<PathBuf>>(&mut self, path: P) {
        self.artifacts.push(path.into());
    }

    /// Atomically persist the record, retrying once on failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if both attempts fail. Callers may keep
    /// running from memory, at the cost of resume accuracy after a crash.
    pub fn save(&self, state: &ScheduleState) -> Result<()> {
        match self.try_save(state) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(error = %first, "state save failed, retrying once");
                self.try_save(state)
            }
        }
    }

    fn try_save(&self, state: &ScheduleState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StateError::Serialize(e.to_string()))?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| StateError::Write(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StateError::Write(e.to_string()))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Load the persisted record, if one exists.
    ///
    /// Missing fields are recovered with safe defaults relative to `now`
    /// and logged; an unreadable or non-JSON file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self, now: DateTime<Local>) -> Result<Option<ScheduleState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text =
            fs::read_to_string(&self.path).map_err(|e| StateError::Read(e.to_string()))?;
        let raw: RawState =
            serde_json::from_str(&text).map_err(|e| StateError::Parse(e.to_string()))?;
        Ok(Some(self.recover(raw, now)))
    }

    /// Recover the existing record or create a fresh one started at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be read or parsed.
    pub fn load_or_create(
        &self,
        profile_path: &Path,
        run_continuously: bool,
        now: DateTime<Local>,
    ) -> Result<ScheduleState> {
        match self.load(now)? {
            Some(state) => {
                info!(
                    path = %self.path.display(),
                    started = %state.started,
                    "recovered existing schedule state"
                );
                Ok(state)
            }
            None => Ok(ScheduleState::new(
                profile_path.to_path_buf(),
                run_continuously,
                now,
            )),
        }
    }

    fn recover(&self, raw: RawState, now: DateTime<Local>) -> ScheduleState {
        let now = trunc_secs(now);
        let started = raw.started.unwrap_or_else(|| {
            warn!("state record missing 'started', defaulting to now");
            now
        });
        let last_updated = raw.last_updated.unwrap_or_else(|| {
            warn!("state record missing 'last_updated', defaulting to now");
            now
        });
        let run_continuously = raw.run_continuously.unwrap_or_else(|| {
            warn!("state record missing 'run_continuously', defaulting to false");
            false
        });
        let profile_path = raw.profile_path.unwrap_or_else(|| {
            warn!("state record missing 'profile_path'");
            PathBuf::new()
        });
        let last_intensity = raw.last_intensity.unwrap_or_else(|| {
            warn!("state record missing 'last_intensity', defaulting to off");
            Intensity::OFF
        });
        ScheduleState {
            started,
            last_updated,
            run_continuously,
            finished_at: raw.finished_at,
            profile_path,
            last_intensity,
            pid: raw.pid,
        }
    }

    /// Remove the state file and any registered artifacts.
    ///
    /// Explicit, caller-invoked cleanup: the record must outlive the driver
    /// for the visualization process, so disposal is a deliberate operation
    /// at the end of a schedule's life, not a side effect of drop.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub fn teardown(&self) -> Result<()> {
        for path in std::iter::once(&self.path).chain(self.artifacts.iter()) {
            if path.exists() {
                fs::remove_file(path).map_err(|e| StateError::Write(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> StateStore {
        StateStore::new(dir.path().join("schedule_state.json"))
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut state = ScheduleState::new(PathBuf::from("profile.csv"), true, now());
        state.record_intensity(Intensity(42), now() + TimeDelta::seconds(5));

        store.save(&state).unwrap();
        let loaded = store.load(now()).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let state = ScheduleState::new(PathBuf::from("profile.csv"), true, now());

        store.save(&state).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("schedule_state.json")]);
    }

    #[test]
    fn test_save_to_unwritable_path_fails_after_retry() {
        // Parent directory does not exist, so both save attempts fail.
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("missing").join("schedule_state.json"));
        let state = ScheduleState::new(PathBuf::from("profile.csv"), true, now());

        assert!(matches!(
            store.save(&state),
            Err(crate::error::Error::State(StateError::Write(_)))
        ));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load(now()).unwrap(), None);
    }

    #[test]
    fn test_recovery_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{ "started": "2024-05-01T08:00:00+00:00", "profile_path": "profile.csv" }"#,
        )
        .unwrap();

        let state = store.load(now()).unwrap().unwrap();
        assert!(!state.run_continuously);
        assert_eq!(state.last_intensity, Intensity::OFF);
        assert_eq!(state.last_updated, now());
        assert_eq!(state.finished_at, None);
        assert_eq!(state.pid, None);
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json at all").unwrap();

        assert!(matches!(
            store.load(now()),
            Err(crate::error::Error::State(StateError::Parse(_)))
        ));
    }

    #[test]
    fn test_load_or_create_makes_fresh_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let state = store
            .load_or_create(Path::new("profile.csv"), true, now())
            .unwrap();

        assert_eq!(state.started, now());
        assert!(state.run_continuously);
    }

    #[test]
    fn test_teardown_removes_record_and_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let plot = dir.path().join("live_plot.png");
        fs::write(&plot, b"png").unwrap();
        store.register_artifact(&plot);

        let state = ScheduleState::new(PathBuf::from("profile.csv"), true, now());
        store.save(&state).unwrap();
        store.teardown().unwrap();

        assert!(!store.path().exists());
        assert!(!plot.exists());
    }
}
