//! Data snapshot for the plotting collaborator.
//!
//! The visualization process draws the current cycle's step series with
//! progress markers; this module only assembles the data. Layout, styling,
//! and image output live outside the core.

use chrono::{DateTime, Local};

use crate::cycle::{CycleClock, CycleMode};
use crate::profile::{Intensity, StepFunction};
use crate::state::ScheduleState;

/// Everything a renderer needs to draw one schedule at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    /// Absolute-time step series for the cycle being displayed.
    pub series: Vec<(DateTime<Local>, Intensity)>,

    /// Instant the schedule was first activated.
    pub started: DateTime<Local>,

    /// Zero-based index of the displayed cycle.
    pub cycle_index: i64,

    /// Absolute start instant of the displayed cycle.
    pub cycle_start: DateTime<Local>,

    /// Progress marker: now, clamped to the cycle end once a single-cycle
    /// run has completed.
    pub marker: DateTime<Local>,

    /// Last intensity actually issued to the device.
    pub last_intensity: Intensity,

    /// Whether the schedule loops forever.
    pub looping: bool,

    /// Whether a single-cycle run has completed.
    pub completed: bool,

    /// File name portion of the profile reference, for titling.
    pub profile_name: String,
}

impl RenderSnapshot {
    /// Capture a snapshot of a schedule at `now`.
    pub fn capture(step: &StepFunction, state: &ScheduleState, now: DateTime<Local>) -> Self {
        let mode = if state.run_continuously {
            CycleMode::Continuous
        } else {
            CycleMode::Single
        };
        let clock = CycleClock::new(state.started, step.cycle_len(), mode);
        let position = clock.position(now);
        let completed = clock.is_complete(now);

        // A completed single run displays its one cycle; a looping run
        // displays whichever cycle contains now.
        let cycle_start = if state.run_continuously {
            position.cycle_start
        } else {
            state.started
        };
        let marker = if completed { clock.end_instant() } else { now };

        let series = step
            .points()
            .iter()
            .map(|p| (cycle_start + p.offset, p.intensity))
            .collect();

        let profile_name = state
            .profile_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            series,
            started: state.started,
            cycle_index: position.index,
            cycle_start,
            marker,
            last_intensity: state.last_intensity,
            looping: state.run_continuously,
            completed,
            profile_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ProfilePoint, ProfileTable};
    use chrono::{TimeDelta, TimeZone};
    use std::path::PathBuf;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn step() -> StepFunction {
        let table = ProfileTable::from_points(vec![
            ProfilePoint::new(TimeDelta::zero(), Intensity(0)),
            ProfilePoint::new(TimeDelta::seconds(10), Intensity(50)),
            ProfilePoint::new(TimeDelta::seconds(20), Intensity(0)),
        ])
        .unwrap();
        StepFunction::expand(&table)
    }

    fn state(run_continuously: bool) -> ScheduleState {
        ScheduleState::new(PathBuf::from("live/base.csv"), run_continuously, start())
    }

    #[test]
    fn test_series_is_anchored_to_cycle_start() {
        let snapshot =
            RenderSnapshot::capture(&step(), &state(true), start() + TimeDelta::seconds(30));

        // 30 s into a 20 s cycle: the displayed cycle is the second one.
        assert_eq!(snapshot.cycle_index, 1);
        assert_eq!(snapshot.cycle_start, start() + TimeDelta::seconds(20));
        assert_eq!(snapshot.series[0].0, snapshot.cycle_start);
        assert_eq!(
            snapshot.series.last().unwrap().0,
            snapshot.cycle_start + TimeDelta::seconds(20)
        );
        assert!(!snapshot.completed);
        assert_eq!(snapshot.profile_name, "base.csv");
    }

    #[test]
    fn test_completed_single_run_clamps_marker() {
        let snapshot =
            RenderSnapshot::capture(&step(), &state(false), start() + TimeDelta::seconds(25));

        assert!(snapshot.completed);
        assert_eq!(snapshot.cycle_start, start());
        assert_eq!(snapshot.marker, start() + TimeDelta::seconds(20));
    }

    #[test]
    fn test_running_marker_is_now() {
        let now = start() + TimeDelta::seconds(7);
        let snapshot = RenderSnapshot::capture(&step(), &state(false), now);

        assert!(!snapshot.completed);
        assert_eq!(snapshot.marker, now);
    }
}
