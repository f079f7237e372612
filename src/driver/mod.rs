//! The real-time driver loop.
//!
//! Composes the step function, cycle clock, and persisted state to emit
//! device intensity commands at the right instants, resuming from an
//! arbitrary mid-cycle position after an uncontrolled restart.

mod phase;
mod time;
mod transport;

pub use phase::DriverPhase;
pub use time::{SystemClock, WallClock};
pub use transport::LightTransport;

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::config::SchedulerSettings;
use crate::cycle::{CycleClock, CycleMode, CyclePosition};
use crate::error::Result;
use crate::profile::{Intensity, ProfileTable, StepFunction};
use crate::state::{ScheduleState, StateStore};

/// Timing and retry knobs for the driver loop.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Fixed poll interval used while waiting for the next transition.
    pub poll_interval: Duration,

    /// Bounded attempt count per device command.
    pub command_retries: u32,

    /// Pause between device command attempts.
    pub retry_backoff: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            command_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

impl From<&SchedulerSettings> for DriverOptions {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            command_retries: settings.command_retries,
            retry_backoff: settings.retry_backoff(),
        }
    }
}

/// Drives one lighting device through one schedule.
///
/// Generic over:
/// - `T`: the device command transport
/// - `C`: the wall-clock source
pub struct Driver<T, C>
where
    T: LightTransport,
    C: WallClock,
{
    transport: T,
    clock: C,
    store: StateStore,
    state: ScheduleState,
    step: StepFunction,
    cycle: CycleClock,
    options: DriverOptions,
    phase: DriverPhase,
}

impl<T, C> Driver<T, C>
where
    T: LightTransport,
    C: WallClock,
{
    /// Assemble a driver from already-loaded parts.
    ///
    /// Most callers want [`Driver::initialize`], which also performs the
    /// device greeting and state/device convergence.
    pub fn from_parts(
        transport: T,
        clock: C,
        store: StateStore,
        state: ScheduleState,
        step: StepFunction,
        options: DriverOptions,
    ) -> Self {
        let mode = if state.run_continuously {
            CycleMode::Continuous
        } else {
            CycleMode::Single
        };
        let cycle = CycleClock::new(state.started, step.cycle_len(), mode);
        Self {
            transport,
            clock,
            store,
            state,
            step,
            cycle,
            options,
            phase: DriverPhase::Initializing,
        }
    }

    /// Load state (recovering a persisted record if present), load and
    /// expand the profile, and confirm device readiness.
    ///
    /// The last known intensity is re-issued unconditionally so the device
    /// and the record converge even if the device was power-cycled while
    /// the driver was down.
    ///
    /// # Errors
    ///
    /// A profile that fails to load is fatal and returned before any
    /// device command is issued: the driver never guesses a schedule.
    pub fn initialize(settings: &SchedulerSettings, transport: T, mut clock: C) -> Result<Self> {
        let now = clock.now();
        let store = StateStore::new(&settings.state_path);
        let mut state =
            store.load_or_create(&settings.profile_path, settings.run_continuously, now)?;
        state.pid = Some(std::process::id());

        let table = ProfileTable::load(&state.profile_path)?;
        let step = StepFunction::expand(&table);
        info!(
            pid = std::process::id(),
            profile = %state.profile_path.display(),
            cycle_len_s = step.cycle_len().num_seconds(),
            started = %state.started,
            "light driver starting"
        );

        let mut driver = Self::from_parts(
            transport,
            clock,
            store,
            state,
            step,
            DriverOptions::from(settings),
        );
        if let Err(err) = driver.transport.announce_presence() {
            warn!(error = %err, "device did not acknowledge presence announcement");
        }
        let last = driver.state.last_intensity;
        driver.send(last);
        Ok(driver)
    }

    /// The current driver phase.
    #[inline]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// The live state record.
    #[inline]
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// The expanded step function being driven.
    #[inline]
    pub fn step(&self) -> &StepFunction {
        &self.step
    }

    /// The cycle position and step-function index to resume from at `now`.
    ///
    /// A restart can land anywhere: the index is the first point at or
    /// after the offset within the current cycle, not necessarily zero.
    pub fn resume_point(&self, now: DateTime<Local>) -> (CyclePosition, usize) {
        let position = self.cycle.position(now);
        (position, self.step.index_at(position.offset))
    }

    /// Drive the schedule: forever in continuous mode, or until the single
    /// cycle completes.
    ///
    /// Device and persistence failures are contained here and never
    /// interrupt the scheduling clock.
    ///
    /// # Errors
    ///
    /// Currently infallible after initialization; the `Result` reserves the
    /// right to surface fatal runtime conditions.
    pub fn run(&mut self) -> Result<()> {
        self.phase = DriverPhase::Locating;
        debug!(phase = self.phase.name(), "locating resume position");
        let now = self.clock.now();

        if self.cycle.cycle_len() <= chrono::TimeDelta::zero() {
            // Degenerate flat profile: set the one level and stop rather
            // than spinning on a zero-length cycle.
            warn!("profile has a zero-length cycle; setting its level and completing");
            let level = self.step.final_intensity();
            if level != self.state.last_intensity && self.send(level) {
                self.state.record_intensity(level, now);
            }
            return self.complete();
        }

        if self.cycle.is_complete(now) {
            // The single cycle elapsed while the driver was down. Converge
            // the device on the declared final value and close out with a
            // finish time clamped to the cycle end, not to now.
            info!("elapsed time already exceeds the cycle; completing");
            let final_intensity = self.step.final_intensity();
            if final_intensity != self.state.last_intensity && self.send(final_intensity) {
                self.state.record_intensity(final_intensity, self.cycle.end_instant());
            }
            return self.complete();
        }

        let (position, mut index) = self.resume_point(now);
        let mut cycle_index = position.index;
        let mut cycle_start = position.cycle_start;
        debug!(
            cycle = cycle_index,
            index,
            offset_s = position.offset.num_seconds(),
            "resuming inside cycle"
        );

        self.phase = DriverPhase::Running;
        loop {
            while index < self.step.len() {
                let point = self.step.points()[index];

                if point.intensity != self.state.last_intensity && self.send(point.intensity) {
                    let now = self.clock.now();
                    self.state.record_intensity(point.intensity, now);
                    self.persist();
                }

                let due = cycle_start + point.offset;
                while self.clock.now() < due {
                    self.clock.sleep(self.options.poll_interval);
                }
                index += 1;
            }

            self.phase = DriverPhase::CycleBoundary;
            if !self.state.run_continuously {
                return self.complete();
            }
            cycle_index += 1;
            cycle_start = self.cycle.cycle_start(cycle_index);
            index = 0;
            info!(cycle = cycle_index, "starting next cycle");
            self.phase = DriverPhase::Running;
        }
    }

    /// Tear down the driver, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn complete(&mut self) -> Result<()> {
        self.state.mark_finished(self.cycle.end_instant());
        self.phase = DriverPhase::Completed;
        self.persist();
        info!(
            phase = self.phase.name(),
            finished_at = %self.cycle.end_instant(),
            "schedule complete"
        );
        Ok(())
    }

    /// Persist the state record; a failure is loud but not fatal, since the
    /// schedule can keep running from memory.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.state) {
            error!(error = %err, "failed to persist schedule state; resume accuracy at risk");
        }
    }

    /// Issue a device command with bounded retries and brief backoff.
    ///
    /// Returns whether the device accepted it. Exhausted retries are logged
    /// and skipped; a missed intensity set is not fatal to the schedule.
    fn send(&mut self, intensity: Intensity) -> bool {
        for attempt in 1..=self.options.command_retries {
            match self.transport.set_intensity(intensity) {
                Ok(()) => {
                    info!(%intensity, "set light intensity");
                    return true;
                }
                Err(err) => {
                    warn!(%intensity, attempt, error = %err, "device command failed");
                    if attempt < self.options.command_retries {
                        self.clock.sleep(self.options.retry_backoff);
                    }
                }
            }
        }
        error!(
            %intensity,
            attempts = self.options.command_retries,
            "device command abandoned"
        );
        false
    }
}
