//! Cycle-time arithmetic.
//!
//! Maps an arbitrary wall-clock instant onto a position within a repeating
//! cycle, and decides completion for single-cycle runs.

use chrono::{DateTime, Local, TimeDelta};

/// Whether a schedule runs one cycle then stops, or repeats forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Exactly one cycle, then the run completes.
    Single,
    /// Repeat forever; no terminal case.
    Continuous,
}

/// A position inside a repeating cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePosition {
    /// Zero-based index of the cycle containing `now`.
    pub index: i64,

    /// Absolute instant that cycle began.
    pub cycle_start: DateTime<Local>,

    /// Duration from `cycle_start` to `now`. Always less than the cycle
    /// length for instants at or after the schedule start.
    pub offset: TimeDelta,
}

/// Maps absolute instants onto cycle positions.
#[derive(Debug, Clone)]
pub struct CycleClock {
    start: DateTime<Local>,
    cycle_len: TimeDelta,
    mode: CycleMode,
}

impl CycleClock {
    /// Create a clock for a schedule started at `start` with the given
    /// cycle length and mode.
    pub fn new(start: DateTime<Local>, cycle_len: TimeDelta, mode: CycleMode) -> Self {
        Self {
            start,
            cycle_len,
            mode,
        }
    }

    /// The instant the schedule was first activated.
    #[inline]
    pub fn start(&self) -> DateTime<Local> {
        self.start
    }

    /// Length of one cycle.
    #[inline]
    pub fn cycle_len(&self) -> TimeDelta {
        self.cycle_len
    }

    /// The configured mode.
    #[inline]
    pub fn mode(&self) -> CycleMode {
        self.mode
    }

    /// The instant one full cycle past the start. In single mode this is
    /// the clamp target for completion timestamps.
    pub fn end_instant(&self) -> DateTime<Local> {
        self.start + self.cycle_len
    }

    /// Absolute start instant of the cycle with the given index.
    pub fn cycle_start(&self, index: i64) -> DateTime<Local> {
        self.start + TimeDelta::milliseconds(self.cycle_len.num_milliseconds() * index)
    }

    /// Map `now` to its cycle position.
    ///
    /// For any `now` at or after `start`, `cycle_start + offset == now`
    /// exactly. Instants before `start` and degenerate (zero-length) cycles
    /// clamp to cycle zero, offset zero.
    pub fn position(&self, now: DateTime<Local>) -> CyclePosition {
        let len_ms = self.cycle_len.num_milliseconds();
        let elapsed_ms = now.signed_duration_since(self.start).num_milliseconds();

        if len_ms <= 0 || elapsed_ms < 0 {
            return CyclePosition {
                index: 0,
                cycle_start: self.start,
                offset: TimeDelta::zero(),
            };
        }

        let index = elapsed_ms.div_euclid(len_ms);
        let cycle_start = self.cycle_start(index);
        CyclePosition {
            index,
            cycle_start,
            offset: now.signed_duration_since(cycle_start),
        }
    }

    /// Whether a single-cycle run has used up its one cycle by `now`.
    ///
    /// Continuous mode never completes.
    pub fn is_complete(&self, now: DateTime<Local>) -> bool {
        match self.mode {
            CycleMode::Continuous => false,
            CycleMode::Single => {
                self.cycle_len <= TimeDelta::zero()
                    || now.signed_duration_since(self.start) >= self.cycle_len
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_position_within_first_cycle() {
        let clock = CycleClock::new(start(), TimeDelta::seconds(20), CycleMode::Continuous);
        let pos = clock.position(start() + TimeDelta::seconds(7));

        assert_eq!(pos.index, 0);
        assert_eq!(pos.cycle_start, start());
        assert_eq!(pos.offset, TimeDelta::seconds(7));
    }

    #[test]
    fn test_resume_mid_second_cycle() {
        // Restart at start + 1.5 cycles lands in cycle 1 at half a cycle in.
        let clock = CycleClock::new(start(), TimeDelta::seconds(20), CycleMode::Continuous);
        let pos = clock.position(start() + TimeDelta::seconds(30));

        assert_eq!(pos.index, 1);
        assert_eq!(pos.cycle_start, start() + TimeDelta::seconds(20));
        assert_eq!(pos.offset, TimeDelta::seconds(10));
    }

    #[test]
    fn test_before_start_clamps_to_zero() {
        let clock = CycleClock::new(start(), TimeDelta::seconds(20), CycleMode::Continuous);
        let pos = clock.position(start() - TimeDelta::seconds(5));

        assert_eq!(pos.index, 0);
        assert_eq!(pos.offset, TimeDelta::zero());
    }

    #[test]
    fn test_zero_length_cycle_is_degenerate() {
        let clock = CycleClock::new(start(), TimeDelta::zero(), CycleMode::Single);
        let pos = clock.position(start() + TimeDelta::seconds(5));

        assert_eq!(pos.index, 0);
        assert_eq!(pos.offset, TimeDelta::zero());
        assert!(clock.is_complete(start()));
    }

    #[test]
    fn test_single_mode_completion() {
        let clock = CycleClock::new(start(), TimeDelta::seconds(20), CycleMode::Single);

        assert!(!clock.is_complete(start() + TimeDelta::seconds(19)));
        assert!(clock.is_complete(start() + TimeDelta::seconds(20)));
        assert!(clock.is_complete(start() + TimeDelta::seconds(25)));
        assert_eq!(clock.end_instant(), start() + TimeDelta::seconds(20));
    }

    #[test]
    fn test_continuous_mode_never_completes() {
        let clock = CycleClock::new(start(), TimeDelta::seconds(20), CycleMode::Continuous);
        assert!(!clock.is_complete(start() + TimeDelta::days(300)));
    }

    proptest! {
        #[test]
        fn prop_position_is_consistent(
            elapsed_ms in 0i64..10 * 86_400_000,
            len_s in 1i64..86_400,
        ) {
            let len = TimeDelta::seconds(len_s);
            let clock = CycleClock::new(start(), len, CycleMode::Continuous);
            let now = start() + TimeDelta::milliseconds(elapsed_ms);
            let pos = clock.position(now);

            prop_assert_eq!(pos.cycle_start + pos.offset, now);
            prop_assert!(pos.offset >= TimeDelta::zero());
            prop_assert!(pos.offset < len);
            prop_assert_eq!(pos.cycle_start, clock.cycle_start(pos.index));
        }
    }
}
