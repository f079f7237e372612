//! Step-function expansion of sparse profiles.
//!
//! A sparse profile names only the instants where the intensity changes.
//! Expansion produces a piecewise-constant representation with an explicit
//! "hold" row before every transition, so a renderer or a live lookup never
//! needs interpolation.

use chrono::TimeDelta;

use super::table::{Intensity, ProfilePoint, ProfileTable};

/// Fully expanded, piecewise-constant representation of a profile.
///
/// Invariants:
/// - the first point has offset zero;
/// - no two adjacent points share both offset and intensity;
/// - every intensity change at offset T is preceded by exactly one hold
///   point at T carrying the prior intensity.
///
/// Derived once per profile load and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFunction {
    points: Vec<ProfilePoint>,
}

impl StepFunction {
    /// Expand a profile table into a step function.
    ///
    /// This is a total function: degenerate input (duplicate rows, zero
    /// durations) quietly collapses into a flat segment rather than failing.
    pub fn expand(table: &ProfileTable) -> Self {
        let src = table.points();
        let zero = TimeDelta::zero();
        let mut points: Vec<ProfilePoint> = Vec::with_capacity(src.len() * 2);

        // Anchor at offset zero. A profile that starts later gets a
        // synthetic dark anchor and its first row becomes a transition.
        let rest = if src[0].offset == zero {
            points.push(src[0]);
            &src[1..]
        } else {
            points.push(ProfilePoint::new(zero, Intensity::OFF));
            src
        };

        for (i, point) in rest.iter().enumerate() {
            let last = *points.last().expect("anchor emitted above");
            if point.offset == zero || point.intensity == last.intensity {
                // Collapse duplicate zero-offset rows and repeated
                // intensities, but keep the table's declared end time even
                // when the final intensity repeats the previous one.
                let is_final = i + 1 == rest.len();
                if is_final && point.offset > last.offset {
                    points.push(ProfilePoint::new(point.offset, last.intensity));
                }
                continue;
            }
            // Hold the previous intensity right up to the transition
            // instant. When the previous point already sits at this offset
            // (stacked step boundaries) the hold would repeat it verbatim,
            // so it is elided.
            let hold = ProfilePoint::new(point.offset, last.intensity);
            if hold != last {
                points.push(hold);
            }
            points.push(*point);
        }

        Self { points }
    }

    /// Get the expanded points.
    #[inline]
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Number of expanded points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: expansion emits at least the anchor point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of one cycle: the offset of the last point, capped at one
    /// calendar day.
    pub fn cycle_len(&self) -> TimeDelta {
        let last = self.points.last().expect("step function is never empty");
        last.offset.min(TimeDelta::days(1))
    }

    /// Intensity declared at the end of the cycle.
    pub fn final_intensity(&self) -> Intensity {
        self.points.last().expect("step function is never empty").intensity
    }

    /// Index of the first point whose offset is at or after `offset`.
    ///
    /// This is the resume primitive: after a restart the walk may begin at
    /// any index, not just zero. Offsets past the end return `len()`.
    pub fn index_at(&self, offset: TimeDelta) -> usize {
        self.points.partition_point(|p| p.offset < offset)
    }
}
