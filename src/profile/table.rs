//! Profile table loading.
//!
//! A profile is a two-column delimited text source: a time column and an
//! integer intensity column, one header row, one row per control point.
//! Loading normalizes the time column into durations since profile start.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Light intensity in device units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Intensity(pub u16);

impl Intensity {
    /// The device's off level.
    pub const OFF: Intensity = Intensity(0);

    /// Create a new Intensity value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One profile control point: duration since profile start plus the
/// intensity the device should hold from that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilePoint {
    /// Non-negative duration since the start of the profile.
    pub offset: TimeDelta,

    /// Intensity to hold from `offset` onward.
    pub intensity: Intensity,
}

impl ProfilePoint {
    /// Create a new control point.
    #[inline]
    pub const fn new(offset: TimeDelta, intensity: Intensity) -> Self {
        Self { offset, intensity }
    }
}

/// Ordered control points of a light profile, non-decreasing by offset.
///
/// Ties keep their input order: duplicate offsets are meaningful step
/// boundaries, not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    points: Vec<ProfilePoint>,
}

/// Time encoding of the first column, decided by the first data row.
enum TimeEncoding {
    /// `HH:MM:SS` values; the offset is the duration since midnight.
    TimeOfDay,
    /// Absolute timestamps; offsets are deltas from the first row's value.
    Timestamp(NaiveDateTime),
}

impl ProfileTable {
    /// Load a profile from a delimited text file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any row is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ProfileError::Io(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse a profile from delimited text (comma or tab separated).
    ///
    /// The first line is a header and is skipped; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if any row does not yield exactly two columns, the
    /// time column fails to parse consistently, or the intensity column is
    /// not an integer.
    pub fn parse(content: &str) -> Result<Self> {
        let mut points = Vec::new();
        let mut encoding: Option<TimeEncoding> = None;

        for (idx, raw) in content.lines().enumerate() {
            if idx == 0 {
                continue;
            }
            let row = raw.trim();
            if row.is_empty() {
                continue;
            }
            let line = idx + 1;
            let columns: Vec<&str> = split_columns(row);
            if columns.len() != 2 {
                return Err(ProfileError::ColumnCount {
                    line,
                    found: columns.len(),
                }
                .into());
            }

            let offset = parse_offset(columns[0].trim(), line, &mut encoding)?;
            let intensity: u16 = columns[1].trim().parse().map_err(|_| {
                ProfileError::BadIntensity {
                    line,
                    value: columns[1].trim().to_string(),
                }
            })?;

            points.push(ProfilePoint::new(offset, Intensity(intensity)));
        }

        Self::from_points(points)
    }

    /// Build a table from control points already in memory.
    ///
    /// Points are stably sorted by offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the point list is empty.
    pub fn from_points(mut points: Vec<ProfilePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ProfileError::Empty.into());
        }
        points.sort_by_key(|p| p.offset);
        Ok(Self { points })
    }

    /// Get the control points, sorted by offset.
    #[inline]
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Number of control points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a table holds at least one point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn split_columns(row: &str) -> Vec<&str> {
    if row.contains('\t') {
        row.split('\t').collect()
    } else {
        row.split(',').collect()
    }
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn parse_offset(
    field: &str,
    line: usize,
    encoding: &mut Option<TimeEncoding>,
) -> Result<TimeDelta> {
    let bad_time = || ProfileError::BadTime {
        line,
        value: field.to_string(),
    };

    match encoding {
        Some(TimeEncoding::TimeOfDay) => {
            let time = NaiveTime::parse_from_str(field, "%H:%M:%S").map_err(|_| bad_time())?;
            Ok(time.signed_duration_since(NaiveTime::MIN))
        }
        Some(TimeEncoding::Timestamp(base)) => {
            let stamp = parse_timestamp(field).ok_or_else(bad_time)?;
            let offset = stamp.signed_duration_since(*base);
            if offset < TimeDelta::zero() {
                return Err(bad_time().into());
            }
            Ok(offset)
        }
        None => {
            if let Some(stamp) = parse_timestamp(field) {
                *encoding = Some(TimeEncoding::Timestamp(stamp));
                return Ok(TimeDelta::zero());
            }
            let time = NaiveTime::parse_from_str(field, "%H:%M:%S").map_err(|_| bad_time())?;
            *encoding = Some(TimeEncoding::TimeOfDay);
            Ok(time.signed_duration_since(NaiveTime::MIN))
        }
    }
}

fn parse_timestamp(field: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(field, fmt).ok())
}
