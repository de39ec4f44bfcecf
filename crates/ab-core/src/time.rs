//! Day-part buckets and weekday flags used to key travel-time lookups.
//!
//! Diary trips report a start time in minutes after midnight and a
//! day-of-week code.  Travel times only vary across coarse periods, so both
//! are collapsed into the two small enums below before touching a matrix.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Minutes in a day; start times at or beyond this wrap around.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ── TimeOfDay ─────────────────────────────────────────────────────────────────

/// Coarse day-part bucket.
///
/// | Bucket      | Minutes after midnight |
/// |-------------|------------------------|
/// | `Night`     | 0 – 299                |
/// | `Morning`   | 300 – 719              |
/// | `Afternoon` | 720 – 1079             |
/// | `Evening`   | 1080 – 1439            |
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Bucket for a start time in minutes after midnight.  Times past
    /// midnight of the following day wrap.
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes % MINUTES_PER_DAY {
            0..300    => TimeOfDay::Night,
            300..720  => TimeOfDay::Morning,
            720..1080 => TimeOfDay::Afternoon,
            _         => TimeOfDay::Evening,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Night     => "night",
            TimeOfDay::Morning   => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening   => "evening",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "night"     => Ok(TimeOfDay::Night),
            "morning"   => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening"   => Ok(TimeOfDay::Evening),
            other => Err(CoreError::Parse(format!("unknown time of day {other:?}"))),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DayType ───────────────────────────────────────────────────────────────────

/// Weekday flag for travel-time lookups.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// From an ISO day-of-week code (1 = Monday … 7 = Sunday).
    pub fn from_day_of_week(day: u8) -> CoreResult<Self> {
        match day {
            1..=5 => Ok(DayType::Weekday),
            6 | 7 => Ok(DayType::Weekend),
            other => Err(CoreError::Parse(format!("day of week {other} outside 1..=7"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" => Ok(DayType::Weekday),
            "weekend" => Ok(DayType::Weekend),
            other => Err(CoreError::Parse(format!("unknown day type {other:?}"))),
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
