//! Travel mode enum shared by the diary, the travel-time matrix and the
//! assigners.

use std::str::FromStr;

use crate::CoreError;

/// The mode a diary respondent reported for a trip.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelMode {
    Car,
    CarPassenger,
    Pt,
    Cycle,
    Walk,
    Taxi,
    Other,
}

impl TravelMode {
    /// The mode whose travel times stand in for this one.  There are no
    /// separate matrices for car passengers or taxis.
    #[inline]
    pub fn matrix_mode(self) -> TravelMode {
        match self {
            TravelMode::CarPassenger | TravelMode::Taxi => TravelMode::Car,
            m => m,
        }
    }

    /// Assumed average door-to-door speed, used to convert between reported
    /// travel time and distance when one of them is missing.
    pub fn estimated_speed_kmh(self) -> f64 {
        match self.matrix_mode() {
            TravelMode::Car   => 20.0,
            TravelMode::Pt    => 15.0,
            TravelMode::Cycle => 15.0,
            TravelMode::Walk  => 5.0,
            _                 => 15.0,
        }
    }

    /// Metres covered in `minutes` at [`estimated_speed_kmh`](Self::estimated_speed_kmh).
    #[inline]
    pub fn distance_for_minutes(self, minutes: f64) -> f64 {
        minutes * self.estimated_speed_kmh() * 1000.0 / 60.0
    }

    /// Minutes needed for `metres` at [`estimated_speed_kmh`](Self::estimated_speed_kmh).
    #[inline]
    pub fn minutes_for_distance(self, metres: f64) -> f64 {
        metres * 60.0 / (self.estimated_speed_kmh() * 1000.0)
    }

    /// Label used in CSV input and output.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Car          => "car",
            TravelMode::CarPassenger => "car_passenger",
            TravelMode::Pt           => "pt",
            TravelMode::Cycle        => "cycle",
            TravelMode::Walk         => "walk",
            TravelMode::Taxi         => "taxi",
            TravelMode::Other        => "other",
        }
    }
}

impl FromStr for TravelMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car"           => Ok(TravelMode::Car),
            "car_passenger" => Ok(TravelMode::CarPassenger),
            "pt"            => Ok(TravelMode::Pt),
            "cycle" | "bike" => Ok(TravelMode::Cycle),
            "walk"          => Ok(TravelMode::Walk),
            "taxi"          => Ok(TravelMode::Taxi),
            "other"         => Ok(TravelMode::Other),
            other => Err(CoreError::Parse(format!("unknown travel mode {other:?}"))),
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
