//! Travel-time lookups.
//!
//! # Pluggability
//!
//! The assigners only see the [`TravelTimes`] trait, so a caller can back it
//! with a routing engine instead of the in-memory [`TravelTimeMatrix`].
//!
//! # Key resolution
//!
//! A matrix is split into slices keyed by `(mode, day type, time bucket)`.
//! Passenger modes are first mapped to the mode whose times they share
//! ([`TravelMode::matrix_mode`]).  When no slice exists for the exact
//! `(day, time)` the time-independent slice for that mode is used: walking
//! and cycling times are usually published only once.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use ab_core::{DayType, TimeOfDay, TravelMode, ZoneId};

use crate::{SpatialError, SpatialResult};

/// Source of zone-to-zone travel times in minutes.
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads.
pub trait TravelTimes: Send + Sync {
    /// Minutes from `from` to `to`, or `None` when the pair is not covered.
    fn minutes(
        &self,
        from: ZoneId,
        to: ZoneId,
        mode: TravelMode,
        day: DayType,
        time: TimeOfDay,
    ) -> Option<f64>;

    /// Every destination reachable from `from` with its time, ascending by
    /// zone id.  Empty when the origin is not covered.
    fn destinations(
        &self,
        from: ZoneId,
        mode: TravelMode,
        day: DayType,
        time: TimeOfDay,
    ) -> Vec<(ZoneId, f64)>;
}

// ── TravelTimeMatrix ──────────────────────────────────────────────────────────

/// `(mode, day, time)`; `None` day and time mark the time-independent slice.
type SliceKey = (TravelMode, Option<DayType>, Option<TimeOfDay>);

type Slice = FxHashMap<ZoneId, BTreeMap<ZoneId, f64>>;

/// In-memory sparse travel-time matrix.
#[derive(Default)]
pub struct TravelTimeMatrix {
    slices: FxHashMap<SliceKey, Slice>,
    entries: usize,
}

impl TravelTimeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one travel time.  Pass `None` for `day` and `time` to store a
    /// time-independent value.  Negative or non-finite times are rejected.
    pub fn insert(
        &mut self,
        from: ZoneId,
        to: ZoneId,
        mode: TravelMode,
        day: Option<DayType>,
        time: Option<TimeOfDay>,
        minutes: f64,
    ) -> SpatialResult<()> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(SpatialError::InvalidValue(format!(
                "travel time {minutes} from {from} to {to}"
            )));
        }
        let prev = self
            .slices
            .entry((mode.matrix_mode(), day, time))
            .or_default()
            .entry(from)
            .or_default()
            .insert(to, minutes);
        if prev.is_none() {
            self.entries += 1;
        }
        Ok(())
    }

    /// Number of stored (origin, destination, slice) entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    fn slice(&self, mode: TravelMode, day: DayType, time: TimeOfDay) -> Option<&Slice> {
        let mode = mode.matrix_mode();
        self.slices
            .get(&(mode, Some(day), Some(time)))
            .or_else(|| self.slices.get(&(mode, None, None)))
    }
}

impl TravelTimes for TravelTimeMatrix {
    fn minutes(
        &self,
        from: ZoneId,
        to: ZoneId,
        mode: TravelMode,
        day: DayType,
        time: TimeOfDay,
    ) -> Option<f64> {
        self.slice(mode, day, time)?.get(&from)?.get(&to).copied()
    }

    fn destinations(
        &self,
        from: ZoneId,
        mode: TravelMode,
        day: DayType,
        time: TimeOfDay,
    ) -> Vec<(ZoneId, f64)> {
        self.slice(mode, day, time)
            .and_then(|s| s.get(&from))
            .map(|row| row.iter().map(|(&z, &t)| (z, t)).collect())
            .unwrap_or_default()
    }
}
