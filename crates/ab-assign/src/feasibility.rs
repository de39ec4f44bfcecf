//! Feasible destination zones for one activity.
//!
//! # Sources
//!
//! With a travel-time matrix covering the origin, a zone is feasible when its
//! travel time lies within `tolerance × reported_minutes` of the reported
//! time.  Otherwise the straight-line distance is converted to an estimated
//! network distance with the [`DetourModel`] and compared with the reported
//! distance under the same proportional tolerance.
//!
//! Either way only zones holding at least one POI of the required category
//! survive.  The result may be empty; callers resolve that with
//! [`ZoneFallback`](crate::ZoneFallback) policies.

use ab_core::{ActivityId, Category, ZoneId};
use ab_population::Activity;
use ab_spatial::{DetourModel, PoiIndex, TravelTimes, ZoneIndex};

use crate::{AssignError, AssignResult};

/// What the reported value was compared against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeasibilitySource {
    /// Matrix travel time vs reported minutes.
    TravelTime,
    /// Estimated network distance vs reported metres.
    Distance,
    /// Neither reported minutes nor distance were available.
    Unreported,
}

/// One feasible destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub zone: ZoneId,
    /// Estimated network distance from the origin, metres.
    pub distance_m: f64,
    /// Matrix travel time, when that was the source.
    pub travel_minutes: Option<f64>,
    /// Floor area of the required category in this zone.
    pub floor_area: f64,
    /// `|value − reported|` in the source's unit.
    pub deviation: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeasibleZoneSet {
    pub activity: ActivityId,
    pub origin: ZoneId,
    pub category: Category,
    pub source: FeasibilitySource,
    /// Ascending by zone id.
    pub candidates: Vec<Candidate>,
}

impl FeasibleZoneSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        self.candidates.iter().any(|c| c.zone == zone)
    }
}

// ── ZoneFeasibility ───────────────────────────────────────────────────────────

/// Shared read-only lookups for feasibility checks.
#[derive(Clone, Copy)]
pub struct ZoneFeasibility<'a> {
    pub zones: &'a ZoneIndex,
    pub pois: &'a PoiIndex,
    pub travel: Option<&'a dyn TravelTimes>,
    pub detour: DetourModel,
}

impl<'a> ZoneFeasibility<'a> {
    /// A POI index is required; its absence is fatal.
    pub fn new(
        zones: &'a ZoneIndex,
        pois: Option<&'a PoiIndex>,
        travel: Option<&'a dyn TravelTimes>,
        detour: DetourModel,
    ) -> AssignResult<Self> {
        let pois = pois.ok_or(AssignError::MissingPoiIndex)?;
        Ok(ZoneFeasibility { zones, pois, travel, detour })
    }

    /// Estimated network distance between two zone centroids.  `None` for
    /// unknown zones.
    pub fn estimated_distance_m(&self, from: ZoneId, to: ZoneId) -> Option<f64> {
        let a = self.zones.centroid(from)?;
        let b = self.zones.centroid(to)?;
        Some(self.detour.actual_distance(a.distance_m(b)))
    }

    /// Every zone with `category`, each scored against the reported value,
    /// with no tolerance applied.
    pub fn scored(&self, origin: ZoneId, activity: &Activity, category: &Category) -> FeasibleZoneSet {
        let mut set = FeasibleZoneSet {
            activity: activity.id,
            origin,
            category: category.clone(),
            source: FeasibilitySource::Unreported,
            candidates: Vec::new(),
        };

        // ── Matrix ────────────────────────────────────────────────────────
        if let (Some(travel), Some(reported)) = (self.travel, activity.travel_minutes) {
            let row = travel.destinations(origin, activity.mode, activity.day, activity.time);
            if !row.is_empty() {
                set.source = FeasibilitySource::TravelTime;
                set.candidates = row
                    .into_iter()
                    .filter(|(z, _)| self.pois.has(*z, category))
                    .filter_map(|(z, minutes)| {
                        Some(Candidate {
                            zone: z,
                            distance_m: self.estimated_distance_m(origin, z)?,
                            travel_minutes: Some(minutes),
                            floor_area: self.pois.floor_area(z, category),
                            deviation: (minutes - reported).abs(),
                        })
                    })
                    .collect();
                return set;
            }
        }

        // ── Distance ──────────────────────────────────────────────────────
        let Some(reported) = activity.distance_m else {
            return set;
        };
        set.source = FeasibilitySource::Distance;
        set.candidates = self
            .pois
            .zones_with(category)
            .filter_map(|z| {
                let d = self.estimated_distance_m(origin, z)?;
                Some(Candidate {
                    zone: z,
                    distance_m: d,
                    travel_minutes: None,
                    floor_area: self.pois.floor_area(z, category),
                    deviation: (d - reported).abs(),
                })
            })
            .collect();
        set
    }

    /// Zones with `category` whose time or distance lies within
    /// `tolerance × reported` of the reported value.  May be empty.
    pub fn feasible(
        &self,
        origin: ZoneId,
        activity: &Activity,
        category: &Category,
        tolerance: f64,
    ) -> FeasibleZoneSet {
        let mut set = self.scored(origin, activity, category);
        let reported = match set.source {
            FeasibilitySource::TravelTime => activity.travel_minutes,
            FeasibilitySource::Distance   => activity.distance_m,
            FeasibilitySource::Unreported => None,
        };
        match reported {
            Some(r) => {
                let band = tolerance * r;
                set.candidates.retain(|c| c.deviation <= band + 1e-9);
            }
            None => set.candidates.clear(),
        }
        set
    }
}
