//! Ordered fallback policies.
//!
//! An empty feasible set or an empty facility pool is an expected outcome.
//! Callers walk a configured list of policies and take the first one that
//! yields something, recording which one it was.

use std::cmp::Ordering;

use log::debug;
use rustc_hash::FxHashMap;

use ab_core::{Category, ZoneId};
use ab_population::Activity;

use crate::{Candidate, ZoneFeasibility};

/// Zone fallbacks, tried in configured order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneFallback {
    /// The zone with the required POI whose time or distance is closest to
    /// the reported value, ignoring the tolerance.
    ClosestToReported,
    /// Retry the tolerance check with every category sharing the parent
    /// category (any `education*` for `education_school`).
    RelaxCategory,
    /// The zone nearest to the origin holding the required POI.
    NearestWithPoi,
}

impl ZoneFallback {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneFallback::ClosestToReported => "closest_to_reported",
            ZoneFallback::RelaxCategory     => "relax_category",
            ZoneFallback::NearestWithPoi    => "nearest_with_poi",
        }
    }
}

/// Facility fallbacks, tried in configured order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FacilityFallback {
    /// Facilities of sibling categories (same parent) in the zone.
    FallbackCategory,
    /// Facilities of the category in the `k` nearest zones.
    NeighbouringZones(usize),
    /// Any facility in the zone.
    AnyInZone,
}

impl FacilityFallback {
    pub fn as_str(self) -> &'static str {
        match self {
            FacilityFallback::FallbackCategory     => "fallback_category",
            FacilityFallback::NeighbouringZones(_) => "neighbouring_zones",
            FacilityFallback::AnyInZone            => "any_in_zone",
        }
    }
}

// ── Candidate ordering ────────────────────────────────────────────────────────

/// Closest to the reported value first; ties go to the larger floor area,
/// then the lower zone id.
pub fn by_closeness(a: &Candidate, b: &Candidate) -> Ordering {
    const EPS: f64 = 1e-9;
    if (a.deviation - b.deviation).abs() > EPS {
        return a.deviation.total_cmp(&b.deviation);
    }
    b.floor_area
        .total_cmp(&a.floor_area)
        .then(a.zone.cmp(&b.zone))
}

/// Nearest first, then lower zone id.
pub fn by_distance(a: &Candidate, b: &Candidate) -> Ordering {
    a.distance_m.total_cmp(&b.distance_m).then(a.zone.cmp(&b.zone))
}

// ── Zone fallbacks ────────────────────────────────────────────────────────────

fn closest_to_reported(
    feas: &ZoneFeasibility<'_>,
    origin: ZoneId,
    activity: &Activity,
    category: &Category,
) -> Vec<Candidate> {
    let set = feas.scored(origin, activity, category);
    set.candidates.into_iter().min_by(by_closeness).into_iter().collect()
}

fn relax_category(
    feas: &ZoneFeasibility<'_>,
    origin: ZoneId,
    activity: &Activity,
    category: &Category,
    tolerance: f64,
) -> Vec<Candidate> {
    let parent = category.parent().unwrap_or_else(|| category.clone());
    let mut merged: FxHashMap<ZoneId, Candidate> = FxHashMap::default();
    for sibling in feas.pois.categories_within(&parent) {
        for c in feas.feasible(origin, activity, &sibling, tolerance).candidates {
            match merged.get_mut(&c.zone) {
                Some(existing) => existing.floor_area += c.floor_area,
                None => {
                    merged.insert(c.zone, c);
                }
            }
        }
    }
    let mut out: Vec<Candidate> = merged.into_values().collect();
    out.sort_by_key(|c| c.zone);
    out
}

fn nearest_with_poi(
    feas: &ZoneFeasibility<'_>,
    origin: ZoneId,
    activity: &Activity,
    category: &Category,
) -> Vec<Candidate> {
    let Some(centroid) = feas.zones.centroid(origin) else {
        return Vec::new();
    };
    let Some(zone) = feas.zones.nearest_iter(centroid).find(|&z| feas.pois.has(z, category)) else {
        return Vec::new();
    };
    let distance_m = feas.estimated_distance_m(origin, zone).unwrap_or(0.0);
    let deviation = activity.distance_m.map_or(0.0, |r| (distance_m - r).abs());
    vec![Candidate {
        zone,
        distance_m,
        travel_minutes: None,
        floor_area: feas.pois.floor_area(zone, category),
        deviation,
    }]
}

/// Walk `fallbacks` in order and return the first non-empty candidate list
/// with the policy that produced it.  `None` when every policy fails.
pub fn resolve_empty(
    feas: &ZoneFeasibility<'_>,
    origin: ZoneId,
    activity: &Activity,
    category: &Category,
    tolerance: f64,
    fallbacks: &[ZoneFallback],
) -> Option<(Vec<Candidate>, ZoneFallback)> {
    for &fb in fallbacks {
        let found = match fb {
            ZoneFallback::ClosestToReported => closest_to_reported(feas, origin, activity, category),
            ZoneFallback::RelaxCategory => relax_category(feas, origin, activity, category, tolerance),
            ZoneFallback::NearestWithPoi => nearest_with_poi(feas, origin, activity, category),
        };
        if !found.is_empty() {
            debug!("{}: empty feasible set for {category} resolved by {}", activity.id, fb.as_str());
            return Some((found, fb));
        }
    }
    None
}
