//! Point facility selection inside an assigned zone.

use log::debug;

use ab_core::{ActivityId, Category, FacilityId, Stream, UnitRng, ZoneId};
use ab_spatial::{Facility, PoiIndex, ZoneIndex};

use crate::{AssignDiagnostic, FacilityConfig, FacilityFallback, FacilityMode};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FacilityOutcome {
    pub facility: Option<FacilityId>,
    /// The fallback that produced the pool, if any.
    pub fallback: Option<FacilityFallback>,
    pub diagnostic: Option<AssignDiagnostic>,
}

/// Samples one facility per activity.
///
/// Every draw uses its own [`UnitRng`] keyed by the activity id, so results
/// do not depend on the order activities are processed in.
#[derive(Clone, Copy)]
pub struct FacilitySampler<'a> {
    pub zones: &'a ZoneIndex,
    pub pois: &'a PoiIndex,
    pub config: &'a FacilityConfig,
}

impl<'a> FacilitySampler<'a> {
    pub fn new(zones: &'a ZoneIndex, pois: &'a PoiIndex, config: &'a FacilityConfig) -> Self {
        Self { zones, pois, config }
    }

    /// Facilities of `category` in `zone`.
    fn pool(&self, zone: ZoneId, category: &Category) -> Vec<&'a Facility> {
        self.pois.facilities_in(zone, category).collect()
    }

    fn fallback_pool(&self, fb: FacilityFallback, zone: ZoneId, category: &Category) -> Vec<&'a Facility> {
        let mut pool: Vec<&Facility> = match fb {
            FacilityFallback::FallbackCategory => {
                let parent = category.parent().unwrap_or_else(|| category.clone());
                self.pois
                    .categories_within(&parent)
                    .iter()
                    .filter(|c| *c != category)
                    .flat_map(|c| self.pool(zone, c))
                    .collect()
            }
            FacilityFallback::NeighbouringZones(k) => self
                .zones
                .neighbours(zone, k)
                .into_iter()
                .flat_map(|z| self.pool(z, category))
                .collect(),
            FacilityFallback::AnyInZone => self.pois.facilities_in_zone(zone).collect(),
        };
        pool.sort_by_key(|f| f.id);
        pool.dedup_by_key(|f| f.id);
        pool
    }

    fn draw(&self, pool: &[&Facility], rng: &mut UnitRng) -> Option<FacilityId> {
        if pool.is_empty() {
            return None;
        }
        let weighted = match self.config.mode {
            FacilityMode::FloorArea => {
                let weights: Vec<f64> = pool.iter().map(|f| f.floor_area_or_zero()).collect();
                rng.choose_weighted_index(&weights)
            }
            FacilityMode::Uniform => None,
        };
        let idx = weighted.unwrap_or_else(|| rng.gen_range(0..pool.len()));
        Some(pool[idx].id)
    }

    /// Pick a facility of `category` in `zone` for `activity`, walking the
    /// configured fallbacks when the zone has none.
    pub fn sample(&self, activity: ActivityId, zone: ZoneId, category: &Category, seed: u64) -> FacilityOutcome {
        let mut rng = UnitRng::new(seed, Stream::Facility, activity.as_u64());

        let pool = self.pool(zone, category);
        if let Some(id) = self.draw(&pool, &mut rng) {
            return FacilityOutcome { facility: Some(id), ..Default::default() };
        }

        for &fb in &self.config.fallbacks {
            let pool = self.fallback_pool(fb, zone, category);
            if let Some(id) = self.draw(&pool, &mut rng) {
                debug!("{activity}: facility from {}", fb.as_str());
                return FacilityOutcome {
                    facility:   Some(id),
                    fallback:   Some(fb),
                    diagnostic: Some(AssignDiagnostic::FacilityFallback { activity, fallback: fb }),
                };
            }
        }

        FacilityOutcome {
            facility:   None,
            fallback:   None,
            diagnostic: Some(AssignDiagnostic::NoFacility { activity, zone, category: category.clone() }),
        }
    }
}
