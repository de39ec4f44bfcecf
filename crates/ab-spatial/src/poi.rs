//! Points of interest by zone and category.
//!
//! Each facility may carry several categories (a building can be both `shop`
//! and `work`); it is listed under every one of them.  Per (zone, category)
//! the index keeps a [`PoiSummary`] so feasibility checks and floor-area
//! weights are a single hash lookup.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use ab_core::{Category, FacilityId, GeoPoint, ZoneId};

use crate::{SpatialError, SpatialResult};

/// One point facility.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facility {
    pub id: FacilityId,
    pub zone: ZoneId,
    pub location: GeoPoint,
    /// Gross floor area in m², when known.
    pub floor_area: Option<f64>,
    pub categories: Vec<Category>,
}

impl Facility {
    /// Floor area, treating "unknown" as zero.
    #[inline]
    pub fn floor_area_or_zero(&self) -> f64 {
        self.floor_area.unwrap_or(0.0)
    }
}

/// Aggregate of all facilities of one category inside one zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoiSummary {
    pub count: usize,
    pub total_floor_area: f64,
    pub facilities: Vec<FacilityId>,
}

// ── PoiIndex ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PoiIndex {
    facilities: Vec<Facility>,
    by_zone_cat: FxHashMap<(ZoneId, Category), PoiSummary>,
    zones_by_cat: FxHashMap<Category, BTreeSet<ZoneId>>,
    by_zone: FxHashMap<ZoneId, Vec<FacilityId>>,
}

impl PoiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a facility and return its id.  Floor areas must be finite and
    /// non-negative; categories must be non-empty.
    pub fn insert(
        &mut self,
        zone: ZoneId,
        location: GeoPoint,
        floor_area: Option<f64>,
        categories: Vec<Category>,
    ) -> SpatialResult<FacilityId> {
        if let Some(a) = floor_area {
            if !a.is_finite() || a < 0.0 {
                return Err(SpatialError::InvalidValue(format!("floor area {a}")));
            }
        }
        if categories.is_empty() {
            return Err(SpatialError::InvalidValue("facility with no category".into()));
        }

        let id = FacilityId(self.facilities.len() as u32);
        for cat in &categories {
            let s = self.by_zone_cat.entry((zone, cat.clone())).or_default();
            s.count += 1;
            s.total_floor_area += floor_area.unwrap_or(0.0);
            s.facilities.push(id);
            self.zones_by_cat.entry(cat.clone()).or_default().insert(zone);
        }
        self.by_zone.entry(zone).or_default().push(id);
        self.facilities.push(Facility { id, zone, location, floor_area, categories });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    #[inline]
    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.get(id.index())
    }

    pub fn summary(&self, zone: ZoneId, category: &Category) -> Option<&PoiSummary> {
        self.by_zone_cat.get(&(zone, category.clone()))
    }

    /// `true` if `zone` holds at least one facility of `category`.
    #[inline]
    pub fn has(&self, zone: ZoneId, category: &Category) -> bool {
        self.summary(zone, category).is_some_and(|s| s.count > 0)
    }

    /// Total floor area of `category` in `zone` (0 when absent).
    pub fn floor_area(&self, zone: ZoneId, category: &Category) -> f64 {
        self.summary(zone, category).map_or(0.0, |s| s.total_floor_area)
    }

    /// Facilities of `category` in `zone`, in insertion order.
    pub fn facilities_in<'a>(
        &'a self,
        zone: ZoneId,
        category: &Category,
    ) -> impl Iterator<Item = &'a Facility> + 'a {
        self.summary(zone, category)
            .into_iter()
            .flat_map(|s| s.facilities.iter())
            .filter_map(|&id| self.facility(id))
    }

    /// Every facility in `zone` whatever its category, in insertion order.
    pub fn facilities_in_zone(&self, zone: ZoneId) -> impl Iterator<Item = &Facility> + '_ {
        self.by_zone
            .get(&zone)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|&id| self.facility(id))
    }

    /// Zones holding at least one facility of `category`, ascending by id.
    pub fn zones_with<'a>(&'a self, category: &Category) -> impl Iterator<Item = ZoneId> + 'a {
        self.zones_by_cat
            .get(category)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Indexed categories that are `category` or one of its children, sorted.
    pub fn categories_within(&self, category: &Category) -> Vec<Category> {
        let mut out: Vec<Category> = self
            .zones_by_cat
            .keys()
            .filter(|c| c.is_within(category))
            .cloned()
            .collect();
        out.sort();
        out
    }
}
