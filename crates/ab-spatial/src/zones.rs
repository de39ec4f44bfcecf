//! Zone table and spatial index.
//!
//! Zones arrive with external string codes (census output areas and the
//! like).  [`ZoneIndexBuilder`] assigns each a dense [`ZoneId`] in insertion
//! order so every other structure can index by integer.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over zone centroids in `[lat, lon]` space answers
//! nearest-zone queries.  Distances inside the tree are squared degrees, which
//! is fine for ordering candidates within a region; anything reported to a
//! caller is recomputed with [`GeoPoint::distance_m`].

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ab_core::{GeoPoint, ZoneId};

use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct ZoneEntry {
    point: [f64; 2], // [lat, lon]
    id: ZoneId,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ZoneEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Zone ──────────────────────────────────────────────────────────────────────

/// One areal unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub id: ZoneId,
    /// External code as it appears in input files.
    pub code: String,
    pub centroid: GeoPoint,
    /// Code of the enclosing aggregate area, used when observed commuting
    /// flows are only published at a coarser level.
    pub parent: Option<String>,
}

// ── ZoneIndex ─────────────────────────────────────────────────────────────────

/// All zones of the study area, indexed by id, by code and by location.
///
/// Do not construct directly; use [`ZoneIndexBuilder`].
pub struct ZoneIndex {
    zones: Vec<Zone>,
    by_code: FxHashMap<String, ZoneId>,
    spatial_idx: RTree<ZoneEntry>,
}

impl ZoneIndex {
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.index())
    }

    /// Like [`get`](Self::get) but returns an error for unknown ids.
    pub fn zone(&self, id: ZoneId) -> SpatialResult<&Zone> {
        self.get(id).ok_or(SpatialError::ZoneNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.iter().map(|z| z.id)
    }

    /// Map an external code to its dense id.
    pub fn id_for_code(&self, code: &str) -> Option<ZoneId> {
        self.by_code.get(code.trim()).copied()
    }

    /// Like [`id_for_code`](Self::id_for_code) but an unknown code is an error.
    pub fn resolve(&self, code: &str) -> SpatialResult<ZoneId> {
        self.id_for_code(code)
            .ok_or_else(|| SpatialError::UnknownZoneCode(code.trim().to_string()))
    }

    /// Centroid of `id`, or `None` for an unknown id.
    #[inline]
    pub fn centroid(&self, id: ZoneId) -> Option<GeoPoint> {
        self.get(id).map(|z| z.centroid)
    }

    /// Straight-line distance between two zone centroids in metres.
    pub fn crow_fly_m(&self, from: ZoneId, to: ZoneId) -> SpatialResult<f64> {
        let a = self.zone(from)?.centroid;
        let b = self.zone(to)?.centroid;
        Ok(a.distance_m(b))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The zone whose centroid is nearest to `pos`.  `None` only when the
    /// index is empty.
    pub fn nearest(&self, pos: GeoPoint) -> Option<ZoneId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// All zones, nearest centroid first.  Lazy: stop iterating as soon as
    /// a suitable zone is found.
    pub fn nearest_iter(&self, pos: GeoPoint) -> impl Iterator<Item = ZoneId> + '_ {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// The `k` zones nearest to `zone`, excluding `zone` itself.
    pub fn neighbours(&self, zone: ZoneId, k: usize) -> Vec<ZoneId> {
        let Some(centroid) = self.centroid(zone) else {
            return Vec::new();
        };
        self.nearest_iter(centroid)
            .filter(|&z| z != zone)
            .take(k)
            .collect()
    }
}

// ── ZoneIndexBuilder ──────────────────────────────────────────────────────────

/// Incrementally collects zones, then builds the index.
///
/// ```rust,ignore
/// let mut b = ZoneIndexBuilder::new();
/// let a = b.add_zone("E00000001", GeoPoint::new(53.80, -1.55), Some("E02000001"))?;
/// let zones = b.build();
/// ```
#[derive(Default)]
pub struct ZoneIndexBuilder {
    zones: Vec<Zone>,
    by_code: FxHashMap<String, ZoneId>,
}

impl ZoneIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            zones:   Vec::with_capacity(n),
            by_code: FxHashMap::with_capacity_and_hasher(n, Default::default()),
        }
    }

    /// Add a zone and return its assigned `ZoneId`.  Duplicate codes are
    /// rejected.
    pub fn add_zone(
        &mut self,
        code: &str,
        centroid: GeoPoint,
        parent: Option<&str>,
    ) -> SpatialResult<ZoneId> {
        let code = code.trim();
        if self.by_code.contains_key(code) {
            return Err(SpatialError::DuplicateZoneCode(code.to_string()));
        }
        let id = ZoneId(self.zones.len() as u32);
        self.zones.push(Zone {
            id,
            code: code.to_string(),
            centroid,
            parent: parent
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        });
        self.by_code.insert(code.to_string(), id);
        Ok(id)
    }

    pub fn build(self) -> ZoneIndex {
        let entries: Vec<ZoneEntry> = self
            .zones
            .iter()
            .map(|z| ZoneEntry { point: [z.centroid.lat, z.centroid.lon], id: z.id })
            .collect();

        ZoneIndex {
            zones:       self.zones,
            by_code:     self.by_code,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}
