//! Observed origin-destination commuting flows.
//!
//! Census commuting tables are published either per zone or only at a
//! coarser aggregate geography.  [`CommuteLevel`] says which; the matrix is
//! keyed by area code at that level, and [`OdMatrix::area_of`] maps a zone to
//! the key to use.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use ab_core::ZoneId;

use crate::{SpatialError, SpatialResult, ZoneIndex};

/// The geography observed flows are published at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommuteLevel {
    /// Keyed by zone code.
    #[default]
    Zone,
    /// Keyed by the zone's parent-area code.
    Aggregate,
}

/// Observed commuter counts between areas.
#[derive(Clone, Debug, Default)]
pub struct OdMatrix {
    level: CommuteLevel,
    flows: FxHashMap<String, BTreeMap<String, f64>>,
}

impl OdMatrix {
    pub fn new(level: CommuteLevel) -> Self {
        Self { level, flows: FxHashMap::default() }
    }

    pub fn level(&self) -> CommuteLevel {
        self.level
    }

    /// Add `count` commuters from `origin` to `destination` (area codes).
    /// Repeated pairs accumulate.
    pub fn add(&mut self, origin: &str, destination: &str, count: f64) -> SpatialResult<()> {
        if !count.is_finite() || count < 0.0 {
            return Err(SpatialError::InvalidValue(format!(
                "flow {count} from {origin:?} to {destination:?}"
            )));
        }
        *self
            .flows
            .entry(origin.trim().to_string())
            .or_default()
            .entry(destination.trim().to_string())
            .or_insert(0.0) += count;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Area key of `zone` at this matrix's level.  `None` for an unknown
    /// zone, or an aggregate-level matrix and a zone with no parent.
    pub fn area_of<'z>(&self, zones: &'z ZoneIndex, zone: ZoneId) -> Option<&'z str> {
        let z = zones.get(zone)?;
        match self.level {
            CommuteLevel::Zone      => Some(z.code.as_str()),
            CommuteLevel::Aggregate => z.parent.as_deref(),
        }
    }

    /// Observed count between two areas (0 when absent).
    pub fn flow(&self, origin: &str, destination: &str) -> f64 {
        self.flows
            .get(origin)
            .and_then(|row| row.get(destination))
            .copied()
            .unwrap_or(0.0)
    }

    /// All observed destinations of `origin`, ascending by area code.
    pub fn flows_from<'a>(&'a self, origin: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.flows
            .get(origin)
            .into_iter()
            .flat_map(|row| row.iter().map(|(d, &c)| (d.as_str(), c)))
    }

    /// Total observed outflow of `origin`.
    pub fn total_from(&self, origin: &str) -> f64 {
        self.flows_from(origin).map(|(_, c)| c).sum()
    }
}
