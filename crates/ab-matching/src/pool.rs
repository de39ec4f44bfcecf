//! Remove-on-match candidate pool for one household draw.

use ab_core::DiaryPersonId;
use ab_population::{AgeBand, DiarySample, Sex};

/// A diary member still available in the current draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    pub id: DiaryPersonId,
    pub band: AgeBand,
    pub sex: Sex,
}

/// The members of one diary household not yet paired with a synthetic
/// individual.
///
/// The pool is owned by the caller and passed by `&mut` into each matching
/// step, so "without replacement" is a property of this value rather than of
/// any shared state.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    entries: Vec<PoolEntry>,
}

impl CandidatePool {
    pub fn new(mut entries: Vec<PoolEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        Self { entries }
    }

    /// Pool of all members of a diary household.
    pub fn for_household(diary: &DiarySample, household: ab_core::DiaryHouseholdId) -> Self {
        let entries = diary
            .household(household)
            .map(|hh| {
                diary
                    .members(hh)
                    .map(|p| PoolEntry { id: p.id, band: p.age_band(), sex: p.sex })
                    .collect()
            })
            .unwrap_or_default();
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: DiaryPersonId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// The best remaining entry within `max_band_distance` of `band` (and of
    /// the same `sex` when given): closest band first, then lowest id.
    pub fn best(&self, band: AgeBand, sex: Option<Sex>, max_band_distance: u8) -> Option<PoolEntry> {
        self.entries
            .iter()
            .filter(|e| sex.is_none_or(|s| e.sex == s))
            .filter(|e| e.band.distance(band) <= max_band_distance)
            .min_by_key(|e| (e.band.distance(band), e.id))
            .copied()
    }

    /// Remove and return `id`.  `None` if it was already taken.
    pub fn take(&mut self, id: DiaryPersonId) -> Option<PoolEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }
}
