//! Exact categorical lookup of diary households.
//!
//! One hash index per relaxation level, keyed by the tuple of attribute
//! values used at that level.  Building all levels up front makes each
//! household lookup a handful of hash probes instead of a scan of the diary.

use rustc_hash::FxHashMap;

use ab_core::DiaryHouseholdId;
use ab_population::{Attributes, DiarySample};

use crate::MatchingConfig;

type LevelKey = Vec<String>;

/// Attribute values for `columns`, or `None` if any is missing.
fn key_for(attributes: &Attributes, columns: &[&str]) -> Option<LevelKey> {
    columns
        .iter()
        .map(|c| attributes.get(*c).cloned())
        .collect()
}

pub struct HouseholdIndex {
    columns: Vec<Vec<String>>,
    levels: Vec<FxHashMap<LevelKey, Vec<DiaryHouseholdId>>>,
}

impl HouseholdIndex {
    /// Index every diary household at every level of `config`.  Diary
    /// households lacking a column are left out of the levels using it.
    pub fn build(config: &MatchingConfig, diary: &DiarySample) -> Self {
        let mut columns = Vec::with_capacity(config.level_count());
        let mut levels = Vec::with_capacity(config.level_count());

        for level in 0..config.level_count() {
            let cols = config.columns_at(level);
            let mut map: FxHashMap<LevelKey, Vec<DiaryHouseholdId>> = FxHashMap::default();
            for hh in diary.households() {
                if let Some(key) = key_for(&hh.attributes, &cols) {
                    map.entry(key).or_default().push(hh.id);
                }
            }
            columns.push(cols.into_iter().map(str::to_string).collect());
            levels.push(map);
        }

        HouseholdIndex { columns, levels }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Columns compared at `level`.
    pub fn columns(&self, level: usize) -> &[String] {
        self.columns.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Diary households matching `attributes` exactly at `level`, ascending
    /// by id.  Empty when the synthetic household lacks a column.
    pub fn candidates(&self, attributes: &Attributes, level: usize) -> &[DiaryHouseholdId] {
        let (Some(cols), Some(map)) = (self.columns.get(level), self.levels.get(level)) else {
            return &[];
        };
        let cols: Vec<&str> = cols.iter().map(String::as_str).collect();
        key_for(attributes, &cols)
            .and_then(|key| map.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
