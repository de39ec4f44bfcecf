//! Matching configuration.

use crate::{MatchError, MatchResult};

/// One step of the individual-tier fallback order.  Steps are cumulative:
/// `IgnoreSex` after `WidenAgeBand(2)` allows any sex within two bands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndividualRelaxation {
    /// Accept diary members up to `n` age bands away.
    WidenAgeBand(u8),
    /// Stop requiring the same sex.
    IgnoreSex,
    /// Accept any remaining member regardless of age band.
    AnyAge,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchingConfig {
    /// Household attributes that must always match exactly.
    pub required: Vec<String>,
    /// Household attributes matched while possible, most important first.
    /// Relaxation drops them from the end.
    pub optional: Vec<String>,
    /// Cap on the diary households considered per synthetic household.
    /// `None` keeps every candidate.
    pub n_matches: Option<usize>,
    /// Keep relaxing after the first non-empty level until `n_matches`
    /// candidates are collected.
    pub fill_to_n_matches: bool,
    /// Individual-tier fallback order after the exact (same band, same sex)
    /// level.
    pub individual_relaxation: Vec<IndividualRelaxation>,
    /// Match individuals left over after the household draw against the
    /// whole diary sample on age band and sex, with replacement.
    pub match_remaining_globally: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            required:  vec!["num_adults".into(), "num_children".into()],
            optional:  vec![
                "num_pension_age".into(),
                "num_cars".into(),
                "tenure".into(),
                "rural_urban".into(),
            ],
            n_matches:                Some(10),
            fill_to_n_matches:        false,
            individual_relaxation:    vec![
                IndividualRelaxation::WidenAgeBand(1),
                IndividualRelaxation::WidenAgeBand(2),
                IndividualRelaxation::IgnoreSex,
            ],
            match_remaining_globally: false,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> MatchResult<()> {
        if self.n_matches == Some(0) {
            return Err(MatchError::Config("n_matches must be at least 1".into()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for col in self.required.iter().chain(&self.optional) {
            if col.trim().is_empty() {
                return Err(MatchError::Config("empty matching column name".into()));
            }
            if !seen.insert(col.as_str()) {
                return Err(MatchError::Config(format!("matching column {col:?} listed twice")));
            }
        }
        Ok(())
    }

    /// Columns used at relaxation `level` (0 = all optional columns kept).
    pub fn columns_at(&self, level: usize) -> Vec<&str> {
        let keep = self.optional.len().saturating_sub(level);
        self.required
            .iter()
            .chain(self.optional.iter().take(keep))
            .map(String::as_str)
            .collect()
    }

    /// Number of household levels, from all columns down to required only.
    pub fn level_count(&self) -> usize {
        self.optional.len() + 1
    }
}
