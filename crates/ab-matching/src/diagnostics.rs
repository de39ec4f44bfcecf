//! Per-unit matching outcomes that are recorded rather than raised.

use std::fmt;

use ab_core::{HouseholdId, PersonId};

use crate::IndividualRelaxation;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchDiagnostic {
    /// No diary household matched even on the required attributes alone.
    /// The household is excluded from later stages.
    UnmatchedHousehold { household: HouseholdId },
    /// Matched only after dropping optional attributes.
    RelaxedHousehold { household: HouseholdId, level: usize, dropped: Vec<String> },
    /// Paired with a diary member under a widened criterion.
    RelaxedIndividual { person: PersonId, relaxation: IndividualRelaxation },
    /// Paired against the whole diary sample after the household draw ran out.
    GlobalIndividual { person: PersonId },
    /// No diary member could be paired.  The person gets no activity chain.
    UnmatchedIndividual { person: PersonId, household: HouseholdId },
}

impl MatchDiagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            MatchDiagnostic::UnmatchedHousehold { .. }  => "unmatched_household",
            MatchDiagnostic::RelaxedHousehold { .. }    => "relaxed_household",
            MatchDiagnostic::RelaxedIndividual { .. }   => "relaxed_individual",
            MatchDiagnostic::GlobalIndividual { .. }    => "global_individual",
            MatchDiagnostic::UnmatchedIndividual { .. } => "unmatched_individual",
        }
    }

    /// The household or person the record is about.
    pub fn unit(&self) -> String {
        match self {
            MatchDiagnostic::UnmatchedHousehold { household }
            | MatchDiagnostic::RelaxedHousehold { household, .. } => household.to_string(),
            MatchDiagnostic::RelaxedIndividual { person, .. }
            | MatchDiagnostic::GlobalIndividual { person }
            | MatchDiagnostic::UnmatchedIndividual { person, .. } => person.to_string(),
        }
    }
}

impl fmt::Display for MatchDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchDiagnostic::UnmatchedHousehold { .. } => {
                write!(f, "no diary household on required attributes")
            }
            MatchDiagnostic::RelaxedHousehold { level, dropped, .. } => {
                write!(f, "level {level}, dropped [{}]", dropped.join(", "))
            }
            MatchDiagnostic::RelaxedIndividual { relaxation, .. } => write!(f, "{relaxation:?}"),
            MatchDiagnostic::GlobalIndividual { .. } => write!(f, "matched against full sample"),
            MatchDiagnostic::UnmatchedIndividual { household, .. } => {
                write!(f, "no diary member left in draw for {household}")
            }
        }
    }
}

/// All matching diagnostics of a run, in household order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchDiagnostics {
    pub records: Vec<MatchDiagnostic>,
}

impl MatchDiagnostics {
    pub fn push(&mut self, d: MatchDiagnostic) {
        self.records.push(d);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.records.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn unmatched_households(&self) -> impl Iterator<Item = HouseholdId> + '_ {
        self.records.iter().filter_map(|d| match d {
            MatchDiagnostic::UnmatchedHousehold { household } => Some(*household),
            _ => None,
        })
    }
}
