//! Per-unit assignment outcomes that are recorded rather than raised.

use std::fmt;

use ab_core::{ActivityId, Category, PersonId, ZoneId};

use crate::{FacilityFallback, ZoneFallback};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignDiagnostic {
    /// No zone met the travel and POI constraints.  `fallback` is the policy
    /// that produced a zone, or `None` when every policy failed.
    EmptyFeasibleSet { activity: ActivityId, category: Category, fallback: Option<ZoneFallback> },
    /// A work person with no feasible destination was placed outside the
    /// origin's flow problem.
    RelaxedToNearest { person: PersonId, activity: ActivityId },
    /// The solver could not solve an origin; everyone there took their
    /// nearest candidate.
    InfeasibleSubproblem { origin: String, persons: usize, reason: String },
    /// The solver hit its time limit; the best solution found was used.
    SolverTimeLimit { origin: String, persons: usize, seconds: f64 },
    /// An origin too large for the solver used the iterative weighted draw.
    IterativeFallback { origin: String, persons: usize, variables: usize },
    /// No observed commuting flows from an origin; candidates drawn uniformly.
    NoObservedFlows { origin: String, persons: usize },
    /// No zone fitted the secondary time budget; the budget was dropped.
    SecondaryBudgetRelaxed { activity: ActivityId },
    /// No zone could be assigned at all.
    Unassigned { activity: ActivityId, reason: String },
    /// The facility came from a fallback policy.
    FacilityFallback { activity: ActivityId, fallback: FacilityFallback },
    /// The zone kept, but no facility could be found.
    NoFacility { activity: ActivityId, zone: ZoneId, category: Category },
}

impl AssignDiagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            AssignDiagnostic::EmptyFeasibleSet { .. }       => "empty_feasible_set",
            AssignDiagnostic::RelaxedToNearest { .. }       => "relaxed_to_nearest",
            AssignDiagnostic::InfeasibleSubproblem { .. }   => "infeasible_subproblem",
            AssignDiagnostic::SolverTimeLimit { .. }        => "solver_time_limit",
            AssignDiagnostic::IterativeFallback { .. }      => "iterative_fallback",
            AssignDiagnostic::NoObservedFlows { .. }        => "no_observed_flows",
            AssignDiagnostic::SecondaryBudgetRelaxed { .. } => "secondary_budget_relaxed",
            AssignDiagnostic::Unassigned { .. }             => "unassigned",
            AssignDiagnostic::FacilityFallback { .. }       => "facility_fallback",
            AssignDiagnostic::NoFacility { .. }             => "no_facility",
        }
    }

    /// The activity, person or origin the record is about.
    pub fn unit(&self) -> String {
        match self {
            AssignDiagnostic::EmptyFeasibleSet { activity, .. }
            | AssignDiagnostic::SecondaryBudgetRelaxed { activity }
            | AssignDiagnostic::Unassigned { activity, .. }
            | AssignDiagnostic::FacilityFallback { activity, .. }
            | AssignDiagnostic::NoFacility { activity, .. } => activity.to_string(),
            AssignDiagnostic::RelaxedToNearest { person, .. } => person.to_string(),
            AssignDiagnostic::InfeasibleSubproblem { origin, .. }
            | AssignDiagnostic::SolverTimeLimit { origin, .. }
            | AssignDiagnostic::IterativeFallback { origin, .. }
            | AssignDiagnostic::NoObservedFlows { origin, .. } => origin.clone(),
        }
    }
}

impl fmt::Display for AssignDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignDiagnostic::EmptyFeasibleSet { category, fallback, .. } => match fallback {
                Some(fb) => write!(f, "{category}: resolved by {}", fb.as_str()),
                None     => write!(f, "{category}: no fallback succeeded"),
            },
            AssignDiagnostic::RelaxedToNearest { activity, .. } => {
                write!(f, "{activity} has no feasible work zone")
            }
            AssignDiagnostic::InfeasibleSubproblem { persons, reason, .. } => {
                write!(f, "{persons} persons: {reason}")
            }
            AssignDiagnostic::SolverTimeLimit { persons, seconds, .. } => {
                write!(f, "{persons} persons, stopped after {seconds:.3}s")
            }
            AssignDiagnostic::IterativeFallback { persons, variables, .. } => {
                write!(f, "{persons} persons, {variables} variables")
            }
            AssignDiagnostic::NoObservedFlows { persons, .. } => write!(f, "{persons} persons"),
            AssignDiagnostic::SecondaryBudgetRelaxed { .. } => f.write_str("no zone within time budget"),
            AssignDiagnostic::Unassigned { reason, .. } => f.write_str(reason),
            AssignDiagnostic::FacilityFallback { fallback, .. } => f.write_str(fallback.as_str()),
            AssignDiagnostic::NoFacility { zone, category, .. } => write!(f, "{category} in {zone}"),
        }
    }
}
