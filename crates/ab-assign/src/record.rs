//! Per-activity zone decisions.

use std::collections::BTreeMap;
use std::fmt;

use ab_core::{ActivityId, Purpose, ZoneId};
use ab_population::ActivityChain;

use crate::ZoneFallback;

/// How an activity's zone was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignMethod {
    /// The person's home zone.
    Home,
    /// From the feasible set (education: closest to the reported value).
    Feasible,
    /// Work: solved against observed flows.
    Optimised,
    /// Work: weighted by remaining observed flows.
    Iterative,
    /// Work: uniform among candidates for lack of observed flows.
    Uniform,
    /// Work: nearest candidate after an infeasible origin.
    Nearest,
    /// Secondary: gravity draw within the time budget.
    Gravity,
    /// Secondary: gravity draw after dropping the time budget.
    GravityUnbounded,
    /// A zone fallback produced the candidate.
    Fallback(ZoneFallback),
    /// Reuses the zone of the person's earlier activity of the same purpose.
    Repeat,
    Unassigned,
}

impl fmt::Display for AssignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignMethod::Home             => f.write_str("home"),
            AssignMethod::Feasible         => f.write_str("feasible"),
            AssignMethod::Optimised        => f.write_str("optimised"),
            AssignMethod::Iterative        => f.write_str("iterative"),
            AssignMethod::Uniform          => f.write_str("uniform"),
            AssignMethod::Nearest          => f.write_str("nearest"),
            AssignMethod::Gravity          => f.write_str("gravity"),
            AssignMethod::GravityUnbounded => f.write_str("gravity_unbounded"),
            AssignMethod::Fallback(fb)     => write!(f, "fallback:{}", fb.as_str()),
            AssignMethod::Repeat           => f.write_str("repeat"),
            AssignMethod::Unassigned       => f.write_str("unassigned"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneAssignment {
    pub activity: ActivityId,
    pub zone: Option<ZoneId>,
    pub method: AssignMethod,
}

impl ZoneAssignment {
    pub fn new(activity: ActivityId, zone: ZoneId, method: AssignMethod) -> Self {
        Self { activity, zone: Some(zone), method }
    }

    pub fn unassigned(activity: ActivityId) -> Self {
        Self { activity, zone: None, method: AssignMethod::Unassigned }
    }
}

/// Zone decisions so far, by activity.
pub type ZoneMap = BTreeMap<ActivityId, ZoneAssignment>;

/// Expand the decision for the first activity of `purpose` to every later
/// activity of the same purpose in `chain`, marked [`AssignMethod::Repeat`].
/// The first decision itself is included unchanged.
pub fn repeat_for_purpose(
    chain: &ActivityChain,
    purpose: Purpose,
    first: ZoneAssignment,
) -> Vec<ZoneAssignment> {
    chain
        .iter()
        .filter(|a| a.purpose == purpose)
        .map(|a| {
            if a.id == first.activity {
                first
            } else if first.zone.is_none() {
                ZoneAssignment::unassigned(a.id)
            } else {
                ZoneAssignment { activity: a.id, zone: first.zone, method: AssignMethod::Repeat }
            }
        })
        .collect()
}
