//! Education zone selection.
//!
//! Deterministic.  The first education activity of a chain gets the
//! feasible zone closest to the reported time or distance (ties to the
//! larger floor area of matching POIs).  Later education activities in the
//! same chain reuse that zone.

use log::debug;

use ab_core::Purpose;
use ab_population::{ActivityChain, AgeBand};

use crate::policy::{by_closeness, resolve_empty};
use crate::record::repeat_for_purpose;
use crate::{
    AssignDiagnostic, AssignMethod, CategoryMap, FeasibilityConfig, ZoneAssignment,
    ZoneFeasibility,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EducationOutcome {
    /// One entry per education activity of the chain, in chain order.
    pub assignments: Vec<ZoneAssignment>,
    pub diagnostics: Vec<AssignDiagnostic>,
}

/// Assign every education activity of `chain`, travelling from the home
/// zone.  `band` selects the education tier.
pub fn assign_education(
    feas: &ZoneFeasibility<'_>,
    chain: &ActivityChain,
    band: AgeBand,
    categories: &CategoryMap,
    config: &FeasibilityConfig,
) -> EducationOutcome {
    let mut out = EducationOutcome::default();
    let Some(first) = chain.first_of(Purpose::Education) else {
        return out;
    };
    let category = categories.education.category_for(band);

    let set = feas.feasible(chain.home_zone, first, category, config.tolerance_edu);
    let chosen = if set.is_empty() {
        let resolved = resolve_empty(
            feas,
            chain.home_zone,
            first,
            category,
            config.tolerance_edu,
            &config.zone_fallbacks,
        );
        out.diagnostics.push(AssignDiagnostic::EmptyFeasibleSet {
            activity: first.id,
            category: category.clone(),
            fallback: resolved.as_ref().map(|(_, fb)| *fb),
        });
        resolved.and_then(|(candidates, fb)| {
            candidates.into_iter().min_by(by_closeness).map(|c| (c.zone, AssignMethod::Fallback(fb)))
        })
    } else {
        set.candidates
            .into_iter()
            .min_by(by_closeness)
            .map(|c| (c.zone, AssignMethod::Feasible))
    };

    let decision = match chosen {
        Some((zone, method)) => {
            debug!("{}: education zone {zone} ({method})", chain.person);
            ZoneAssignment::new(first.id, zone, method)
        }
        None => {
            out.diagnostics.push(AssignDiagnostic::Unassigned {
                activity: first.id,
                reason: format!("no zone with {category}"),
            });
            ZoneAssignment::unassigned(first.id)
        }
    };
    out.assignments = repeat_for_purpose(chain, Purpose::Education, decision);
    out
}
