//! Discretionary activities placed between fixed anchors.
//!
//! Anchors are the home zone and every primary activity that already has a
//! zone.  Each run of discretionary activities between two anchors is
//! walked in chain order.  For the activity at position `i`, coming from
//! `cur` (the previous anchor or the zone just chosen):
//!
//! - the last activity of a run must satisfy
//!   `time(cur, z) + time(z, next) ≤ (t_in + t_out) · (1 + slack)`, where
//!   `t_in` and `t_out` are the reported times of the arriving and leaving
//!   trips and `next` the following anchor;
//! - any earlier activity only needs `time(cur, z) ≤ t_in · (1 + slack)`.
//!
//! Among reachable zones with the required POI category, zone `z` is drawn
//! with weight `floor_area(z) / max(distance(cur, z), min_distance)^power`.
//! When nothing is reachable the time budget is dropped and the draw is
//! repeated over every zone with the category.

use log::debug;

use ab_core::{Category, Purpose, Stream, UnitRng, ZoneId};
use ab_population::{Activity, ActivityChain, AgeBand};

use crate::{
    AssignDiagnostic, AssignMethod, CategoryMap, SecondaryConfig, ZoneAssignment, ZoneFeasibility,
    ZoneMap,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecondaryOutcome {
    /// One per discretionary activity, in chain order.
    pub assignments: Vec<ZoneAssignment>,
    pub diagnostics: Vec<AssignDiagnostic>,
}

/// Zone of `activity` if it is an anchor.
fn anchor_zone(chain: &ActivityChain, activity: &Activity, anchors: &ZoneMap) -> Option<ZoneId> {
    match activity.purpose {
        Purpose::Home => Some(chain.home_zone),
        Purpose::Work | Purpose::Education => anchors.get(&activity.id).and_then(|a| a.zone),
        _ => None,
    }
}

/// Minutes between two zones: the matrix when it covers the pair,
/// otherwise estimated distance at the mode's speed.
fn leg_minutes(feas: &ZoneFeasibility<'_>, from: ZoneId, to: ZoneId, activity: &Activity) -> f64 {
    feas.travel
        .and_then(|t| t.minutes(from, to, activity.mode, activity.day, activity.time))
        .or_else(|| {
            feas.estimated_distance_m(from, to)
                .map(|d| activity.mode.minutes_for_distance(d))
        })
        .unwrap_or(f64::INFINITY)
}

/// Time limit for one activity of a run.
struct Budget<'c> {
    /// Leg time limit, or `None` when the arriving trip has no reported time.
    limit: Option<f64>,
    /// Following anchor and the activity whose trip leaves for it, when this
    /// is the last activity of a run.
    onward: Option<(ZoneId, &'c Activity)>,
}

impl Budget<'_> {
    fn admits(&self, feas: &ZoneFeasibility<'_>, cur: ZoneId, z: ZoneId, activity: &Activity) -> bool {
        let Some(limit) = self.limit else {
            return true;
        };
        let mut t = leg_minutes(feas, cur, z, activity);
        if let Some((next, leaving)) = self.onward {
            t += leg_minutes(feas, z, next, leaving);
        }
        t <= limit
    }
}

/// Draw one zone by gravity weight.  `None` only when `zones` is empty.
fn gravity_draw(
    feas: &ZoneFeasibility<'_>,
    cur: ZoneId,
    zones: &[ZoneId],
    category: &Category,
    config: &SecondaryConfig,
    rng: &mut UnitRng,
) -> Option<ZoneId> {
    if zones.is_empty() {
        return None;
    }
    let weights: Vec<f64> = zones
        .iter()
        .map(|&z| {
            let d = feas
                .estimated_distance_m(cur, z)
                .unwrap_or(f64::INFINITY)
                .max(config.min_distance_m);
            feas.pois.floor_area(z, category) / d.powf(config.visit_probability_power)
        })
        .collect();
    let idx = rng
        .choose_weighted_index(&weights)
        .unwrap_or_else(|| rng.gen_range(0..zones.len()));
    Some(zones[idx])
}

/// Place every discretionary activity of `chain`.  `anchors` must hold the
/// zone decisions for its work and education activities.
pub fn assign_secondary(
    feas: &ZoneFeasibility<'_>,
    chain: &ActivityChain,
    anchors: &ZoneMap,
    band: AgeBand,
    categories: &CategoryMap,
    config: &SecondaryConfig,
    seed: u64,
) -> SecondaryOutcome {
    let mut out = SecondaryOutcome::default();
    let acts = &chain.activities;
    let mut cur = chain.home_zone;

    for (i, activity) in acts.iter().enumerate() {
        if activity.purpose.is_primary() {
            if let Some(z) = anchor_zone(chain, activity, anchors) {
                cur = z;
            }
            continue;
        }

        let Some(category) = categories.category_for(activity.purpose, band) else {
            out.assignments.push(ZoneAssignment::unassigned(activity.id));
            out.diagnostics.push(AssignDiagnostic::Unassigned {
                activity: activity.id,
                reason: format!("no category for {}", activity.purpose),
            });
            continue;
        };

        // Next activity, and whether it closes the run.
        let onward = acts.get(i + 1).and_then(|next| {
            anchor_zone(chain, next, anchors).map(|z| (z, next))
        });
        let last_in_run = acts.get(i + 1).is_none_or(|n| n.purpose.is_primary());
        let slack = 1.0 + config.time_slack;
        let budget = match (activity.travel_minutes, onward, last_in_run) {
            (None, _, _) => Budget { limit: None, onward: None },
            (Some(t_in), Some((z, next)), true) => match next.travel_minutes {
                Some(t_out) => Budget { limit: Some((t_in + t_out) * slack), onward: Some((z, next)) },
                None => Budget { limit: Some(t_in * slack), onward: None },
            },
            (Some(t_in), _, _) => Budget { limit: Some(t_in * slack), onward: None },
        };

        let with_poi: Vec<ZoneId> = feas.pois.zones_with(category).collect();
        let reachable: Vec<ZoneId> = with_poi
            .iter()
            .copied()
            .filter(|&z| budget.admits(feas, cur, z, activity))
            .collect();

        let mut rng = UnitRng::new(seed, Stream::Secondary, activity.id.as_u64());
        let (chosen, method) = if reachable.is_empty() {
            let z = gravity_draw(feas, cur, &with_poi, category, config, &mut rng);
            if z.is_some() {
                debug!("{}: no {category} zone within budget, budget dropped", activity.id);
                out.diagnostics.push(AssignDiagnostic::SecondaryBudgetRelaxed { activity: activity.id });
            }
            (z, AssignMethod::GravityUnbounded)
        } else {
            (gravity_draw(feas, cur, &reachable, category, config, &mut rng), AssignMethod::Gravity)
        };

        match chosen {
            Some(z) => {
                out.assignments.push(ZoneAssignment::new(activity.id, z, method));
                cur = z;
            }
            None => {
                out.assignments.push(ZoneAssignment::unassigned(activity.id));
                out.diagnostics.push(AssignDiagnostic::Unassigned {
                    activity: activity.id,
                    reason: format!("no zone with {category}"),
                });
            }
        }
    }
    out
}
