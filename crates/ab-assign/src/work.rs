//! Work zone assignment against observed commuting flows.
//!
//! Work is assigned per origin rather than per person:
//!
//! 1. [`work_demand`] turns each chain's first work activity into a
//!    [`WorkDemand`] with its feasible candidates.  A person whose feasible
//!    set is empty is resolved on the spot through the zone fallbacks and
//!    never enters an origin problem.
//! 2. [`group_by_origin`] collects demands by the origin's OD area.
//! 3. [`solve_origin`] ranks each person's candidates by distance, keeps at
//!    most `max_zones`, and picks one of three paths:
//!
//! | Condition                               | Path                           |
//! |-----------------------------------------|--------------------------------|
//! | no observed outflow                     | uniform seeded choice          |
//! | more than `max_problem_size` variables  | iterative weighted draw        |
//! | otherwise                               | [`FlowProblem`] via `good_lp`  |
//!
//! Each solve runs under `solve_time_limit_s`.  When the limit cuts it short
//! the best integer solution found is kept; when there is none, or the solver
//! fails, everyone in the origin takes their nearest candidate.  Origins are independent, so they may be solved in parallel;
//! each draws from its own [`UnitRng`] stream.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use log::{debug, warn};
use rustc_hash::FxHasher;

use ab_core::{ActivityId, PersonId, Purpose, Stream, UnitRng, ZoneId};
use ab_population::ActivityChain;
use ab_spatial::{OdMatrix, ZoneIndex};

use crate::flow_problem::{FlowError, FlowGroup, FlowProblem, FlowSolution};
use crate::policy::{by_distance, resolve_empty};
use crate::record::repeat_for_purpose;
use crate::{
    AssignDiagnostic, AssignMethod, AssignResult, Candidate, CategoryMap, FeasibilityConfig,
    OriginFit, WorkConfig, WorkFit, ZoneAssignment, ZoneFeasibility,
};

// ── Demand ────────────────────────────────────────────────────────────────────

/// One person needing a work zone.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkDemand {
    pub person: PersonId,
    /// The chain's first work activity.
    pub activity: ActivityId,
    pub home_zone: ZoneId,
    /// Feasible destinations; never empty.
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WorkDemandOutcome {
    /// The chain has no work activity.
    NoWork,
    Demand(WorkDemand),
    /// The feasible set was empty and was resolved outside any origin
    /// problem.
    Resolved { assignment: ZoneAssignment, diagnostics: Vec<AssignDiagnostic> },
}

/// Feasible work destinations of `chain`, or the fallback decision when
/// there are none.
pub fn work_demand(
    feas: &ZoneFeasibility<'_>,
    chain: &ActivityChain,
    categories: &CategoryMap,
    config: &FeasibilityConfig,
) -> WorkDemandOutcome {
    let Some(activity) = chain.first_of(Purpose::Work) else {
        return WorkDemandOutcome::NoWork;
    };
    let category = &categories.work;
    let set = feas.feasible(chain.home_zone, activity, category, config.tolerance_work);
    if !set.is_empty() {
        return WorkDemandOutcome::Demand(WorkDemand {
            person: chain.person,
            activity: activity.id,
            home_zone: chain.home_zone,
            candidates: set.candidates,
        });
    }

    let resolved = resolve_empty(
        feas,
        chain.home_zone,
        activity,
        category,
        config.tolerance_work,
        &config.zone_fallbacks,
    );
    let mut diagnostics = vec![AssignDiagnostic::EmptyFeasibleSet {
        activity: activity.id,
        category: category.clone(),
        fallback: resolved.as_ref().map(|(_, fb)| *fb),
    }];
    let nearest = resolved.and_then(|(candidates, fb)| {
        candidates.into_iter().min_by(by_distance).map(|c| (c.zone, fb))
    });
    let assignment = match nearest {
        Some((zone, fb)) => {
            diagnostics.push(AssignDiagnostic::RelaxedToNearest {
                person: chain.person,
                activity: activity.id,
            });
            ZoneAssignment::new(activity.id, zone, AssignMethod::Fallback(fb))
        }
        None => {
            diagnostics.push(AssignDiagnostic::Unassigned {
                activity: activity.id,
                reason: format!("no zone with {category}"),
            });
            ZoneAssignment::unassigned(activity.id)
        }
    };
    WorkDemandOutcome::Resolved { assignment, diagnostics }
}

// ── Origins ───────────────────────────────────────────────────────────────────

/// Everyone commuting from one OD area.
#[derive(Clone, Debug, PartialEq)]
pub struct OriginProblem {
    /// OD area code of the home zones (the zone code itself when the zone
    /// has no area at the matrix's level).
    pub origin: String,
    /// Ascending by person.
    pub demands: Vec<WorkDemand>,
}

/// OD cell of `zone`, falling back to its own code.
fn cell_key(zones: &ZoneIndex, od: &OdMatrix, zone: ZoneId) -> String {
    match od.area_of(zones, zone) {
        Some(area) => area.to_string(),
        None => zones.get(zone).map(|z| z.code.clone()).unwrap_or_else(|| zone.to_string()),
    }
}

/// Group demands by origin area, ascending by origin code.
pub fn group_by_origin(demands: Vec<WorkDemand>, zones: &ZoneIndex, od: &OdMatrix) -> Vec<OriginProblem> {
    let mut by_origin: BTreeMap<String, Vec<WorkDemand>> = BTreeMap::new();
    for d in demands {
        by_origin.entry(cell_key(zones, od, d.home_zone)).or_default().push(d);
    }
    by_origin
        .into_iter()
        .map(|(origin, mut demands)| {
            demands.sort_by_key(|d| d.person);
            OriginProblem { origin, demands }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct OriginOutcome {
    /// One per demand, in demand order.
    pub assignments: Vec<ZoneAssignment>,
    pub diagnostics: Vec<AssignDiagnostic>,
    pub fit: OriginFit,
}

fn origin_unit(origin: &str) -> u64 {
    let mut h = FxHasher::default();
    origin.hash(&mut h);
    h.finish()
}

/// Assign every person of one origin.  A demand left with no candidate is
/// recorded as unassigned.
pub fn solve_origin(
    problem: &OriginProblem,
    zones: &ZoneIndex,
    od: &OdMatrix,
    config: &WorkConfig,
    seed: u64,
) -> OriginOutcome {
    let mut rng = UnitRng::new(seed, Stream::WorkAssignment, origin_unit(&problem.origin));
    let mut diagnostics = Vec::new();

    let ranked: Vec<Vec<ZoneId>> = problem
        .demands
        .iter()
        .map(|d| {
            let mut c = d.candidates.clone();
            c.sort_by(by_distance);
            c.truncate(config.max_zones.max(1));
            c.into_iter().map(|c| c.zone).collect()
        })
        .collect();
    let live: Vec<Vec<ZoneId>> = ranked.iter().filter(|r| !r.is_empty()).cloned().collect();
    let persons = live.len();

    let observed: BTreeMap<String, f64> = od
        .flows_from(&problem.origin)
        .filter(|(_, c)| *c > 0.0)
        .map(|(d, c)| (d.to_string(), c))
        .collect();

    let variables: usize = {
        let mut distinct: Vec<&Vec<ZoneId>> = live.iter().collect();
        distinct.sort();
        distinct.dedup();
        distinct.iter().map(|r| r.len()).sum()
    };

    let chosen: Vec<(ZoneId, AssignMethod)> = if persons == 0 {
        Vec::new()
    } else if observed.is_empty() {
        debug!("origin {}: no observed flows, {persons} persons drawn uniformly", problem.origin);
        diagnostics.push(AssignDiagnostic::NoObservedFlows {
            origin: problem.origin.clone(),
            persons,
        });
        live.iter()
            .map(|r| (*rng.choose(r).unwrap_or(&r[0]), AssignMethod::Uniform))
            .collect()
    } else if variables > config.max_problem_size {
        debug!(
            "origin {}: {variables} variables exceed {}, iterative draw",
            problem.origin, config.max_problem_size
        );
        diagnostics.push(AssignDiagnostic::IterativeFallback {
            origin: problem.origin.clone(),
            persons,
            variables,
        });
        iterative(&live, &observed, zones, od, &mut rng)
    } else {
        let limit = Duration::try_from_secs_f64(config.solve_time_limit_s).unwrap_or_default();
        match optimise(&live, &observed, zones, od, config, limit, &mut rng) {
            Ok((chosen, true)) => chosen,
            Ok((chosen, false)) => {
                debug!("origin {}: time limit reached, best solution kept", problem.origin);
                diagnostics.push(AssignDiagnostic::SolverTimeLimit {
                    origin: problem.origin.clone(),
                    persons,
                    seconds: limit.as_secs_f64(),
                });
                chosen
            }
            Err(reason) => {
                warn!("origin {}: solver failed ({reason}), using nearest zones", problem.origin);
                diagnostics.push(AssignDiagnostic::InfeasibleSubproblem {
                    origin: problem.origin.clone(),
                    persons,
                    reason: reason.to_string(),
                });
                live.iter().map(|r| (r[0], AssignMethod::Nearest)).collect()
            }
        }
    };

    let mut assigned: BTreeMap<String, usize> = BTreeMap::new();
    for (zone, _) in &chosen {
        *assigned.entry(cell_key(zones, od, *zone)).or_default() += 1;
    }
    let fit = OriginFit::compute(&problem.origin, &assigned, &observed);

    let mut chosen = chosen.into_iter();
    let mut assignments = Vec::with_capacity(problem.demands.len());
    for (d, r) in problem.demands.iter().zip(&ranked) {
        let next = if r.is_empty() { None } else { chosen.next() };
        match next {
            Some((zone, method)) => {
                assignments.push(ZoneAssignment::new(d.activity, zone, method));
            }
            None => {
                diagnostics.push(AssignDiagnostic::Unassigned {
                    activity: d.activity,
                    reason: "no work candidate".into(),
                });
                assignments.push(ZoneAssignment::unassigned(d.activity));
            }
        }
    }

    OriginOutcome { assignments, diagnostics, fit }
}

/// Destinations weighted by the observed flow still unclaimed, one person at
/// a time; uniform once nothing observed remains among the candidates.
fn iterative(
    ranked: &[Vec<ZoneId>],
    observed: &BTreeMap<String, f64>,
    zones: &ZoneIndex,
    od: &OdMatrix,
    rng: &mut UnitRng,
) -> Vec<(ZoneId, AssignMethod)> {
    let mut remaining = observed.clone();
    ranked
        .iter()
        .map(|r| {
            let keys: Vec<String> = r.iter().map(|&z| cell_key(zones, od, z)).collect();
            let weights: Vec<f64> = keys
                .iter()
                .map(|k| remaining.get(k).copied().unwrap_or(0.0).max(0.0))
                .collect();
            let idx = match rng.choose_weighted_index(&weights) {
                Some(i) => {
                    if let Some(left) = remaining.get_mut(&keys[i]) {
                        *left = (*left - 1.0).max(0.0);
                    }
                    i
                }
                None => rng.gen_range(0..r.len()),
            };
            (r[idx], AssignMethod::Iterative)
        })
        .collect()
}

/// Solve the origin's [`FlowProblem`] and hand the group flows out to
/// persons in seeded random order.  The flag is `false` when the solve was
/// cut short by `time_limit`.
fn optimise(
    ranked: &[Vec<ZoneId>],
    observed: &BTreeMap<String, f64>,
    zones: &ZoneIndex,
    od: &OdMatrix,
    config: &WorkConfig,
    time_limit: Duration,
    rng: &mut UnitRng,
) -> Result<(Vec<(ZoneId, AssignMethod)>, bool), FlowError> {
    // Observed cells first, then cells only candidates reach.
    let mut cells: BTreeMap<String, usize> = BTreeMap::new();
    let mut targets: Vec<f64> = Vec::new();
    for (area, &count) in observed {
        cells.insert(area.clone(), targets.len());
        targets.push(count);
    }

    let mut groups: BTreeMap<&[ZoneId], Vec<usize>> = BTreeMap::new();
    for (i, r) in ranked.iter().enumerate() {
        groups.entry(r.as_slice()).or_default().push(i);
    }

    let mut flow_groups = Vec::with_capacity(groups.len());
    for (dests, members) in &groups {
        let cells_of: Vec<usize> = dests
            .iter()
            .map(|&z| {
                let key = cell_key(zones, od, z);
                *cells.entry(key).or_insert_with(|| {
                    targets.push(0.0);
                    targets.len() - 1
                })
            })
            .collect();
        flow_groups.push(FlowGroup { size: members.len() as u32, cells: cells_of });
    }

    let problem = FlowProblem {
        groups: flow_groups,
        observed: targets,
        use_percentages: config.use_percentages,
        weight_max_dev: config.weight_max_dev,
        weight_total_dev: config.weight_total_dev,
        time_limit,
    };
    let FlowSolution { flows, optimal } = problem.solve()?;

    let mut chosen: Vec<Option<ZoneId>> = vec![None; ranked.len()];
    for ((dests, members), counts) in groups.iter().zip(&flows) {
        let mut order = members.clone();
        rng.shuffle(&mut order);
        let mut slots = order.into_iter();
        for (&zone, &count) in dests.iter().zip(counts) {
            for person in slots.by_ref().take(count as usize) {
                chosen[person] = Some(zone);
            }
        }
    }

    let chosen = chosen
        .into_iter()
        .zip(ranked)
        .map(|(z, r)| (z.unwrap_or(r[0]), AssignMethod::Optimised))
        .collect();
    Ok((chosen, optimal))
}

// ── Sequential driver ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkOutput {
    /// Every work activity of every chain, ascending by activity.
    pub assignments: Vec<ZoneAssignment>,
    pub diagnostics: Vec<AssignDiagnostic>,
    pub fit: WorkFit,
}

/// Assign the work activities of all `chains`, one origin after another.
/// `config` is validated first.
pub fn assign_work(
    feas: &ZoneFeasibility<'_>,
    chains: &[ActivityChain],
    od: &OdMatrix,
    categories: &CategoryMap,
    feasibility: &FeasibilityConfig,
    config: &WorkConfig,
    seed: u64,
) -> AssignResult<WorkOutput> {
    config.validate()?;
    let mut out = WorkOutput::default();
    let mut demands = Vec::new();
    let mut decided: BTreeMap<ActivityId, ZoneAssignment> = BTreeMap::new();

    for chain in chains {
        match work_demand(feas, chain, categories, feasibility) {
            WorkDemandOutcome::NoWork => {}
            WorkDemandOutcome::Demand(d) => demands.push(d),
            WorkDemandOutcome::Resolved { assignment, diagnostics } => {
                decided.insert(assignment.activity, assignment);
                out.diagnostics.extend(diagnostics);
            }
        }
    }

    for problem in group_by_origin(demands, feas.zones, od) {
        let outcome = solve_origin(&problem, feas.zones, od, config, seed);
        for a in outcome.assignments {
            decided.insert(a.activity, a);
        }
        out.diagnostics.extend(outcome.diagnostics);
        out.fit.origins.push(outcome.fit);
    }

    out.assignments = expand_work(chains, &decided);
    Ok(out)
}

/// Every work activity of `chains`, later ones repeating the first one's
/// zone.  Chains whose first work activity is not in `decided` are skipped.
pub fn expand_work(
    chains: &[ActivityChain],
    decided: &BTreeMap<ActivityId, ZoneAssignment>,
) -> Vec<ZoneAssignment> {
    let mut out: Vec<ZoneAssignment> = chains
        .iter()
        .filter_map(|chain| {
            let first = chain.first_of(Purpose::Work)?;
            let decision = decided.get(&first.id)?;
            Some(repeat_for_purpose(chain, Purpose::Work, *decision))
        })
        .flatten()
        .collect();
    out.sort_by_key(|a| a.activity);
    out
}
