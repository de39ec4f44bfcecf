//! The `Pipeline` struct and its stage sequence.

use std::collections::BTreeMap;

use log::{debug, info};

use ab_assign::{
    assign_education, assign_secondary, expand_work, group_by_origin, solve_origin, work_demand,
    AssignDiagnostic, AssignMethod, FacilitySampler, WorkDemandOutcome, WorkFit, ZoneAssignment,
    ZoneFeasibility, ZoneMap,
};
use ab_core::{ActivityId, FacilityId, GeoPoint, HouseholdId, PersonId, Purpose, ZoneId};
use ab_matching::{DiaryMatcher, MatchDiagnostics, MatchOutput};
use ab_population::{Activity, ActivityChain, AgeBand, DiarySample, Household, Population};
use ab_spatial::{OdMatrix, PoiIndex, TravelTimes, ZoneIndex};

use crate::{PipelineConfig, PipelineObserver, PipelineResult, Stage};

// ── Output records ────────────────────────────────────────────────────────────

/// Final placement of one activity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub activity:  ActivityId,
    pub person:    PersonId,
    pub household: HouseholdId,
    pub seq:       u16,
    pub purpose:   Purpose,
    pub zone:      Option<ZoneId>,
    /// External code of `zone`.
    pub zone_code: Option<String>,
    pub facility:  Option<FacilityId>,
    /// The facility's location, or the zone centroid without a facility.
    pub location:  Option<GeoPoint>,
    pub method:    AssignMethod,
}

/// Every diagnostic of a run, by stage family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunDiagnostics {
    pub matching:   MatchDiagnostics,
    /// Feasibility, work, secondary and facility records in stage order.
    pub assignment: Vec<AssignDiagnostic>,
}

impl RunDiagnostics {
    pub fn len(&self) -> usize {
        self.matching.len() + self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record counts by kind, the user-visible summary of a run.
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for d in &self.matching.records {
            *out.entry(d.kind()).or_insert(0) += 1;
        }
        for d in &self.assignment {
            *out.entry(d.kind()).or_insert(0) += 1;
        }
        out
    }

    /// `(kind, unit, detail)` for every record, matching first.
    pub fn records(&self) -> impl Iterator<Item = (&'static str, String, String)> + '_ {
        let matching = self.matching.records.iter().map(|d| (d.kind(), d.unit(), d.to_string()));
        let assignment = self.assignment.iter().map(|d| (d.kind(), d.unit(), d.to_string()));
        matching.chain(assignment)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunOutput {
    /// Ascending by activity id.
    pub assignments: Vec<Assignment>,
    pub diagnostics: RunDiagnostics,
    pub matches:     MatchOutput,
    pub work_fit:    WorkFit,
}

// ── Unit dispatch ─────────────────────────────────────────────────────────────

/// Apply `f` to every unit, in parallel with the `parallel` feature.  Output
/// order always follows input order.
fn per_unit<T, R, F>(units: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        units.iter().map(f).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        units.par_iter().map(f).collect()
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Holds the validated inputs of a run.  Create via
/// [`PipelineBuilder`][crate::PipelineBuilder].
///
/// [`run`](Self::run) executes the stages strictly in order, each one
/// consuming the complete output of the previous:
///
/// 1. **Matching**: one diary respondent per synthetic person; activity
///    chains are instantiated from their trips.
/// 2. **Education**: feasible zones from home, closest to the reported
///    distance.
/// 3. **Work**: per-origin assignment against observed flows.
/// 4. **Secondary**: discretionary activities between the fixed anchors.
/// 5. **Facility**: one facility per placed activity.
pub struct Pipeline {
    pub config:     PipelineConfig,
    pub zones:      ZoneIndex,
    pub pois:       PoiIndex,
    pub travel:     Option<Box<dyn TravelTimes>>,
    pub od:         OdMatrix,
    pub population: Population,
    /// Already restricted by `config.diary_filter`.
    pub diary:      DiarySample,
}

impl Pipeline {
    fn feasibility(&self) -> PipelineResult<ZoneFeasibility<'_>> {
        Ok(ZoneFeasibility::new(
            &self.zones,
            Some(&self.pois),
            self.travel.as_deref(),
            self.config.feasibility.detour,
        )?)
    }

    /// Run every stage.  Per-unit problems end up in
    /// [`RunOutput::diagnostics`]; only setup errors are returned as `Err`.
    pub fn run<O: PipelineObserver>(&self, observer: &mut O) -> PipelineResult<RunOutput> {
        let seed = self.config.seed;
        let mut diagnostics = RunDiagnostics::default();

        // ── Matching ──────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Matching);
        let matcher = DiaryMatcher::new(&self.config.matching, &self.diary)?;
        let households: Vec<&Household> = self.population.households().collect();
        let outcomes = per_unit(&households, |hh| {
            matcher.match_household(&self.population, hh, seed)
        });
        let matches = MatchOutput::from_outcomes(outcomes);
        diagnostics.matching = matches.diagnostics.clone();
        let (chains, bands): (Vec<ActivityChain>, Vec<AgeBand>) =
            self.instantiate_chains(&matches)?.into_iter().unzip();
        let units: Vec<(&ActivityChain, AgeBand)> = chains.iter().zip(bands).collect();
        info!("{} chains from {} matched persons", chains.len(), matches.persons.len());
        observer.on_stage_end(Stage::Matching, households.len());

        let feas = self.feasibility()?;
        let cats = &self.config.categories;
        let mut anchors = ZoneMap::new();

        // ── Education ─────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Education);
        let education = per_unit(&units, |(chain, band)| {
            assign_education(&feas, chain, *band, cats, &self.config.feasibility)
        });
        for out in education {
            anchors.extend(out.assignments.into_iter().map(|a| (a.activity, a)));
            diagnostics.assignment.extend(out.diagnostics);
        }
        observer.on_stage_end(Stage::Education, units.len());

        // ── Work ──────────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Work);
        let demands = per_unit(&chains, |chain| {
            work_demand(&feas, chain, cats, &self.config.feasibility)
        });
        let mut decided: BTreeMap<ActivityId, ZoneAssignment> = BTreeMap::new();
        let mut pending = Vec::new();
        for d in demands {
            match d {
                WorkDemandOutcome::NoWork => {}
                WorkDemandOutcome::Demand(d) => pending.push(d),
                WorkDemandOutcome::Resolved { assignment, diagnostics: diags } => {
                    decided.insert(assignment.activity, assignment);
                    diagnostics.assignment.extend(diags);
                }
            }
        }
        let problems = group_by_origin(pending, &self.zones, &self.od);
        let solved = per_unit(&problems, |p| {
            solve_origin(p, &self.zones, &self.od, &self.config.work, seed)
        });
        let mut work_fit = WorkFit::default();
        for out in solved {
            decided.extend(out.assignments.into_iter().map(|a| (a.activity, a)));
            diagnostics.assignment.extend(out.diagnostics);
            work_fit.origins.push(out.fit);
        }
        anchors.extend(expand_work(&chains, &decided).into_iter().map(|a| (a.activity, a)));
        observer.on_stage_end(Stage::Work, problems.len());

        // ── Secondary ─────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Secondary);
        let secondary = per_unit(&units, |(chain, band)| {
            assign_secondary(&feas, chain, &anchors, *band, cats, &self.config.secondary, seed)
        });
        let mut placed = anchors;
        for out in secondary {
            placed.extend(out.assignments.into_iter().map(|a| (a.activity, a)));
            diagnostics.assignment.extend(out.diagnostics);
        }
        for chain in &chains {
            for a in chain.iter().filter(|a| a.purpose == Purpose::Home) {
                placed.insert(a.id, ZoneAssignment::new(a.id, chain.home_zone, AssignMethod::Home));
            }
        }
        observer.on_stage_end(Stage::Secondary, units.len());

        // ── Facility ──────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Facility);
        let sampler = FacilitySampler::new(&self.zones, &self.pois, &self.config.facility);
        let activities: Vec<(&ActivityChain, AgeBand, &Activity)> = units
            .iter()
            .flat_map(|&(chain, band)| chain.iter().map(move |a| (chain, band, a)))
            .collect();
        let rows = per_unit(&activities, |(chain, band, activity)| {
            self.place(&sampler, chain, *band, activity, placed.get(&activity.id), seed)
        });
        let mut assignments = Vec::with_capacity(rows.len());
        for (row, diag) in rows {
            assignments.push(row);
            diagnostics.assignment.extend(diag);
        }
        assignments.sort_by_key(|a| a.activity);
        observer.on_stage_end(Stage::Facility, assignments.len());

        let output = RunOutput { assignments, diagnostics, matches, work_fit };
        observer.on_run_end(&output);
        Ok(output)
    }

    /// One chain per matched person with at least one trip, numbered in
    /// person order.  A chain covers the respondent's first travel day only.
    fn instantiate_chains(&self, matches: &MatchOutput) -> PipelineResult<Vec<(ActivityChain, AgeBand)>> {
        let mut next_id = 0u32;
        let mut out = Vec::with_capacity(matches.persons.len());
        for pm in &matches.persons {
            let (Some(person), Some(hh)) =
                (self.population.person(pm.person), self.population.household(pm.household))
            else {
                continue;
            };
            let trips = self.diary.travel_day(pm.diary_person);
            if trips.is_empty() {
                debug!("{}: matched respondent {} has no trips", pm.person, pm.diary_person);
                continue;
            }
            let dropped = self.diary.trips(pm.diary_person).len() - trips.len();
            if dropped > 0 {
                debug!(
                    "{}: {dropped} trips of respondent {} on later days left out",
                    pm.person, pm.diary_person
                );
            }
            let chain = ActivityChain::instantiate(person, hh.home_zone, pm.diary_person, trips, next_id)?;
            next_id += trips.len() as u32;
            out.push((chain, person.age_band()));
        }
        Ok(out)
    }

    /// Final row for one activity, sampling a facility when the activity
    /// has a zone and a POI category.
    fn place(
        &self,
        sampler: &FacilitySampler<'_>,
        chain: &ActivityChain,
        band: AgeBand,
        activity: &Activity,
        decision: Option<&ZoneAssignment>,
        seed: u64,
    ) -> (Assignment, Option<AssignDiagnostic>) {
        let zone = decision.and_then(|d| d.zone);
        let method = decision.map_or(AssignMethod::Unassigned, |d| d.method);

        let (facility, diag) = match (zone, self.config.categories.category_for(activity.purpose, band)) {
            (Some(z), Some(category)) => {
                let out = sampler.sample(activity.id, z, category, seed);
                (out.facility, out.diagnostic)
            }
            _ => (None, None),
        };
        let location = facility
            .and_then(|f| self.pois.facility(f))
            .map(|f| f.location)
            .or_else(|| zone.and_then(|z| self.zones.centroid(z)));

        let row = Assignment {
            activity:  activity.id,
            person:    chain.person,
            household: chain.household,
            seq:       activity.seq,
            purpose:   activity.purpose,
            zone,
            zone_code: zone.and_then(|z| self.zones.get(z)).map(|z| z.code.clone()),
            facility,
            location,
            method,
        };
        (row, diag)
    }
}
