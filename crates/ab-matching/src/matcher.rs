//! `DiaryMatcher`: both tiers for one household, and the batch driver.

use log::{debug, warn};

use ab_core::{DiaryHouseholdId, DiaryPersonId, HouseholdId, PersonId, Stream, UnitRng};
use ab_population::{DiarySample, Household, Person, Population};

use crate::individual::{match_within_household, GlobalIndex};
use crate::{
    CandidatePool, HouseholdIndex, IndividualRelaxation, MatchDiagnostic, MatchDiagnostics,
    MatchResult, MatchingConfig,
};

// ── Match records ─────────────────────────────────────────────────────────────

/// How an individual was paired.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchLevel {
    Exact,
    Relaxed(IndividualRelaxation),
    Global,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HouseholdMatch {
    pub household: HouseholdId,
    pub diary_household: DiaryHouseholdId,
    /// Candidates the draw was made from, in draw order.
    pub alternatives: Vec<DiaryHouseholdId>,
    /// Relaxation level of the last level consulted (0 = every optional
    /// attribute matched).
    pub level: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonMatch {
    pub person: PersonId,
    pub household: HouseholdId,
    pub diary_person: DiaryPersonId,
    pub level: MatchLevel,
}

/// Everything produced for one household.
#[derive(Clone, Debug, PartialEq)]
pub struct HouseholdOutcome {
    pub household: HouseholdId,
    pub matched: Option<HouseholdMatch>,
    pub persons: Vec<PersonMatch>,
    pub diagnostics: Vec<MatchDiagnostic>,
}

/// The matching stage's output for the whole population, ordered by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchOutput {
    pub households: Vec<HouseholdMatch>,
    pub persons: Vec<PersonMatch>,
    pub diagnostics: MatchDiagnostics,
}

impl MatchOutput {
    /// Merge per-household outcomes produced in any order.
    pub fn from_outcomes(mut outcomes: Vec<HouseholdOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.household);
        let mut out = MatchOutput::default();
        for o in outcomes {
            out.households.extend(o.matched);
            out.persons.extend(o.persons);
            out.diagnostics.records.extend(o.diagnostics);
        }
        out.persons.sort_by_key(|p| p.person);
        out
    }
}

// ── DiaryMatcher ──────────────────────────────────────────────────────────────

pub struct DiaryMatcher<'a> {
    config: &'a MatchingConfig,
    diary: &'a DiarySample,
    index: HouseholdIndex,
    global: Option<GlobalIndex>,
}

impl<'a> DiaryMatcher<'a> {
    /// Validate `config` and index `diary` (already filtered) for lookup.
    pub fn new(config: &'a MatchingConfig, diary: &'a DiarySample) -> MatchResult<Self> {
        config.validate()?;
        Ok(DiaryMatcher {
            config,
            diary,
            index:  HouseholdIndex::build(config, diary),
            global: config.match_remaining_globally.then(|| GlobalIndex::build(diary)),
        })
    }

    /// Household tier: collect candidates level by level and draw one.
    fn draw_household(&self, hh: &Household, rng: &mut UnitRng) -> Option<HouseholdMatch> {
        let cap = self.config.n_matches.unwrap_or(usize::MAX);
        let mut alternatives: Vec<DiaryHouseholdId> = Vec::new();
        let mut level_used = 0;

        for level in 0..self.index.level_count() {
            let mut fresh: Vec<DiaryHouseholdId> = self
                .index
                .candidates(&hh.attributes, level)
                .iter()
                .copied()
                .filter(|id| !alternatives.contains(id))
                .collect();
            rng.shuffle(&mut fresh);
            let room = cap.saturating_sub(alternatives.len());
            alternatives.extend(fresh.into_iter().take(room));
            level_used = level;

            let done = if self.config.fill_to_n_matches {
                alternatives.len() >= cap
            } else {
                !alternatives.is_empty()
            };
            if done {
                break;
            }
        }

        let chosen = *rng.choose(&alternatives)?;
        Some(HouseholdMatch {
            household: hh.id,
            diary_household: chosen,
            alternatives,
            level: level_used,
        })
    }

    /// Run both tiers for one household.  Pure in its inputs: the same
    /// `seed` gives the same outcome on any thread.
    pub fn match_household(&self, population: &Population, hh: &Household, seed: u64) -> HouseholdOutcome {
        let mut rng = UnitRng::new(seed, Stream::Matching, hh.id.as_u64());
        let mut diagnostics = Vec::new();

        let Some(matched) = self.draw_household(hh, &mut rng) else {
            warn!("household {} unmatched after dropping all optional attributes", hh.id);
            diagnostics.push(MatchDiagnostic::UnmatchedHousehold { household: hh.id });
            return HouseholdOutcome { household: hh.id, matched: None, persons: Vec::new(), diagnostics };
        };

        if matched.level > 0 {
            let kept = self.index.columns(matched.level).len();
            let all = self.config.columns_at(0);
            let dropped: Vec<String> = all[kept..].iter().map(|s| s.to_string()).collect();
            debug!("household {} matched at level {} (dropped {:?})", hh.id, matched.level, dropped);
            diagnostics.push(MatchDiagnostic::RelaxedHousehold {
                household: hh.id,
                level: matched.level,
                dropped,
            });
        }

        // ── Individual tier ───────────────────────────────────────────────
        let members: Vec<&Person> = population.members(hh).collect();
        let mut pool = CandidatePool::for_household(self.diary, matched.diary_household);
        let pairs = match_within_household(&members, &mut pool, &self.config.individual_relaxation);

        let mut persons = Vec::with_capacity(members.len());
        for (person, paired) in members.iter().zip(pairs) {
            let paired = paired.1.or_else(|| {
                let id = self.global.as_ref()?.draw(person, &mut rng)?;
                Some((id, MatchLevel::Global))
            });
            match paired {
                Some((diary_person, level)) => {
                    match level {
                        MatchLevel::Exact => {}
                        MatchLevel::Relaxed(relaxation) => diagnostics
                            .push(MatchDiagnostic::RelaxedIndividual { person: person.id, relaxation }),
                        MatchLevel::Global => {
                            diagnostics.push(MatchDiagnostic::GlobalIndividual { person: person.id })
                        }
                    }
                    persons.push(PersonMatch { person: person.id, household: hh.id, diary_person, level });
                }
                None => {
                    debug!("person {} in household {} left unmatched", person.id, hh.id);
                    diagnostics.push(MatchDiagnostic::UnmatchedIndividual {
                        person: person.id,
                        household: hh.id,
                    });
                }
            }
        }

        HouseholdOutcome { household: hh.id, matched: Some(matched), persons, diagnostics }
    }

    /// Match every household sequentially.
    pub fn match_all(&self, population: &Population, seed: u64) -> MatchOutput {
        let outcomes = population
            .households()
            .map(|hh| self.match_household(population, hh, seed))
            .collect();
        MatchOutput::from_outcomes(outcomes)
    }
}
