//! Individual tier: pair synthetic members with diary members.

use std::collections::BTreeMap;

use ab_core::{DiaryPersonId, PersonId, UnitRng};
use ab_population::{AgeBand, DiarySample, Person, Sex};

use crate::{CandidatePool, IndividualRelaxation, MatchLevel};

/// Matching criteria in force at one level.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Criteria {
    max_band_distance: u8,
    same_sex: bool,
    level: MatchLevel,
}

fn criteria_levels(relaxations: &[IndividualRelaxation]) -> Vec<Criteria> {
    let mut current = Criteria { max_band_distance: 0, same_sex: true, level: MatchLevel::Exact };
    let mut out = vec![current];
    for &r in relaxations {
        match r {
            IndividualRelaxation::WidenAgeBand(n) => {
                current.max_band_distance = current.max_band_distance.max(n);
            }
            IndividualRelaxation::IgnoreSex => current.same_sex = false,
            IndividualRelaxation::AnyAge    => current.max_band_distance = u8::MAX,
        }
        current.level = MatchLevel::Relaxed(r);
        out.push(current);
    }
    out
}

/// Pair each of `persons` with a member of `pool`, without replacement.
///
/// Levels are evaluated across the whole household before widening, so every
/// exact pairing is made before any relaxed one.  Within a level, persons
/// are visited in ascending id order.  Returns one entry per input person,
/// in input order; `None` for persons left unmatched.
pub fn match_within_household(
    persons: &[&Person],
    pool: &mut CandidatePool,
    relaxations: &[IndividualRelaxation],
) -> Vec<(PersonId, Option<(DiaryPersonId, MatchLevel)>)> {
    let mut result: BTreeMap<PersonId, Option<(DiaryPersonId, MatchLevel)>> =
        persons.iter().map(|p| (p.id, None)).collect();

    let mut order: Vec<&Person> = persons.to_vec();
    order.sort_by_key(|p| p.id);

    for criteria in criteria_levels(relaxations) {
        if pool.is_empty() {
            break;
        }
        for person in &order {
            if result.get(&person.id).is_some_and(Option::is_some) {
                continue;
            }
            let sex = criteria.same_sex.then_some(person.sex);
            let Some(entry) = pool.best(person.age_band(), sex, criteria.max_band_distance) else {
                continue;
            };
            if pool.take(entry.id).is_some() {
                result.insert(person.id, Some((entry.id, criteria.level)));
            }
        }
    }

    persons.iter().map(|p| (p.id, result.get(&p.id).copied().flatten())).collect()
}

// ── Global fallback ───────────────────────────────────────────────────────────

/// Diary respondents by (age band, sex), for matching leftovers against the
/// whole sample with replacement.
pub struct GlobalIndex {
    by_key: BTreeMap<(AgeBand, Sex), Vec<DiaryPersonId>>,
}

impl GlobalIndex {
    pub fn build(diary: &DiarySample) -> Self {
        let mut by_key: BTreeMap<(AgeBand, Sex), Vec<DiaryPersonId>> = BTreeMap::new();
        for p in diary.persons() {
            by_key.entry((p.age_band(), p.sex)).or_default().push(p.id);
        }
        GlobalIndex { by_key }
    }

    /// A respondent of the same sex in the closest populated age band, drawn
    /// uniformly within that band.
    pub fn draw(&self, person: &Person, rng: &mut UnitRng) -> Option<DiaryPersonId> {
        let band = person.age_band();
        let (_, ids) = self
            .by_key
            .iter()
            .filter(|((_, sex), ids)| *sex == person.sex && !ids.is_empty())
            .min_by_key(|((b, _), _)| (b.distance(band), *b))?;
        rng.choose(ids).copied()
    }
}
