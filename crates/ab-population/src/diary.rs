//! The travel-diary sample.
//!
//! Each diary household has members, and each member reported an ordered
//! list of trips on one or more travel days.  A day's trip `n` ends at the
//! activity whose purpose is `destination_purpose`; the first trip usually
//! starts at home.  Activity chains are built from a single travel day.

use std::collections::BTreeMap;

use ab_core::{DiaryHouseholdId, DiaryPersonId, Purpose, TravelMode};

use crate::{AgeBand, Attributes, PopulationError, PopulationResult, Sex};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiaryHousehold {
    pub id: DiaryHouseholdId,
    pub year: u16,
    pub region: String,
    pub attributes: Attributes,
    /// Member ids, ascending.
    pub members: Vec<DiaryPersonId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiaryPerson {
    pub id: DiaryPersonId,
    pub household: DiaryHouseholdId,
    pub age: u8,
    pub sex: Sex,
}

impl DiaryPerson {
    #[inline]
    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_age(self.age)
    }
}

/// One reported trip.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiaryTrip {
    pub person: DiaryPersonId,
    /// Position within the travel day, ascending.
    pub seq: u16,
    pub origin_purpose: Purpose,
    pub destination_purpose: Purpose,
    pub mode: TravelMode,
    /// ISO day of week, 1 = Monday.
    pub day_of_week: u8,
    /// Departure, minutes after midnight.
    pub start_minute: u32,
    pub travel_minutes: Option<f64>,
    pub distance_m: Option<f64>,
}

impl DiaryTrip {
    /// Reported travel time, derived from distance at the mode's assumed
    /// speed when missing.  `None` only when both are missing.
    pub fn resolved_minutes(&self) -> Option<f64> {
        self.travel_minutes
            .or_else(|| self.distance_m.map(|d| self.mode.minutes_for_distance(d)))
    }

    /// Reported distance, derived from travel time when missing.
    pub fn resolved_distance_m(&self) -> Option<f64> {
        self.distance_m
            .or_else(|| self.travel_minutes.map(|t| self.mode.distance_for_minutes(t)))
    }

    pub(crate) fn validate(&self) -> PopulationResult<()> {
        for (name, v) in [("travel_minutes", self.travel_minutes), ("distance_m", self.distance_m)] {
            if let Some(v) = v {
                if !v.is_finite() || v < 0.0 {
                    return Err(PopulationError::InvalidValue(format!(
                        "trip {} of diary person {}: {name} = {v}",
                        self.seq, self.person
                    )));
                }
            }
        }
        Ok(())
    }
}

// ── DiaryFilter ───────────────────────────────────────────────────────────────

/// Restricts the diary sample before matching.  An empty list means "no
/// restriction" for that field.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiaryFilter {
    pub years: Vec<u16>,
    pub regions: Vec<String>,
    /// Keep only trips made on these days of the week.
    pub day_of_week: Vec<u8>,
}

impl DiaryFilter {
    pub fn keeps_household(&self, hh: &DiaryHousehold) -> bool {
        (self.years.is_empty() || self.years.contains(&hh.year))
            && (self.regions.is_empty() || self.regions.iter().any(|r| r == &hh.region))
    }

    pub fn keeps_trip(&self, trip: &DiaryTrip) -> bool {
        self.day_of_week.is_empty() || self.day_of_week.contains(&trip.day_of_week)
    }
}

// ── DiarySample ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct DiarySample {
    households: BTreeMap<DiaryHouseholdId, DiaryHousehold>,
    persons: BTreeMap<DiaryPersonId, DiaryPerson>,
    /// Sorted by `(day_of_week, seq)` within each person.
    trips: BTreeMap<DiaryPersonId, Vec<DiaryTrip>>,
}

impl DiarySample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_household(
        &mut self,
        id: DiaryHouseholdId,
        year: u16,
        region: &str,
        attributes: Attributes,
    ) -> PopulationResult<()> {
        if self.households.contains_key(&id) {
            return Err(PopulationError::DuplicateId { kind: "diary household", id: id.0 });
        }
        self.households.insert(
            id,
            DiaryHousehold {
                id,
                year,
                region: region.trim().to_string(),
                attributes,
                members: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn add_person(&mut self, person: DiaryPerson) -> PopulationResult<()> {
        if self.persons.contains_key(&person.id) {
            return Err(PopulationError::DuplicateId { kind: "diary person", id: person.id.0 });
        }
        let Some(hh) = self.households.get_mut(&person.household) else {
            return Err(PopulationError::UnknownHousehold {
                kind: "diary person",
                id: person.id.0,
                household: person.household.0,
            });
        };
        let pos = hh.members.partition_point(|&m| m < person.id);
        hh.members.insert(pos, person.id);
        self.persons.insert(person.id, person);
        Ok(())
    }

    pub fn add_trip(&mut self, trip: DiaryTrip) -> PopulationResult<()> {
        if !self.persons.contains_key(&trip.person) {
            return Err(PopulationError::UnknownDiaryPerson(trip.person.0));
        }
        trip.validate()?;
        let list = self.trips.entry(trip.person).or_default();
        let key = (trip.day_of_week, trip.seq);
        let pos = list.partition_point(|t| (t.day_of_week, t.seq) <= key);
        list.insert(pos, trip);
        Ok(())
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn households(&self) -> impl Iterator<Item = &DiaryHousehold> + '_ {
        self.households.values()
    }

    pub fn persons(&self) -> impl Iterator<Item = &DiaryPerson> + '_ {
        self.persons.values()
    }

    pub fn household(&self, id: DiaryHouseholdId) -> Option<&DiaryHousehold> {
        self.households.get(&id)
    }

    pub fn person(&self, id: DiaryPersonId) -> Option<&DiaryPerson> {
        self.persons.get(&id)
    }

    pub fn members<'a>(&'a self, hh: &'a DiaryHousehold) -> impl Iterator<Item = &'a DiaryPerson> + 'a {
        hh.members.iter().filter_map(|id| self.persons.get(id))
    }

    /// Every trip of `person`, by day of week and then sequence; empty for a
    /// stay-at-home respondent.
    pub fn trips(&self, person: DiaryPersonId) -> &[DiaryTrip] {
        self.trips.get(&person).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Trips of `person` on their earliest travel day in the sample, the
    /// ones an activity chain is built from.
    pub fn travel_day(&self, person: DiaryPersonId) -> &[DiaryTrip] {
        let trips = self.trips(person);
        let Some(first) = trips.first() else {
            return trips;
        };
        let len = trips.partition_point(|t| t.day_of_week == first.day_of_week);
        &trips[..len]
    }

    /// A copy restricted by `filter`.  Households outside the filter are
    /// dropped with their members; trips on other days are dropped, keeping
    /// the respondent.
    pub fn filtered(&self, filter: &DiaryFilter) -> DiarySample {
        let households: BTreeMap<_, _> = self
            .households
            .iter()
            .filter(|(_, hh)| filter.keeps_household(hh))
            .map(|(&id, hh)| (id, hh.clone()))
            .collect();

        let persons: BTreeMap<_, _> = self
            .persons
            .iter()
            .filter(|(_, p)| households.contains_key(&p.household))
            .map(|(&id, p)| (id, p.clone()))
            .collect();

        let trips = self
            .trips
            .iter()
            .filter(|(id, _)| persons.contains_key(id))
            .map(|(&id, list)| {
                let kept: Vec<DiaryTrip> =
                    list.iter().filter(|t| filter.keeps_trip(t)).cloned().collect();
                (id, kept)
            })
            .filter(|(_, list)| !list.is_empty())
            .collect();

        DiarySample { households, persons, trips }
    }
}
