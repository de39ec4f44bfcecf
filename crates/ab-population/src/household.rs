//! Synthetic households and persons.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ab_core::{HouseholdId, PersonId, ZoneId};

use crate::{AgeBand, PopulationError};

/// Categorical attributes by column name (e.g. `num_cars` → `"1"`).
///
/// Values are compared as strings; both tables must encode a column the same
/// way.
pub type Attributes = BTreeMap<String, String>;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male   => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = PopulationError;

    /// Accepts `male`/`female`, `m`/`f`, or the survey codes `1`/`2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "1"   => Ok(Sex::Male),
            "female" | "f" | "2" => Ok(Sex::Female),
            other => Err(PopulationError::Parse(format!("unknown sex {other:?}"))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Household / Person ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Household {
    pub id: HouseholdId,
    pub home_zone: ZoneId,
    pub attributes: Attributes,
    /// Member ids, ascending.
    pub members: Vec<PersonId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub id: PersonId,
    pub household: HouseholdId,
    pub age: u8,
    pub sex: Sex,
}

impl Person {
    #[inline]
    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_age(self.age)
    }
}

// ── Population ────────────────────────────────────────────────────────────────

/// The synthetic population, ordered by id.
#[derive(Clone, Debug, Default)]
pub struct Population {
    households: BTreeMap<HouseholdId, Household>,
    persons: BTreeMap<PersonId, Person>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_household(
        &mut self,
        id: HouseholdId,
        home_zone: ZoneId,
        attributes: Attributes,
    ) -> Result<(), PopulationError> {
        if self.households.contains_key(&id) {
            return Err(PopulationError::DuplicateId { kind: "household", id: id.0 });
        }
        self.households.insert(id, Household { id, home_zone, attributes, members: Vec::new() });
        Ok(())
    }

    /// Add a person to an existing household.
    pub fn add_person(&mut self, person: Person) -> Result<(), PopulationError> {
        if self.persons.contains_key(&person.id) {
            return Err(PopulationError::DuplicateId { kind: "person", id: person.id.0 });
        }
        let Some(hh) = self.households.get_mut(&person.household) else {
            return Err(PopulationError::UnknownHousehold {
                kind: "person",
                id: person.id.0,
                household: person.household.0,
            });
        };
        let pos = hh.members.partition_point(|&m| m < person.id);
        hh.members.insert(pos, person.id);
        self.persons.insert(person.id, person);
        Ok(())
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> + '_ {
        self.households.values()
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> + '_ {
        self.persons.values()
    }

    pub fn household(&self, id: HouseholdId) -> Option<&Household> {
        self.households.get(&id)
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    /// Members of `hh` in ascending id order.
    pub fn members<'a>(&'a self, hh: &'a Household) -> impl Iterator<Item = &'a Person> + 'a {
        hh.members.iter().filter_map(|id| self.persons.get(id))
    }
}
