//! Activity chains instantiated from matched diary respondents.
//!
//! A synthetic person inherits the trip list of the diary respondent they
//! were matched to.  Every trip becomes one [`Activity`] at its destination,
//! numbered with a fresh [`ActivityId`].  Zones and facilities are attached
//! later by the assignment stages; nothing here knows about them except the
//! person's home zone.

use ab_core::{
    ActivityId, DayType, DiaryPersonId, HouseholdId, PersonId, Purpose, TimeOfDay, TravelMode,
    ZoneId,
};

use crate::{DiaryTrip, Person, PopulationResult};

/// One activity at the destination of a diary trip.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub id: ActivityId,
    pub person: PersonId,
    /// Position within the chain, from 0.
    pub seq: u16,
    pub purpose: Purpose,
    /// Purpose of the activity the trip departed from.
    pub origin_purpose: Purpose,
    /// Mode of the trip arriving here.
    pub mode: TravelMode,
    pub day: DayType,
    pub time: TimeOfDay,
    pub start_minute: u32,
    /// Reported travel time of the arriving trip (derived when missing).
    pub travel_minutes: Option<f64>,
    /// Reported distance of the arriving trip (derived when missing).
    pub distance_m: Option<f64>,
}

impl Activity {
    fn from_trip(id: ActivityId, person: PersonId, seq: u16, trip: &DiaryTrip) -> PopulationResult<Self> {
        Ok(Activity {
            id,
            person,
            seq,
            purpose:        trip.destination_purpose,
            origin_purpose: trip.origin_purpose,
            mode:           trip.mode,
            day:            DayType::from_day_of_week(trip.day_of_week)?,
            time:           TimeOfDay::from_minutes(trip.start_minute),
            start_minute:   trip.start_minute,
            travel_minutes: trip.resolved_minutes(),
            distance_m:     trip.resolved_distance_m(),
        })
    }
}

// ── ActivityChain ─────────────────────────────────────────────────────────────

/// A synthetic person's day.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityChain {
    pub person: PersonId,
    pub household: HouseholdId,
    pub home_zone: ZoneId,
    pub diary_person: DiaryPersonId,
    pub activities: Vec<Activity>,
}

impl ActivityChain {
    /// Build a chain for `person` from the matched respondent's `trips`,
    /// numbering activities `first_id`, `first_id + 1`, ….
    pub fn instantiate(
        person: &Person,
        home_zone: ZoneId,
        diary_person: DiaryPersonId,
        trips: &[DiaryTrip],
        first_id: u32,
    ) -> PopulationResult<Self> {
        let activities = trips
            .iter()
            .enumerate()
            .map(|(i, trip)| {
                Activity::from_trip(ActivityId(first_id + i as u32), person.id, i as u16, trip)
            })
            .collect::<PopulationResult<Vec<_>>>()?;

        Ok(ActivityChain {
            person: person.id,
            household: person.household,
            home_zone,
            diary_person,
            activities,
        })
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.activities.iter()
    }

    /// The first activity with `purpose`, if any.
    pub fn first_of(&self, purpose: Purpose) -> Option<&Activity> {
        self.activities.iter().find(|a| a.purpose == purpose)
    }
}
