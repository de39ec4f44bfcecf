//! CSV loaders for the population and diary tables.
//!
//! # CSV formats
//!
//! Household tables have a few fixed leading columns; every further column is
//! a categorical attribute available for matching, kept as text.
//!
//! ```csv
//! household_id,home_zone,num_adults,num_children,num_cars,tenure
//! 0,E00056750,2,1,1,owned
//! ```
//!
//! ```csv
//! person_id,household_id,age,sex
//! 0,0,41,female
//! ```
//!
//! Diary households replace `home_zone` with `year,region`:
//!
//! ```csv
//! household_id,year,region,num_adults,num_children,num_cars,tenure
//! 7,2019,yorkshire,2,1,1,owned
//! ```
//!
//! Diary trips (`travel_minutes` and `distance_m` may be empty):
//!
//! ```csv
//! person_id,seq,origin_purpose,destination_purpose,mode,day_of_week,start_minute,travel_minutes,distance_m
//! 12,1,home,work,car,2,480,25,9000
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ab_core::{DiaryHouseholdId, DiaryPersonId, HouseholdId, PersonId, Purpose, TravelMode};
use ab_spatial::ZoneIndex;

use crate::{
    Attributes, DiaryPerson, DiarySample, DiaryTrip, Person, Population, PopulationError,
    PopulationResult, Sex,
};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PersonRecord {
    person_id:    u32,
    household_id: u32,
    age:          u8,
    sex:          String,
}

#[derive(Deserialize)]
struct TripRecord {
    person_id:           u32,
    seq:                 u16,
    origin_purpose:      String,
    destination_purpose: String,
    mode:                String,
    day_of_week:         u8,
    start_minute:        u32,
    travel_minutes:      Option<f64>,
    distance_m:          Option<f64>,
}

fn parse_err(e: csv::Error) -> PopulationError {
    PopulationError::Parse(e.to_string())
}

/// Read a table whose first `fixed.len()` columns are named `fixed` and whose
/// remaining columns are attributes.
fn read_attribute_table<R: Read>(
    reader: R,
    fixed: &[&str],
) -> PopulationResult<Vec<(Vec<String>, Attributes)>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers().map_err(parse_err)?.clone();

    for (i, name) in fixed.iter().enumerate() {
        if headers.get(i).map(str::trim) != Some(*name) {
            return Err(PopulationError::Parse(format!(
                "expected column {i} to be {name:?}, found {:?}",
                headers.get(i)
            )));
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(parse_err)?;
        let fixed_vals: Vec<String> =
            record.iter().take(fixed.len()).map(|v| v.trim().to_string()).collect();
        let attributes: Attributes = headers
            .iter()
            .zip(record.iter())
            .skip(fixed.len())
            .map(|(h, v)| (h.trim().to_string(), v.trim().to_string()))
            .collect();
        rows.push((fixed_vals, attributes));
    }
    Ok(rows)
}

fn parse_num<T: std::str::FromStr>(field: &str, value: &str) -> PopulationResult<T> {
    value
        .parse::<T>()
        .map_err(|_| PopulationError::Parse(format!("invalid {field} {value:?}")))
}

// ── Population ────────────────────────────────────────────────────────────────

pub fn load_population_csv(
    households: &Path,
    persons: &Path,
    zones: &ZoneIndex,
) -> PopulationResult<Population> {
    let hh = std::fs::File::open(households)?;
    let pp = std::fs::File::open(persons)?;
    load_population_readers(hh, pp, zones)
}

/// Like [`load_population_csv`] but accepts any `Read` sources.
pub fn load_population_readers<H: Read, P: Read>(
    households: H,
    persons: P,
    zones: &ZoneIndex,
) -> PopulationResult<Population> {
    let mut pop = Population::new();

    for (fixed, attributes) in read_attribute_table(households, &["household_id", "home_zone"])? {
        let id = HouseholdId(parse_num("household_id", &fixed[0])?);
        let home_zone = zones.resolve(&fixed[1])?;
        pop.add_household(id, home_zone, attributes)?;
    }

    let mut csv_reader = csv::Reader::from_reader(persons);
    for result in csv_reader.deserialize::<PersonRecord>() {
        let row = result.map_err(parse_err)?;
        pop.add_person(Person {
            id:        PersonId(row.person_id),
            household: HouseholdId(row.household_id),
            age:       row.age,
            sex:       row.sex.parse::<Sex>()?,
        })?;
    }

    Ok(pop)
}

// ── Diary ─────────────────────────────────────────────────────────────────────

pub fn load_diary_csv(
    households: &Path,
    persons: &Path,
    trips: &Path,
) -> PopulationResult<DiarySample> {
    let hh = std::fs::File::open(households)?;
    let pp = std::fs::File::open(persons)?;
    let tt = std::fs::File::open(trips)?;
    load_diary_readers(hh, pp, tt)
}

/// Like [`load_diary_csv`] but accepts any `Read` sources.
pub fn load_diary_readers<H: Read, P: Read, T: Read>(
    households: H,
    persons: P,
    trips: T,
) -> PopulationResult<DiarySample> {
    let mut sample = DiarySample::new();

    for (fixed, attributes) in read_attribute_table(households, &["household_id", "year", "region"])? {
        let id = DiaryHouseholdId(parse_num("household_id", &fixed[0])?);
        let year: u16 = parse_num("year", &fixed[1])?;
        sample.add_household(id, year, &fixed[2], attributes)?;
    }

    let mut csv_reader = csv::Reader::from_reader(persons);
    for result in csv_reader.deserialize::<PersonRecord>() {
        let row = result.map_err(parse_err)?;
        sample.add_person(DiaryPerson {
            id:        DiaryPersonId(row.person_id),
            household: DiaryHouseholdId(row.household_id),
            age:       row.age,
            sex:       row.sex.parse::<Sex>()?,
        })?;
    }

    let mut csv_reader = csv::Reader::from_reader(trips);
    for result in csv_reader.deserialize::<TripRecord>() {
        let row = result.map_err(parse_err)?;
        sample.add_trip(DiaryTrip {
            person:              DiaryPersonId(row.person_id),
            seq:                 row.seq,
            origin_purpose:      row.origin_purpose.parse::<Purpose>()?,
            destination_purpose: row.destination_purpose.parse::<Purpose>()?,
            mode:                row.mode.parse::<TravelMode>()?,
            day_of_week:         row.day_of_week,
            start_minute:        row.start_minute,
            travel_minutes:      row.travel_minutes,
            distance_m:          row.distance_m,
        })?;
    }

    Ok(sample)
}
