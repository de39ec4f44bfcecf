//! `ab-population`: the two tables being joined (the synthetic population
//! and the travel-diary sample) plus the activity chains a match produces.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`household`]| `Household`, `Person`, `Sex`, `Population`, `Attributes` |
//! | [`age`]      | `AgeBand`, `EducationTiers`                               |
//! | [`diary`]    | `DiaryHousehold`, `DiaryPerson`, `DiaryTrip`, `DiarySample`, `DiaryFilter` |
//! | [`activity`] | `Activity`, `ActivityChain`                               |
//! | [`loader`]   | CSV loaders for population and diary tables               |
//! | [`error`]    | `PopulationError`, `PopulationResult<T>`                  |
//!
//! Both tables are produced upstream and are read-only here.

pub mod activity;
pub mod age;
pub mod diary;
pub mod error;
pub mod household;
pub mod loader;


pub use activity::{Activity, ActivityChain};
pub use age::{AgeBand, EducationTiers};
pub use diary::{DiaryFilter, DiaryHousehold, DiaryPerson, DiarySample, DiaryTrip};
pub use error::{PopulationError, PopulationResult};
pub use household::{Attributes, Household, Person, Population, Sex};
pub use loader::{load_diary_csv, load_diary_readers, load_population_csv, load_population_readers};
