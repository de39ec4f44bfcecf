//! `ab-core`: foundational types for the activity-location assignment
//! workspace.
//!
//! This crate is a dependency of every other `ab-*` crate.  It has no `ab-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `HouseholdId`, `PersonId`, `ActivityId`, `ZoneId`, …      |
//! | [`geo`]         | `GeoPoint`, haversine distance                            |
//! | [`time`]        | `TimeOfDay` buckets, `DayType` weekday flag               |
//! | [`rng`]         | `UnitRng` (per-unit stream), `Stream`                     |
//! | [`transport`]   | `TravelMode` enum                                         |
//! | [`purpose`]     | `Purpose`, `Category`                                     |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod purpose;
pub mod rng;
pub mod time;
pub mod transport;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{
    ActivityId, DiaryHouseholdId, DiaryPersonId, FacilityId, HouseholdId, PersonId, ZoneId,
};
pub use purpose::{Category, Purpose};
pub use rng::{Stream, UnitRng};
pub use time::{DayType, TimeOfDay};
pub use transport::TravelMode;
