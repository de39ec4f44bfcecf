//! `ab-spatial`: the read-only spatial lookups shared by every assignment
//! stage.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`zones`]    | `Zone`, `ZoneIndex` (code map + R-tree), `ZoneIndexBuilder` |
//! | [`poi`]      | `Facility`, `PoiIndex`, `PoiSummary`                      |
//! | [`travel`]   | `TravelTimes` trait, `TravelTimeMatrix`                   |
//! | [`distance`] | `DetourModel` (crow-fly → network distance)               |
//! | [`od`]       | `OdMatrix`, `CommuteLevel`                                |
//! | [`loader`]   | CSV loaders for all of the above                          |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                        |
//!
//! Everything here is built once before a run and then shared immutably
//! (`&T`) across worker threads.

pub mod distance;
pub mod error;
pub mod loader;
pub mod od;
pub mod poi;
pub mod travel;
pub mod zones;


pub use distance::DetourModel;
pub use error::{SpatialError, SpatialResult};
pub use loader::{
    load_od_csv, load_od_reader, load_pois_csv, load_pois_reader, load_travel_times_csv,
    load_travel_times_reader, load_zones_csv, load_zones_reader,
};
pub use od::{CommuteLevel, OdMatrix};
pub use poi::{Facility, PoiIndex, PoiSummary};
pub use travel::{TravelTimeMatrix, TravelTimes};
pub use zones::{Zone, ZoneIndex, ZoneIndexBuilder};
