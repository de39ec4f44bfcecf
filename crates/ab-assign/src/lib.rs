//! `ab-assign`: place every activity of every matched chain in a zone and
//! at a facility.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`config`]       | `FeasibilityConfig`, `WorkConfig`, `SecondaryConfig`, `FacilityConfig`, `CategoryMap` |
//! | [`feasibility`]  | `ZoneFeasibility`, `FeasibleZoneSet`, `Candidate`     |
//! | [`policy`]       | `ZoneFallback`, `FacilityFallback`, fallback evaluation |
//! | [`education`]    | closest-to-reported education zone selection          |
//! | [`work`]         | per-origin work assignment against observed flows     |
//! | [`flow_problem`] | the integer program solved for one origin             |
//! | [`fit`]          | RMSE of assigned vs observed commuting shares         |
//! | [`secondary`]    | gravity-style placement of discretionary activities   |
//! | [`facility`]     | `FacilitySampler`                                     |
//! | [`record`]       | `ZoneAssignment`, `AssignMethod`                      |
//! | [`diagnostics`]  | `AssignDiagnostic`                                    |
//! | [`error`]        | `AssignError`, `AssignResult<T>`                      |
//!
//! Per-unit failures (an empty feasible set, an infeasible origin, a zone
//! without facilities) never surface as `Err`.  They resolve through the
//! configured fallback lists and come back as [`AssignDiagnostic`] records
//! next to the result.

pub mod config;
pub mod diagnostics;
pub mod education;
pub mod error;
pub mod facility;
pub mod feasibility;
pub mod fit;
pub mod flow_problem;
pub mod policy;
pub mod record;
pub mod secondary;
pub mod work;

#[cfg(test)]
mod tests;

pub use config::{
    CategoryMap, FacilityConfig, FacilityMode, FeasibilityConfig, SecondaryConfig, WorkConfig,
};
pub use diagnostics::AssignDiagnostic;
pub use education::{assign_education, EducationOutcome};
pub use error::{AssignError, AssignResult};
pub use facility::{FacilityOutcome, FacilitySampler};
pub use feasibility::{Candidate, FeasibilitySource, FeasibleZoneSet, ZoneFeasibility};
pub use fit::{OriginFit, WorkFit};
pub use policy::{FacilityFallback, ZoneFallback};
pub use record::{repeat_for_purpose, AssignMethod, ZoneAssignment, ZoneMap};
pub use secondary::{assign_secondary, SecondaryOutcome};
pub use work::{
    assign_work, expand_work, group_by_origin, solve_origin, work_demand, OriginOutcome,
    OriginProblem, WorkDemand, WorkDemandOutcome, WorkOutput,
};
