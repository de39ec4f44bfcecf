//! `ab-matching`: attach a travel-diary respondent to every synthetic
//! person.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`config`]      | `MatchingConfig`, `IndividualRelaxation`               |
//! | [`household`]   | `HouseholdIndex`: exact categorical lookup per relaxation level |
//! | [`pool`]        | `CandidatePool`: remove-on-match diary members         |
//! | [`individual`]  | age-band + sex matching within one household draw      |
//! | [`matcher`]     | `DiaryMatcher`, `HouseholdOutcome`, `MatchOutput`      |
//! | [`diagnostics`] | `MatchDiagnostic`, `MatchDiagnostics`                  |
//! | [`error`]       | `MatchError`, `MatchResult<T>`                         |
//!
//! # Two tiers
//!
//! 1. **Household.** Exact match on the required attributes plus as many
//!    optional attributes as still yield a candidate, dropping optional
//!    columns from the end of the list.  Up to `n_matches` candidates are
//!    kept and one is drawn uniformly.
//! 2. **Individual.** Inside the drawn diary household, each member is
//!    paired with a diary member of the same age band and sex, without
//!    replacement; the criteria widen level by level per
//!    [`IndividualRelaxation`].
//!
//! Every household is an independent unit with its own RNG stream, so
//! [`DiaryMatcher::match_household`] can run on any thread in any order.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod household;
pub mod individual;
pub mod matcher;
pub mod pool;


pub use config::{IndividualRelaxation, MatchingConfig};
pub use diagnostics::{MatchDiagnostic, MatchDiagnostics};
pub use error::{MatchError, MatchResult};
pub use household::HouseholdIndex;
pub use matcher::{DiaryMatcher, HouseholdMatch, HouseholdOutcome, MatchLevel, MatchOutput, PersonMatch};
pub use pool::CandidatePool;
