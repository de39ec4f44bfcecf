//! `ab-pipeline`: run the matching and assignment stages over a whole
//! synthetic population.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`config`]   | `PipelineConfig`                                          |
//! | [`builder`]  | `PipelineBuilder` (input validation)                      |
//! | [`pipeline`] | `Pipeline::run`, `Assignment`, `RunOutput`, `RunDiagnostics` |
//! | [`observer`] | `PipelineObserver`, `Stage`, `NoopObserver`, `LogObserver` |
//! | [`error`]    | `PipelineError`, `PipelineResult<T>`                      |
//!
//! # Determinism
//!
//! Every random draw comes from a stream keyed by the run seed, the stage
//! and the unit (household, origin or activity) being processed.  Output is
//! therefore identical across runs with the same seed and inputs, with or
//! without the `parallel` feature.

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use observer::{LogObserver, NoopObserver, PipelineObserver, Stage};
pub use pipeline::{Assignment, Pipeline, RunDiagnostics, RunOutput};
