//! Stage observer trait for progress reporting and output collection.

use std::fmt;

use log::info;

use crate::RunOutput;

/// The stages of a run, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Matching,
    Education,
    Work,
    Secondary,
    Facility,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Matching,
        Stage::Education,
        Stage::Work,
        Stage::Secondary,
        Stage::Facility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Matching  => "matching",
            Stage::Education => "education",
            Stage::Work      => "work",
            Stage::Secondary => "secondary",
            Stage::Facility  => "facility",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks invoked by [`Pipeline::run`][crate::Pipeline::run] around each
/// stage.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: stage timer
///
/// ```rust,ignore
/// struct Timer(Option<Instant>);
///
/// impl PipelineObserver for Timer {
///     fn on_stage_start(&mut self, _stage: Stage) { self.0 = Some(Instant::now()); }
///     fn on_stage_end(&mut self, stage: Stage, units: usize) {
///         println!("{stage}: {units} units in {:?}", self.0.take().unwrap().elapsed());
///     }
/// }
/// ```
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: Stage) {}

    /// `units` is the number of households, chains, origins or activities
    /// the stage processed.
    fn on_stage_end(&mut self, _stage: Stage, _units: usize) {}

    /// Called once with the complete output.
    fn on_run_end(&mut self, _output: &RunOutput) {}
}

/// A [`PipelineObserver`] that does nothing.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Logs stage boundaries and the run-end diagnostic summary at `info`.
#[derive(Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_stage_start(&mut self, stage: Stage) {
        info!("stage {stage}: start");
    }

    fn on_stage_end(&mut self, stage: Stage, units: usize) {
        info!("stage {stage}: {units} units");
    }

    fn on_run_end(&mut self, output: &RunOutput) {
        info!(
            "run complete: {} activities, {} unassigned",
            output.assignments.len(),
            output.assignments.iter().filter(|a| a.zone.is_none()).count()
        );
        for (kind, n) in output.diagnostics.summary() {
            info!("  {kind}: {n}");
        }
    }
}
