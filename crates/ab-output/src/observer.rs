//! `OutputObserver<W>`: bridges `PipelineObserver` to an `AssignmentWriter`.

use log::info;

use ab_pipeline::{PipelineObserver, RunOutput};

use crate::row::{AssignmentRow, DiagnosticRow};
use crate::writer::AssignmentWriter;
use crate::{OutputError, OutputResult};

/// A [`PipelineObserver`] that writes the final assignments and diagnostics
/// to any [`AssignmentWriter`] backend.
///
/// Observer callbacks return nothing, so write errors are stored.  After
/// `pipeline.run()` returns, check with [`take_error`][Self::take_error].
pub struct OutputObserver<W: AssignmentWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: AssignmentWriter> OutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write(&mut self, output: &RunOutput) -> OutputResult<()> {
        let rows: Vec<AssignmentRow> = output.assignments.iter().map(AssignmentRow::from).collect();
        self.writer.write_assignments(&rows)?;
        let diags = DiagnosticRow::collect(&output.diagnostics);
        self.writer.write_diagnostics(&diags)?;
        self.writer.finish()?;
        info!("wrote {} assignments and {} diagnostics", rows.len(), diags.len());
        Ok(())
    }
}

impl<W: AssignmentWriter> PipelineObserver for OutputObserver<W> {
    fn on_run_end(&mut self, output: &RunOutput) {
        if let Err(e) = self.write(output) {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}
