//! The `AssignmentWriter` trait implemented by all backends.

use crate::{AssignmentRow, DiagnosticRow, OutputResult};

/// Implemented by the CSV, SQLite and Parquet writers.
pub trait AssignmentWriter {
    /// Append a batch of assignment rows.
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()>;

    /// Append a batch of diagnostic rows.
    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
