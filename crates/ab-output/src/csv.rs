//! CSV backend.
//!
//! Creates two files in the output directory:
//! - `assignments.csv`
//! - `diagnostics.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::AssignmentWriter;
use crate::{AssignmentRow, DiagnosticRow, OutputResult};

pub const ASSIGNMENT_HEADER: [&str; 10] = [
    "activity_id",
    "person_id",
    "household_id",
    "seq",
    "purpose",
    "zone",
    "facility_id",
    "lat",
    "lon",
    "method",
];

pub const DIAGNOSTIC_HEADER: [&str; 3] = ["kind", "unit", "detail"];

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub struct CsvWriter {
    assignments: Writer<File>,
    diagnostics: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Create both files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut assignments = Writer::from_path(dir.join("assignments.csv"))?;
        assignments.write_record(ASSIGNMENT_HEADER)?;

        let mut diagnostics = Writer::from_path(dir.join("diagnostics.csv"))?;
        diagnostics.write_record(DIAGNOSTIC_HEADER)?;

        Ok(Self { assignments, diagnostics, finished: false })
    }
}

impl AssignmentWriter for CsvWriter {
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()> {
        for row in rows {
            self.assignments.write_record(&[
                row.activity_id.to_string(),
                row.person_id.to_string(),
                row.household_id.to_string(),
                row.seq.to_string(),
                row.purpose.to_string(),
                row.zone.clone().unwrap_or_default(),
                opt(row.facility_id),
                opt(row.lat),
                opt(row.lon),
                row.method.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()> {
        for row in rows {
            self.diagnostics.write_record([row.kind, row.unit.as_str(), row.detail.as_str()])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.assignments.flush()?;
        self.diagnostics.flush()?;
        Ok(())
    }
}
