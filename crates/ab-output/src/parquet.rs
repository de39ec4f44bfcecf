//! Parquet backend (feature `parquet`).
//!
//! Creates `assignments.parquet` and `diagnostics.parquet` in the output
//! directory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt16Builder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::AssignmentWriter;
use crate::{AssignmentRow, DiagnosticRow, OutputResult};

fn assignment_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("activity_id",  DataType::UInt32,  false),
        Field::new("person_id",    DataType::UInt32,  false),
        Field::new("household_id", DataType::UInt32,  false),
        Field::new("seq",          DataType::UInt16,  false),
        Field::new("purpose",      DataType::Utf8,    false),
        Field::new("zone",         DataType::Utf8,    true),
        Field::new("facility_id",  DataType::UInt32,  true),
        Field::new("lat",          DataType::Float64, true),
        Field::new("lon",          DataType::Float64, true),
        Field::new("method",       DataType::Utf8,    false),
    ]))
}

fn diagnostic_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("kind",   DataType::Utf8, false),
        Field::new("unit",   DataType::Utf8, false),
        Field::new("detail", DataType::Utf8, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// `finish()` must be called to write the Parquet footers; files written
/// without it cannot be opened by Parquet readers.
pub struct ParquetWriter {
    assignments: Option<ArrowWriter<File>>,
    diagnostics: Option<ArrowWriter<File>>,
    asg_schema:  Arc<Schema>,
    diag_schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let asg_schema = assignment_schema();
        let diag_schema = diagnostic_schema();

        let assignments = ArrowWriter::try_new(
            File::create(dir.join("assignments.parquet"))?,
            Arc::clone(&asg_schema),
            Some(snappy_props()),
        )?;
        let diagnostics = ArrowWriter::try_new(
            File::create(dir.join("diagnostics.parquet"))?,
            Arc::clone(&diag_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            assignments: Some(assignments),
            diagnostics: Some(diagnostics),
            asg_schema,
            diag_schema,
        })
    }
}

impl AssignmentWriter for ParquetWriter {
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.assignments.as_mut() else {
            return Ok(());
        };

        let mut activity_ids  = UInt32Builder::new();
        let mut person_ids    = UInt32Builder::new();
        let mut household_ids = UInt32Builder::new();
        let mut seqs          = UInt16Builder::new();
        let mut purposes      = StringBuilder::new();
        let mut zones         = StringBuilder::new();
        let mut facility_ids  = UInt32Builder::new();
        let mut lats          = Float64Builder::new();
        let mut lons          = Float64Builder::new();
        let mut methods       = StringBuilder::new();

        for row in rows {
            activity_ids.append_value(row.activity_id);
            person_ids.append_value(row.person_id);
            household_ids.append_value(row.household_id);
            seqs.append_value(row.seq);
            purposes.append_value(row.purpose);
            zones.append_option(row.zone.as_deref());
            facility_ids.append_option(row.facility_id);
            lats.append_option(row.lat);
            lons.append_option(row.lon);
            methods.append_value(&row.method);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.asg_schema),
            vec![
                Arc::new(activity_ids.finish()),
                Arc::new(person_ids.finish()),
                Arc::new(household_ids.finish()),
                Arc::new(seqs.finish()),
                Arc::new(purposes.finish()),
                Arc::new(zones.finish()),
                Arc::new(facility_ids.finish()),
                Arc::new(lats.finish()),
                Arc::new(lons.finish()),
                Arc::new(methods.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.diagnostics.as_mut() else {
            return Ok(());
        };

        let mut kinds   = StringBuilder::new();
        let mut units   = StringBuilder::new();
        let mut details = StringBuilder::new();
        for row in rows {
            kinds.append_value(row.kind);
            units.append_value(&row.unit);
            details.append_value(&row.detail);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.diag_schema),
            vec![
                Arc::new(kinds.finish()),
                Arc::new(units.finish()),
                Arc::new(details.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.assignments.take() {
            w.close()?;
        }
        if let Some(w) = self.diagnostics.take() {
            w.close()?;
        }
        Ok(())
    }
}
