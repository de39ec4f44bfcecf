//! `ab-output`: writers for the final assignments and run diagnostics.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                  |
//! |-----------|---------|------------------------------------------------|
//! | *(none)*  | CSV     | `assignments.csv`, `diagnostics.csv`           |
//! | `sqlite`  | SQLite  | `output.db`                                    |
//! | `parquet` | Parquet | `assignments.parquet`, `diagnostics.parquet`   |
//!
//! All backends implement [`AssignmentWriter`] and are driven by
//! [`OutputObserver`], which implements `ab_pipeline::PipelineObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ab_output::{CsvWriter, OutputObserver};
//!
//! let mut obs = OutputObserver::new(CsvWriter::new(Path::new("./output"))?);
//! pipeline.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::OutputObserver;
pub use row::{AssignmentRow, DiagnosticRow};
pub use writer::AssignmentWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
