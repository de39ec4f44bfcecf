//! SQLite backend (feature `sqlite`).
//!
//! Creates `output.db` in the output directory with the tables
//! `assignments` and `diagnostics`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::AssignmentWriter;
use crate::{AssignmentRow, DiagnosticRow, OutputResult};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS assignments (
                 activity_id  INTEGER PRIMARY KEY,
                 person_id    INTEGER NOT NULL,
                 household_id INTEGER NOT NULL,
                 seq          INTEGER NOT NULL,
                 purpose      TEXT    NOT NULL,
                 zone         TEXT,
                 facility_id  INTEGER,
                 lat          REAL,
                 lon          REAL,
                 method       TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS diagnostics (
                 kind   TEXT NOT NULL,
                 unit   TEXT NOT NULL,
                 detail TEXT NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl AssignmentWriter for SqliteWriter {
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO assignments \
                 (activity_id, person_id, household_id, seq, purpose, zone, facility_id, lat, lon, method) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.activity_id,
                    row.person_id,
                    row.household_id,
                    row.seq,
                    row.purpose,
                    row.zone,
                    row.facility_id,
                    row.lat,
                    row.lon,
                    row.method,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO diagnostics (kind, unit, detail) VALUES (?1, ?2, ?3)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.kind, row.unit, row.detail])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
