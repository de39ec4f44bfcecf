//! Flat row types written by the backends.

use ab_pipeline::{Assignment, RunDiagnostics};

/// One placed (or unplaced) activity.  Missing values are `None` and are
/// written as empty cells or SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRow {
    pub activity_id:  u32,
    pub person_id:    u32,
    pub household_id: u32,
    pub seq:          u16,
    pub purpose:      &'static str,
    /// External zone code.
    pub zone:         Option<String>,
    pub facility_id:  Option<u32>,
    pub lat:          Option<f64>,
    pub lon:          Option<f64>,
    pub method:       String,
}

impl From<&Assignment> for AssignmentRow {
    fn from(a: &Assignment) -> Self {
        AssignmentRow {
            activity_id:  a.activity.0,
            person_id:    a.person.0,
            household_id: a.household.0,
            seq:          a.seq,
            purpose:      a.purpose.as_str(),
            zone:         a.zone_code.clone(),
            facility_id:  a.facility.map(|f| f.0),
            lat:          a.location.map(|p| p.lat),
            lon:          a.location.map(|p| p.lon),
            method:       a.method.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRow {
    pub kind:   &'static str,
    /// The household, person, activity or origin the record is about.
    pub unit:   String,
    pub detail: String,
}

impl DiagnosticRow {
    /// Every record of a run, matching first.
    pub fn collect(diagnostics: &RunDiagnostics) -> Vec<DiagnosticRow> {
        diagnostics
            .records()
            .map(|(kind, unit, detail)| DiagnosticRow { kind, unit, detail })
            .collect()
    }
}
