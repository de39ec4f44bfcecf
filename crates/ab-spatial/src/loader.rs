//! CSV loaders for the spatial inputs.
//!
//! # CSV formats
//!
//! Zones (`parent_code` may be empty):
//!
//! ```csv
//! zone_code,lat,lon,parent_code
//! E00056750,53.8008,-1.5491,E02002330
//! ```
//!
//! POIs (`floor_area` may be empty; `categories` is `;`-separated):
//!
//! ```csv
//! zone_code,lat,lon,floor_area,categories
//! E00056750,53.8010,-1.5480,420.0,shop;work
//! ```
//!
//! Travel times (`day_type` and `time_of_day` empty for a time-independent
//! value):
//!
//! ```csv
//! origin,destination,mode,day_type,time_of_day,minutes
//! E00056750,E00056751,car,weekday,morning,7.5
//! E00056750,E00056751,walk,,,21.0
//! ```
//!
//! Observed commuting flows (area codes at the matrix's level):
//!
//! ```csv
//! origin,destination,count
//! E02002330,E02002331,118
//! ```
//!
//! Every zone code referenced by POI or travel-time rows must exist in the
//! zone table.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ab_core::{Category, DayType, GeoPoint, TimeOfDay, TravelMode};

use crate::{
    CommuteLevel, OdMatrix, PoiIndex, SpatialError, SpatialResult, TravelTimeMatrix, ZoneIndex,
    ZoneIndexBuilder,
};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ZoneRecord {
    zone_code:   String,
    lat:         f64,
    lon:         f64,
    parent_code: Option<String>,
}

#[derive(Deserialize)]
struct PoiRecord {
    zone_code:  String,
    lat:        f64,
    lon:        f64,
    floor_area: Option<f64>,
    categories: String,
}

#[derive(Deserialize)]
struct TravelRecord {
    origin:      String,
    destination: String,
    mode:        String,
    day_type:    Option<String>,
    time_of_day: Option<String>,
    minutes:     f64,
}

#[derive(Deserialize)]
struct OdRecord {
    origin:      String,
    destination: String,
    count:       f64,
}

fn parse_err(e: csv::Error) -> SpatialError {
    SpatialError::Parse(e.to_string())
}

// ── Zones ─────────────────────────────────────────────────────────────────────

pub fn load_zones_csv(path: &Path) -> SpatialResult<ZoneIndex> {
    let file = std::fs::File::open(path)?;
    load_zones_reader(file)
}

/// Like [`load_zones_csv`] but accepts any `Read` source.
pub fn load_zones_reader<R: Read>(reader: R) -> SpatialResult<ZoneIndex> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = ZoneIndexBuilder::new();
    for result in csv_reader.deserialize::<ZoneRecord>() {
        let row = result.map_err(parse_err)?;
        builder.add_zone(
            &row.zone_code,
            GeoPoint::new(row.lat, row.lon),
            row.parent_code.as_deref(),
        )?;
    }
    Ok(builder.build())
}

// ── POIs ──────────────────────────────────────────────────────────────────────

pub fn load_pois_csv(path: &Path, zones: &ZoneIndex) -> SpatialResult<PoiIndex> {
    let file = std::fs::File::open(path)?;
    load_pois_reader(file, zones)
}

/// Like [`load_pois_csv`] but accepts any `Read` source.
pub fn load_pois_reader<R: Read>(reader: R, zones: &ZoneIndex) -> SpatialResult<PoiIndex> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut index = PoiIndex::new();
    for result in csv_reader.deserialize::<PoiRecord>() {
        let row = result.map_err(parse_err)?;
        let zone = zones.resolve(&row.zone_code)?;
        let categories: Vec<Category> = row
            .categories
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Category::new)
            .collect();
        index.insert(zone, GeoPoint::new(row.lat, row.lon), row.floor_area, categories)?;
    }
    Ok(index)
}

// ── Travel times ──────────────────────────────────────────────────────────────

pub fn load_travel_times_csv(path: &Path, zones: &ZoneIndex) -> SpatialResult<TravelTimeMatrix> {
    let file = std::fs::File::open(path)?;
    load_travel_times_reader(file, zones)
}

/// Like [`load_travel_times_csv`] but accepts any `Read` source.
pub fn load_travel_times_reader<R: Read>(
    reader: R,
    zones: &ZoneIndex,
) -> SpatialResult<TravelTimeMatrix> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut matrix = TravelTimeMatrix::new();
    for result in csv_reader.deserialize::<TravelRecord>() {
        let row = result.map_err(parse_err)?;
        let from = zones.resolve(&row.origin)?;
        let to = zones.resolve(&row.destination)?;
        let mode: TravelMode = row.mode.parse()?;
        let day = row.day_type.as_deref().map(DayType::parse).transpose()?;
        let time = row.time_of_day.as_deref().map(TimeOfDay::parse).transpose()?;
        if day.is_some() != time.is_some() {
            return Err(SpatialError::Parse(format!(
                "travel time {}→{}: day_type and time_of_day must both be set or both empty",
                row.origin, row.destination
            )));
        }
        matrix.insert(from, to, mode, day, time, row.minutes)?;
    }
    Ok(matrix)
}

// ── Observed flows ────────────────────────────────────────────────────────────

pub fn load_od_csv(path: &Path, level: CommuteLevel) -> SpatialResult<OdMatrix> {
    let file = std::fs::File::open(path)?;
    load_od_reader(file, level)
}

/// Like [`load_od_csv`] but accepts any `Read` source.
pub fn load_od_reader<R: Read>(reader: R, level: CommuteLevel) -> SpatialResult<OdMatrix> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut od = OdMatrix::new(level);
    for result in csv_reader.deserialize::<OdRecord>() {
        let row = result.map_err(parse_err)?;
        od.add(&row.origin, &row.destination, row.count)?;
    }
    Ok(od)
}
