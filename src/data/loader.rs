use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;

use super::model::{CollisionRecord, CollisionTable};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fixed location of the collision export. Not configurable.
pub const DATA_PATH: &str = "dataset.csv";

static TABLE: OnceCell<Arc<CollisionTable>> = OnceCell::new();

/// Dataset load failure. Fatal: the dashboard does not start without data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] csv::Error),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Process-wide handle to the collision table.
///
/// The first call reads [`DATA_PATH`]; every later call returns the same
/// `Arc` without touching the file. There is no reload mechanism.
pub fn shared() -> Result<Arc<CollisionTable>, LoadError> {
    TABLE
        .get_or_try_init(|| load(Path::new(DATA_PATH)).map(Arc::new))
        .cloned()
}

/// Read and normalize a collision CSV. Pure: no caching, no global state.
///
/// Normalization, in order: headers are lower-cased (the historical
/// `longtitude` misspelling is accepted and renamed), the crash date and
/// time columns are merged into one `date_time` field per row, and rows
/// missing latitude or longitude are dropped. Malformed numeric or date
/// cells become `None` rather than failing the load.
pub fn load(path: &Path) -> Result<CollisionTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loading collision dataset from {}", path.display());
    from_reader(file)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

const REQUIRED_COLUMNS: [&str; 4] = ["crash_date", "crash_time", "latitude", "longitude"];

/// One row as it appears in the file, before normalization. Every field is
/// kept as text so that malformed cells degrade to `None` instead of
/// aborting the load.
#[derive(Debug, Deserialize)]
struct RawRecord {
    crash_date: Option<String>,
    crash_time: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    #[serde(default)]
    number_of_persons_injured: Option<String>,
    #[serde(default)]
    number_of_pedestrians_injured: Option<String>,
    #[serde(default)]
    number_of_cyclist_injured: Option<String>,
    #[serde(default)]
    number_of_motorist_injured: Option<String>,
    #[serde(default)]
    number_of_persons_killed: Option<String>,
    #[serde(default)]
    borough: Option<String>,
    #[serde(default)]
    on_street_name: Option<String>,
    #[serde(default)]
    off_street_name: Option<String>,
    #[serde(default)]
    contributing_factor_vehicle_1: Option<String>,
    #[serde(default)]
    contributing_factor_vehicle_2: Option<String>,
    #[serde(default)]
    vehicle_type_code_1: Option<String>,
    #[serde(default)]
    vehicle_type_code_2: Option<String>,
}

impl RawRecord {
    /// Convert to a typed record, or `None` when a coordinate is missing.
    fn into_record(self) -> Option<CollisionRecord> {
        let latitude = parse_coord(self.latitude.as_deref())?;
        let longitude = parse_coord(self.longitude.as_deref())?;
        Some(CollisionRecord {
            date_time: parse_date_time(self.crash_date.as_deref(), self.crash_time.as_deref()),
            latitude,
            longitude,
            persons_injured: parse_count(self.number_of_persons_injured.as_deref()),
            pedestrians_injured: parse_count(self.number_of_pedestrians_injured.as_deref()),
            cyclists_injured: parse_count(self.number_of_cyclist_injured.as_deref()),
            motorists_injured: parse_count(self.number_of_motorist_injured.as_deref()),
            persons_killed: parse_count(self.number_of_persons_killed.as_deref()),
            borough: non_empty(self.borough),
            on_street: non_empty(self.on_street_name),
            off_street: non_empty(self.off_street_name),
            factor_1: non_empty(self.contributing_factor_vehicle_1),
            factor_2: non_empty(self.contributing_factor_vehicle_2),
            vehicle_type_1: non_empty(self.vehicle_type_code_1),
            vehicle_type_2: non_empty(self.vehicle_type_code_2),
        })
    }
}

fn from_reader<R: Read>(input: R) -> Result<CollisionTable, LoadError> {
    let mut reader = csv::Reader::from_reader(input);

    let normalized: StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    for required in REQUIRED_COLUMNS {
        if !normalized.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required));
        }
    }
    reader.set_headers(normalized);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<RawRecord>() {
        match row?.into_record() {
            Some(rec) => records.push(rec),
            None => dropped += 1,
        }
    }
    log::info!(
        "loaded {} collisions ({dropped} rows without coordinates dropped)",
        records.len()
    );
    Ok(CollisionTable::new(records))
}

fn normalize_header(header: &str) -> String {
    let lower = header.trim().to_ascii_lowercase();
    // Historical misspelling in older exports.
    if lower == "longtitude" {
        "longitude".to_string()
    } else {
        lower
    }
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

fn parse_coord(cell: Option<&str>) -> Option<f64> {
    cell?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_count(cell: Option<&str>) -> Option<u32> {
    let text = cell?.trim();
    // Some exports store counts as floats ("2.0").
    text.parse::<u32>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u32)
    })
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Merge the separate date and time columns into one timestamp.
fn parse_date_time(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = date?.trim();
    let time = time?.trim();
    let date = NaiveDate::parse_from_str(date, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = "\
CRASH_DATE,CRASH_TIME,LATITUDE,LONGTITUDE,NUMBER_OF_PERSONS_INJURED,BOROUGH,ON_STREET_NAME
09/01/2019,14:30,40.701,-73.920,2,BROOKLYN,ATLANTIC AVENUE
09/01/2019,14:45,,-73.950,1,QUEENS,NORTHERN BOULEVARD
09/02/2019,0:05,40.712,-74.005,oops,MANHATTAN,
";

    #[test]
    fn headers_are_normalized_and_misspelling_tolerated() {
        let table = from_reader(SAMPLE.as_bytes()).unwrap();
        // Upper-case headers and LONGTITUDE both resolved.
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].longitude, -73.920);
    }

    #[test]
    fn rows_without_coordinates_are_dropped() {
        let table = from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(table.iter().all(|r| r.latitude.is_finite()));
        assert!(!table.iter().any(|r| r.borough.as_deref() == Some("QUEENS")));
    }

    #[test]
    fn date_and_time_are_merged() {
        let table = from_reader(SAMPLE.as_bytes()).unwrap();
        let dt = table.records[0].date_time.unwrap();
        assert_eq!((dt.hour(), dt.minute()), (14, 30));
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2019, 9, 1).unwrap());
    }

    #[test]
    fn malformed_cells_become_missing() {
        let table = from_reader(SAMPLE.as_bytes()).unwrap();
        let manhattan = &table.records[1];
        assert_eq!(manhattan.borough.as_deref(), Some("MANHATTAN"));
        assert_eq!(manhattan.persons_injured, None);
        assert_eq!(manhattan.on_street, None);
    }

    #[test]
    fn loading_twice_yields_identical_tables() {
        let a = from_reader(SAMPLE.as_bytes()).unwrap();
        let b = from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let input = "crash_date,crash_time,latitude\n09/01/2019,14:30,40.7\n";
        match from_reader(input.as_bytes()) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "longitude"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn absent_file_is_an_error() {
        match load(Path::new("/no/such/dataset.csv")) {
            Err(LoadError::Open { .. }) => {}
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn iso_dates_and_seconds_are_accepted() {
        let input = "\
crash_date,crash_time,latitude,longitude
2019-09-01,23:59:30,40.7,-73.9
";
        let table = from_reader(input.as_bytes()).unwrap();
        let dt = table.records[0].date_time.unwrap();
        assert_eq!((dt.hour(), dt.minute()), (23, 59));
    }
}
