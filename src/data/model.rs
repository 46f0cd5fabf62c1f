use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::query::QueryError;

// ---------------------------------------------------------------------------
// CollisionRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single reported motor-vehicle collision.
///
/// Latitude and longitude are never missing: rows lacking either are dropped
/// at load time. Every other cell is optional: a malformed or empty field in
/// the source file becomes `None` rather than an error, and aggregations skip
/// `None` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    /// Crash date and time merged into one timestamp.
    pub date_time: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub persons_injured: Option<u32>,
    pub pedestrians_injured: Option<u32>,
    pub cyclists_injured: Option<u32>,
    pub motorists_injured: Option<u32>,
    pub persons_killed: Option<u32>,
    pub borough: Option<String>,
    pub on_street: Option<String>,
    pub off_street: Option<String>,
    pub factor_1: Option<String>,
    pub factor_2: Option<String>,
    pub vehicle_type_1: Option<String>,
    pub vehicle_type_2: Option<String>,
}

impl CollisionRecord {
    /// Hour-of-day component of the timestamp, if present.
    pub fn hour(&self) -> Option<u32> {
        use chrono::Timelike;
        self.date_time.map(|dt| dt.hour())
    }

    /// Minute-of-hour component of the timestamp, if present.
    pub fn minute(&self) -> Option<u32> {
        use chrono::Timelike;
        self.date_time.map(|dt| dt.minute())
    }
}

// ---------------------------------------------------------------------------
// CollisionTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered collection of collision records.
///
/// Row order is source-file order after the missing-coordinate drop.
/// Immutable after load: query and aggregation functions derive new tables
/// or series, never mutate this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionTable {
    pub records: Vec<CollisionRecord>,
}

impl CollisionTable {
    pub fn new(records: Vec<CollisionRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollisionRecord> {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// InjuryCategory – the affected-class selector
// ---------------------------------------------------------------------------

/// Closed set of affected classes for the dangerous-streets ranking.
///
/// Each variant maps to the injured-count column it ranks by; unknown labels
/// are rejected in [`FromStr`] instead of being silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjuryCategory {
    Pedestrians,
    Cyclists,
    Motorists,
}

impl InjuryCategory {
    pub const ALL: [InjuryCategory; 3] = [
        InjuryCategory::Pedestrians,
        InjuryCategory::Cyclists,
        InjuryCategory::Motorists,
    ];

    /// The injured count this category ranks by.
    pub fn injured_count(&self, rec: &CollisionRecord) -> Option<u32> {
        match self {
            InjuryCategory::Pedestrians => rec.pedestrians_injured,
            InjuryCategory::Cyclists => rec.cyclists_injured,
            InjuryCategory::Motorists => rec.motorists_injured,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InjuryCategory::Pedestrians => "Pedestrians",
            InjuryCategory::Cyclists => "Cyclists",
            InjuryCategory::Motorists => "Motorists",
        }
    }
}

impl fmt::Display for InjuryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InjuryCategory {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pedestrians" => Ok(InjuryCategory::Pedestrians),
            "Cyclists" => Ok(InjuryCategory::Cyclists),
            "Motorists" => Ok(InjuryCategory::Motorists),
            other => Err(QueryError::UnknownCategory(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// NumericColumn – correlation matrix column selector
// ---------------------------------------------------------------------------

/// Numeric columns available to the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    PersonsInjured,
    PersonsKilled,
    PedestriansInjured,
    CyclistsInjured,
    MotoristsInjured,
}

impl NumericColumn {
    /// Default column set for the correlation heatmap.
    pub const SEVERITY: [NumericColumn; 4] = [
        NumericColumn::PersonsKilled,
        NumericColumn::PedestriansInjured,
        NumericColumn::CyclistsInjured,
        NumericColumn::MotoristsInjured,
    ];

    pub fn value(&self, rec: &CollisionRecord) -> Option<f64> {
        let v = match self {
            NumericColumn::PersonsInjured => rec.persons_injured,
            NumericColumn::PersonsKilled => rec.persons_killed,
            NumericColumn::PedestriansInjured => rec.pedestrians_injured,
            NumericColumn::CyclistsInjured => rec.cyclists_injured,
            NumericColumn::MotoristsInjured => rec.motorists_injured,
        };
        v.map(f64::from)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NumericColumn::PersonsInjured => "persons injured",
            NumericColumn::PersonsKilled => "persons killed",
            NumericColumn::PedestriansInjured => "pedestrians injured",
            NumericColumn::CyclistsInjured => "cyclists injured",
            NumericColumn::MotoristsInjured => "motorists injured",
        }
    }
}
