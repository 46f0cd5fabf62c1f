use indexmap::IndexMap;

use super::model::{CollisionTable, NumericColumn};

/// Number of contributing factors shown in the factor ranking.
pub const TOP_FACTORS: usize = 20;

/// Number of vehicle types shown in the vehicle-type breakdown.
pub const TOP_VEHICLE_TYPES: usize = 10;

// ---------------------------------------------------------------------------
// Time groupings
// ---------------------------------------------------------------------------

/// Row count per minute of the hour.
///
/// Meant for a table already filtered to one hour; rows without a timestamp
/// are skipped, so on an hour-filtered table the bins sum to the row count.
pub fn minute_histogram(table: &CollisionTable) -> [usize; 60] {
    let mut bins = [0usize; 60];
    for rec in table.iter() {
        if let Some(minute) = rec.minute() {
            bins[minute as usize] += 1;
        }
    }
    bins
}

/// Row count per hour of day, ascending by hour. Hours with no collisions
/// are omitted, matching a plain group-by over the data.
pub fn hourly_counts(table: &CollisionTable) -> Vec<(u32, usize)> {
    let mut counts = [0usize; 24];
    for rec in table.iter() {
        if let Some(hour) = rec.hour() {
            counts[hour as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .map(|(hour, &n)| (hour as u32, n))
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical groupings
// ---------------------------------------------------------------------------

/// Collision frequency per borough, descending by count. Ties keep
/// first-seen order; rows without a borough are skipped.
pub fn counts_by_borough(table: &CollisionTable) -> Vec<(String, usize)> {
    ranked_counts(table.iter().filter_map(|r| r.borough.as_deref()), usize::MAX)
}

/// Top `n` contributing factors across both factor columns, descending.
pub fn top_factors(table: &CollisionTable, n: usize) -> Vec<(String, usize)> {
    let stacked = table
        .iter()
        .flat_map(|r| [r.factor_1.as_deref(), r.factor_2.as_deref()])
        .flatten();
    ranked_counts(stacked, n)
}

/// Top `n` vehicle types across both vehicle-type columns, descending.
pub fn top_vehicle_types(table: &CollisionTable, n: usize) -> Vec<(String, usize)> {
    let stacked = table
        .iter()
        .flat_map(|r| [r.vehicle_type_1.as_deref(), r.vehicle_type_2.as_deref()])
        .flatten();
    ranked_counts(stacked, n)
}

/// Count occurrences in first-seen order, then stable-sort descending so
/// equal counts keep that order, truncated to `n`.
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>, n: usize) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Severity by site
// ---------------------------------------------------------------------------

/// Total injuries summed over all collisions at one exact coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SeveritySite {
    pub latitude: f64,
    pub longitude: f64,
    pub total_injured: u32,
}

/// Group by exact (latitude, longitude) and sum injured persons.
///
/// Grouping is on the coordinate bit patterns, so only byte-identical
/// positions merge; sites appear in first-seen order. Missing injury counts
/// contribute nothing.
pub fn severity_by_site(table: &CollisionTable) -> Vec<SeveritySite> {
    let mut sites: IndexMap<(u64, u64), SeveritySite> = IndexMap::new();
    for rec in table.iter() {
        let key = (rec.latitude.to_bits(), rec.longitude.to_bits());
        let site = sites.entry(key).or_insert_with(|| SeveritySite {
            latitude: rec.latitude,
            longitude: rec.longitude,
            total_injured: 0,
        });
        site.total_injured += rec.persons_injured.unwrap_or(0);
    }
    sites.into_values().collect()
}

/// Mean (latitude, longitude) of the table, used to center the hour map.
pub fn midpoint(table: &CollisionTable) -> Option<(f64, f64)> {
    if table.is_empty() {
        return None;
    }
    let n = table.len() as f64;
    let (lat_sum, lon_sum) = table
        .iter()
        .fold((0.0, 0.0), |(la, lo), r| (la + r.latitude, lo + r.longitude));
    Some((lat_sum / n, lon_sum / n))
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation over the named numeric columns.
///
/// Rows where either cell is missing are excluded pairwise. The matrix is
/// symmetric; the diagonal is 1.0 for columns with nonzero variance and NaN
/// where a column never varies (or has fewer than two usable rows).
pub fn correlation_matrix(table: &CollisionTable, columns: &[NumericColumn]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        matrix[i][i] = if variance(table, columns[i]) > 0.0 {
            1.0
        } else {
            f64::NAN
        };
        for j in (i + 1)..n {
            let r = pearson(table, columns[i], columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

fn variance(table: &CollisionTable, col: NumericColumn) -> f64 {
    let values: Vec<f64> = table.iter().filter_map(|r| col.value(r)).collect();
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn pearson(table: &CollisionTable, a: NumericColumn, b: NumericColumn) -> f64 {
    let pairs: Vec<(f64, f64)> = table
        .iter()
        .filter_map(|r| Some((a.value(r)?, b.value(r)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CollisionRecord;
    use crate::data::query::filter_by_hour;
    use chrono::NaiveDate;

    fn base() -> CollisionRecord {
        CollisionRecord {
            date_time: NaiveDate::from_ymd_opt(2019, 9, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0),
            latitude: 40.7,
            longitude: -73.9,
            persons_injured: Some(0),
            pedestrians_injured: None,
            cyclists_injured: None,
            motorists_injured: None,
            persons_killed: None,
            borough: None,
            on_street: None,
            off_street: None,
            factor_1: None,
            factor_2: None,
            vehicle_type_1: None,
            vehicle_type_2: None,
        }
    }

    fn at(hour: u32, minute: u32) -> CollisionRecord {
        CollisionRecord {
            date_time: NaiveDate::from_ymd_opt(2019, 9, 1)
                .unwrap()
                .and_hms_opt(hour, minute, 0),
            ..base()
        }
    }

    #[test]
    fn minute_histogram_sums_to_filtered_row_count() {
        let table = CollisionTable::new(vec![at(10, 5), at(10, 5), at(10, 59), at(14, 0)]);
        for hour in [10, 14] {
            let filtered = filter_by_hour(&table, hour).unwrap();
            let bins = minute_histogram(&filtered);
            assert_eq!(bins.iter().sum::<usize>(), filtered.len());
        }
        let at_ten = filter_by_hour(&table, 10).unwrap();
        let bins = minute_histogram(&at_ten);
        assert_eq!(bins[5], 2);
        assert_eq!(bins[59], 1);
    }

    #[test]
    fn hourly_counts_scenario() {
        let table = CollisionTable::new(vec![at(10, 0), at(10, 30), at(14, 15)]);
        assert_eq!(hourly_counts(&table), vec![(10, 2), (14, 1)]);
    }

    #[test]
    fn borough_counts_descend_with_stable_ties() {
        let mut records = Vec::new();
        for borough in ["QUEENS", "BROOKLYN", "BROOKLYN", "BRONX", "QUEENS", "BROOKLYN"] {
            records.push(CollisionRecord {
                borough: Some(borough.to_string()),
                ..base()
            });
        }
        records.push(base()); // no borough, skipped
        let counts = counts_by_borough(&CollisionTable::new(records));
        assert_eq!(
            counts,
            vec![
                ("BROOKLYN".to_string(), 3),
                ("QUEENS".to_string(), 2),
                ("BRONX".to_string(), 1),
            ]
        );
    }

    #[test]
    fn factors_stack_both_columns() {
        let table = CollisionTable::new(vec![
            CollisionRecord {
                factor_1: Some("Driver Inattention".to_string()),
                factor_2: Some("Unsafe Speed".to_string()),
                ..base()
            },
            CollisionRecord {
                factor_1: Some("Unsafe Speed".to_string()),
                ..base()
            },
        ]);
        let top = top_factors(&table, 20);
        assert_eq!(top[0], ("Unsafe Speed".to_string(), 2));
        assert_eq!(top[1], ("Driver Inattention".to_string(), 1));
    }

    #[test]
    fn vehicle_types_truncate_to_n() {
        let records = (0..6)
            .map(|i| CollisionRecord {
                vehicle_type_1: Some(format!("TYPE {i}")),
                ..base()
            })
            .collect();
        let top = top_vehicle_types(&CollisionTable::new(records), 3);
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn severity_groups_exact_coordinates() {
        let table = CollisionTable::new(vec![
            CollisionRecord {
                persons_injured: Some(2),
                ..base()
            },
            CollisionRecord {
                persons_injured: Some(3),
                ..base()
            },
            CollisionRecord {
                latitude: 40.8,
                persons_injured: None,
                ..base()
            },
        ]);
        let sites = severity_by_site(&table);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].total_injured, 5);
        assert_eq!(sites[1].total_injured, 0);
    }

    #[test]
    fn midpoint_averages_coordinates() {
        let table = CollisionTable::new(vec![
            CollisionRecord {
                latitude: 40.0,
                longitude: -74.0,
                ..base()
            },
            CollisionRecord {
                latitude: 41.0,
                longitude: -73.0,
                ..base()
            },
        ]);
        assert_eq!(midpoint(&table), Some((40.5, -73.5)));
        assert_eq!(midpoint(&CollisionTable::default()), None);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let records = (0..5)
            .map(|i| CollisionRecord {
                persons_injured: Some(2 * i),
                pedestrians_injured: Some(i),
                cyclists_injured: Some(10 - i),
                persons_killed: Some(i % 2),
                ..base()
            })
            .collect();
        let table = CollisionTable::new(records);
        let cols = [
            NumericColumn::PersonsInjured,
            NumericColumn::PedestriansInjured,
            NumericColumn::CyclistsInjured,
            NumericColumn::PersonsKilled,
        ];
        let m = correlation_matrix(&table, &cols);
        for i in 0..cols.len() {
            assert_eq!(m[i][i], 1.0);
            for j in 0..cols.len() {
                assert_eq!(m[i][j].to_bits(), m[j][i].to_bits());
            }
        }
        // Pedestrian and cyclist counts move in exact opposition.
        assert!((m[1][2] + 1.0).abs() < 1e-12);
        // Total injured tracks pedestrians exactly.
        assert!((m[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_column_yields_nan() {
        let records = (0..4)
            .map(|i| CollisionRecord {
                pedestrians_injured: Some(i),
                motorists_injured: Some(3),
                ..base()
            })
            .collect();
        let table = CollisionTable::new(records);
        let cols = [
            NumericColumn::PedestriansInjured,
            NumericColumn::MotoristsInjured,
        ];
        let m = correlation_matrix(&table, &cols);
        assert!(m[1][1].is_nan());
        assert!(m[0][1].is_nan());
    }
}
