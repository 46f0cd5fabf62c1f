use thiserror::Error;

use super::model::{CollisionTable, InjuryCategory};

// ---------------------------------------------------------------------------
// Contract violations
// ---------------------------------------------------------------------------

/// Rejected query input. These are caller contract violations, not data
/// conditions: out-of-range widget values and unknown category labels are
/// refused deterministically instead of being clamped or defaulted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("injury threshold {0} is outside 0..={MAX_INJURY_THRESHOLD}")]
    ThresholdOutOfRange(u32),
    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u32),
    #[error("unknown affected class '{0}'")]
    UnknownCategory(String),
}

/// Upper bound of the injured-persons slider.
pub const MAX_INJURY_THRESHOLD: u32 = 19;

/// Number of streets shown in the dangerous-streets ranking.
pub const TOP_STREETS: usize = 5;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Rows where the total injured-persons count is at least `threshold`.
///
/// Row order is preserved. Rows with a missing count never match, so they
/// are excluded even at threshold 0; this mirrors how the injury map treats
/// unknown severity.
pub fn filter_by_min_injured(
    table: &CollisionTable,
    threshold: u32,
) -> Result<CollisionTable, QueryError> {
    if threshold > MAX_INJURY_THRESHOLD {
        return Err(QueryError::ThresholdOutOfRange(threshold));
    }
    let records = table
        .iter()
        .filter(|r| r.persons_injured.is_some_and(|n| n >= threshold))
        .cloned()
        .collect();
    Ok(CollisionTable::new(records))
}

/// Rows whose crash timestamp falls within the given hour of day.
///
/// Rows without a parseable timestamp belong to no hour bucket.
pub fn filter_by_hour(table: &CollisionTable, hour: u32) -> Result<CollisionTable, QueryError> {
    if hour > 23 {
        return Err(QueryError::HourOutOfRange(hour));
    }
    let records = table
        .iter()
        .filter(|r| r.hour() == Some(hour))
        .cloned()
        .collect();
    Ok(CollisionTable::new(records))
}

// ---------------------------------------------------------------------------
// Dangerous-streets ranking
// ---------------------------------------------------------------------------

/// Top `n` streets by the injured count of the selected affected class.
///
/// Rows with at least one such injury are sorted descending by that count
/// (stable, so ties keep original row order), rows without a street name are
/// dropped, and the first `n` remain.
pub fn top_streets_by_category(
    table: &CollisionTable,
    category: InjuryCategory,
    n: usize,
) -> Vec<(String, u32)> {
    let mut ranked: Vec<(&str, u32)> = table
        .iter()
        .filter_map(|r| {
            let count = category.injured_count(r).filter(|&c| c >= 1)?;
            let street = r.on_street.as_deref()?;
            Some((street, count))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(street, count)| (street.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CollisionRecord;
    use chrono::NaiveDate;

    fn rec(injured: Option<u32>, hour: u32) -> CollisionRecord {
        CollisionRecord {
            date_time: NaiveDate::from_ymd_opt(2019, 9, 1)
                .unwrap()
                .and_hms_opt(hour, 15, 0),
            latitude: 40.7,
            longitude: -73.9,
            persons_injured: injured,
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

    fn street_rec(street: Option<&str>, pedestrians: u32) -> CollisionRecord {
        CollisionRecord {
            on_street: street.map(str::to_string),
            pedestrians_injured: Some(pedestrians),
            ..rec(Some(0), 12)
        }
    }

    fn scenario_table() -> CollisionTable {
        CollisionTable::new(vec![rec(Some(0), 10), rec(Some(2), 10), rec(Some(5), 14)])
    }

    #[test]
    fn min_injured_keeps_matching_rows_in_order() {
        let table = scenario_table();
        let filtered = filter_by_min_injured(&table, 2).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.records[0].persons_injured, Some(2));
        assert_eq!(filtered.records[1].persons_injured, Some(5));
    }

    #[test]
    fn min_injured_holds_for_every_threshold() {
        let mut table = scenario_table();
        table.records.push(CollisionRecord {
            persons_injured: None,
            ..rec(Some(0), 10)
        });
        // A row with an unknown injured count matches no threshold, not even 0.
        let at_zero = filter_by_min_injured(&table, 0).unwrap();
        assert_eq!(at_zero.len(), 3);
        assert!(at_zero.iter().all(|r| r.persons_injured.is_some()));
        for t in 0..=MAX_INJURY_THRESHOLD {
            let filtered = filter_by_min_injured(&table, t).unwrap();
            assert!(filtered
                .iter()
                .all(|r| r.persons_injured.is_some_and(|n| n >= t)));
            assert!(filtered.len() <= table.len());
        }
    }

    #[test]
    fn min_injured_rejects_out_of_range_threshold() {
        let table = scenario_table();
        assert_eq!(
            filter_by_min_injured(&table, 20).unwrap_err(),
            QueryError::ThresholdOutOfRange(20)
        );
    }

    #[test]
    fn hour_filter_matches_timestamp_hour() {
        let table = scenario_table();
        let at_ten = filter_by_hour(&table, 10).unwrap();
        assert_eq!(at_ten.len(), 2);
        let at_fourteen = filter_by_hour(&table, 14).unwrap();
        assert_eq!(at_fourteen.len(), 1);
    }

    #[test]
    fn hour_filter_rejects_out_of_range_hour() {
        let table = scenario_table();
        assert_eq!(
            filter_by_hour(&table, 24).unwrap_err(),
            QueryError::HourOutOfRange(24)
        );
    }

    #[test]
    fn hour_buckets_partition_the_table() {
        let mut table = scenario_table();
        // A row without a timestamp belongs to no bucket.
        table.records.push(CollisionRecord {
            date_time: None,
            ..rec(Some(1), 0)
        });
        let with_timestamp = table.iter().filter(|r| r.date_time.is_some()).count();
        let total: usize = (0..24)
            .map(|h| filter_by_hour(&table, h).unwrap().len())
            .sum();
        assert_eq!(total, with_timestamp);
    }

    #[test]
    fn top_streets_are_sorted_with_stable_ties() {
        let table = CollisionTable::new(vec![
            street_rec(Some("FLATBUSH AVENUE"), 2),
            street_rec(Some("BROADWAY"), 4),
            street_rec(Some("JAMAICA AVENUE"), 2),
            street_rec(Some("GRAND CONCOURSE"), 0),
            street_rec(None, 7),
        ]);
        let top = top_streets_by_category(&table, InjuryCategory::Pedestrians, TOP_STREETS);
        // Unnamed and zero-injury rows are excluded; the tie between the two
        // 2-injury streets keeps file order.
        assert_eq!(
            top,
            vec![
                ("BROADWAY".to_string(), 4),
                ("FLATBUSH AVENUE".to_string(), 2),
                ("JAMAICA AVENUE".to_string(), 2),
            ]
        );
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_streets_truncates_to_n() {
        let table = CollisionTable::new(
            (0..10)
                .map(|i| street_rec(Some(&format!("STREET {i}")), 1))
                .collect(),
        );
        let top = top_streets_by_category(&table, InjuryCategory::Pedestrians, TOP_STREETS);
        assert_eq!(top.len(), TOP_STREETS);
    }
}
