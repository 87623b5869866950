//! Preprocessing
//!
//! This stage turns raw loaded rows into the joined tables the classifier
//! consumes:
//! - inner join of hourly steps and hourly intensity on (user, hour)
//! - daily derived fields (total active distance, activity ratio)
//! - per-user baselines (median hourly steps, p75 activity ratio)

use std::collections::HashMap;

use crate::loader::{DailyRow, IntensityRow, StepsRow};
use crate::types::{DailyRecord, HourlyRecord, UserBaseline};

/// Outcome of the hourly steps x intensity join
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyJoin {
    /// Joined records, sorted ascending by (user, hour)
    pub records: Vec<HourlyRecord>,
    /// Step rows dropped: unparseable timestamp or no intensity match
    pub step_rows_unmatched: usize,
    /// Intensity rows dropped: unparseable timestamp or no step match
    pub intensity_rows_unmatched: usize,
    /// Rows across both tables with an unparseable timestamp
    pub unparseable_timestamps: usize,
}

/// Inner-join the two hourly tables on (user, hour).
///
/// Rows with an unparseable timestamp cannot participate in the join key and
/// are dropped. Output ordering is the classifier's contract: ascending by
/// user, then hour.
pub fn join_hourly(steps: &[StepsRow], intensity: &[IntensityRow]) -> HourlyJoin {
    let mut unparseable = 0;

    let mut intensity_by_key: HashMap<(u64, chrono::NaiveDateTime), u32> = HashMap::new();
    for row in intensity {
        match row.hour {
            Some(hour) => {
                intensity_by_key.insert((row.user_id, hour), row.total_intensity);
            }
            None => unparseable += 1,
        }
    }
    let intensity_total = intensity_by_key.len();

    let mut records = Vec::new();
    let mut step_rows_unmatched = 0;
    let mut matched_intensity = 0;
    for row in steps {
        let hour = match row.hour {
            Some(hour) => hour,
            None => {
                unparseable += 1;
                step_rows_unmatched += 1;
                continue;
            }
        };
        match intensity_by_key.get(&(row.user_id, hour)) {
            Some(&total_intensity) => {
                matched_intensity += 1;
                records.push(HourlyRecord {
                    user_id: row.user_id,
                    hour,
                    step_count: row.step_count,
                    total_intensity,
                    date: hour.date(),
                });
            }
            None => step_rows_unmatched += 1,
        }
    }

    records.sort_by_key(|r| (r.user_id, r.hour));

    HourlyJoin {
        records,
        step_rows_unmatched,
        intensity_rows_unmatched: intensity_total.saturating_sub(matched_intensity),
        unparseable_timestamps: unparseable,
    }
}

/// Outcome of daily-row preparation
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPrep {
    pub records: Vec<DailyRecord>,
    /// Rows dropped for an unparseable date
    pub unparseable_dates: usize,
    /// Rows dropped by the minimum-total-steps floor
    pub below_step_floor: usize,
    /// Rows kept whose activity ratio is undefined (zero steps)
    pub without_ratio: usize,
}

/// Derive daily fields and apply the step floor.
///
/// `total_active_distance = very + moderately active distance`;
/// `am_step_ratio = active minutes / total steps`, undefined when the
/// denominator is zero. The zero-steps case is already excluded by any
/// positive `min_total_steps`, but the ratio guards it independently.
pub fn prepare_daily(rows: &[DailyRow], min_total_steps: u32) -> DailyPrep {
    let mut records = Vec::new();
    let mut unparseable_dates = 0;
    let mut below_step_floor = 0;
    let mut without_ratio = 0;

    for row in rows {
        let date = match row.date {
            Some(date) => date,
            None => {
                unparseable_dates += 1;
                continue;
            }
        };
        if row.total_steps <= min_total_steps && min_total_steps > 0 {
            below_step_floor += 1;
            continue;
        }

        let total_active_distance = row.very_active_distance + row.moderately_active_distance;
        let active_minutes = row.very_active_minutes + row.fairly_active_minutes;
        let am_step_ratio = if row.total_steps > 0 {
            Some(f64::from(active_minutes) / f64::from(row.total_steps))
        } else {
            without_ratio += 1;
            None
        };

        records.push(DailyRecord {
            user_id: row.user_id,
            date,
            total_steps: row.total_steps,
            total_distance: row.total_distance,
            very_active_distance: row.very_active_distance,
            moderately_active_distance: row.moderately_active_distance,
            light_active_distance: row.light_active_distance,
            very_active_minutes: row.very_active_minutes,
            fairly_active_minutes: row.fairly_active_minutes,
            total_active_distance,
            am_step_ratio,
        });
    }

    records.sort_by_key(|r| (r.user_id, r.date));

    DailyPrep {
        records,
        unparseable_dates,
        below_step_floor,
        without_ratio,
    }
}

/// Linear-interpolated quantile of an unsorted sample. `None` when empty.
fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Compute per-user baselines from the joined hourly records and prepared
/// daily records. Every user appearing in either table gets an entry; a
/// statistic with no underlying sample stays `None`.
pub fn compute_baselines(
    hourly: &[HourlyRecord],
    daily: &[DailyRecord],
    ratio_percentile: f64,
) -> HashMap<u64, UserBaseline> {
    let mut steps_by_user: HashMap<u64, Vec<f64>> = HashMap::new();
    for record in hourly {
        steps_by_user
            .entry(record.user_id)
            .or_default()
            .push(f64::from(record.step_count));
    }

    let mut ratios_by_user: HashMap<u64, Vec<f64>> = HashMap::new();
    for record in daily {
        // Undefined ratios never reach the percentile input
        if let Some(ratio) = record.am_step_ratio {
            ratios_by_user
                .entry(record.user_id)
                .or_default()
                .push(ratio);
        }
    }

    let mut baselines = HashMap::new();
    for (&user_id, steps) in &steps_by_user {
        baselines.insert(
            user_id,
            UserBaseline {
                user_id,
                median_step_count: quantile(steps, 0.5),
                ratio_p75: None,
            },
        );
    }
    for (&user_id, ratios) in &ratios_by_user {
        let p75 = quantile(ratios, ratio_percentile);
        baselines
            .entry(user_id)
            .or_insert_with(|| UserBaseline {
                user_id,
                median_step_count: None,
                ratio_p75: None,
            })
            .ratio_p75 = p75;
    }

    baselines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn hour(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 4, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn steps_row(user_id: u64, hour: Option<NaiveDateTime>, step_count: u32) -> StepsRow {
        StepsRow {
            user_id,
            hour,
            step_count,
        }
    }

    fn intensity_row(user_id: u64, hour: Option<NaiveDateTime>, total_intensity: u32) -> IntensityRow {
        IntensityRow {
            user_id,
            hour,
            total_intensity,
        }
    }

    fn daily_row(user_id: u64, day: u32, total_steps: u32) -> DailyRow {
        DailyRow {
            user_id,
            date: NaiveDate::from_ymd_opt(2016, 4, day),
            total_steps,
            total_distance: 8.0,
            very_active_distance: 2.0,
            moderately_active_distance: 1.5,
            light_active_distance: 4.0,
            very_active_minutes: 30,
            fairly_active_minutes: 15,
        }
    }

    #[test]
    fn test_join_hourly_inner_semantics() {
        let steps = vec![
            steps_row(1, Some(hour(12, 9)), 1200),
            steps_row(1, Some(hour(12, 10)), 800), // no intensity match
            steps_row(1, None, 500),               // unparseable
        ];
        let intensity = vec![
            intensity_row(1, Some(hour(12, 9)), 45),
            intensity_row(1, Some(hour(12, 11)), 20), // no step match
        ];

        let join = join_hourly(&steps, &intensity);
        assert_eq!(join.records.len(), 1);
        assert_eq!(join.records[0].step_count, 1200);
        assert_eq!(join.records[0].total_intensity, 45);
        assert_eq!(join.records[0].date, NaiveDate::from_ymd_opt(2016, 4, 12).unwrap());
        assert_eq!(join.step_rows_unmatched, 2);
        assert_eq!(join.intensity_rows_unmatched, 1);
        assert_eq!(join.unparseable_timestamps, 1);
    }

    #[test]
    fn test_join_hourly_sorted_output() {
        let steps = vec![
            steps_row(2, Some(hour(12, 9)), 100),
            steps_row(1, Some(hour(13, 9)), 200),
            steps_row(1, Some(hour(12, 9)), 300),
        ];
        let intensity = vec![
            intensity_row(2, Some(hour(12, 9)), 1),
            intensity_row(1, Some(hour(13, 9)), 2),
            intensity_row(1, Some(hour(12, 9)), 3),
        ];

        let join = join_hourly(&steps, &intensity);
        let keys: Vec<(u64, NaiveDateTime)> =
            join.records.iter().map(|r| (r.user_id, r.hour)).collect();
        assert_eq!(
            keys,
            vec![(1, hour(12, 9)), (1, hour(13, 9)), (2, hour(12, 9))]
        );
    }

    #[test]
    fn test_prepare_daily_derived_fields() {
        let prep = prepare_daily(&[daily_row(1, 12, 9000)], 100);
        assert_eq!(prep.records.len(), 1);
        let rec = &prep.records[0];
        assert!((rec.total_active_distance - 3.5).abs() < 1e-9);
        assert_eq!(rec.am_step_ratio, Some(45.0 / 9000.0));
    }

    #[test]
    fn test_prepare_daily_step_floor() {
        let rows = vec![daily_row(1, 12, 9000), daily_row(1, 13, 100), daily_row(1, 14, 0)];
        let prep = prepare_daily(&rows, 100);
        // 100 is at the floor, not above it
        assert_eq!(prep.records.len(), 1);
        assert_eq!(prep.below_step_floor, 2);
        assert_eq!(prep.without_ratio, 0);
    }

    #[test]
    fn test_prepare_daily_zero_steps_without_floor() {
        // The median preset keeps every row; the ratio guard still holds
        let prep = prepare_daily(&[daily_row(1, 12, 0)], 0);
        assert_eq!(prep.records.len(), 1);
        assert_eq!(prep.records[0].am_step_ratio, None);
        assert_eq!(prep.without_ratio, 1);
    }

    #[test]
    fn test_quantile_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.75), Some(7.0));
    }

    #[test]
    fn test_baselines_exclude_undefined_ratios() {
        let hourly = vec![
            HourlyRecord {
                user_id: 1,
                hour: hour(12, 9),
                step_count: 100,
                total_intensity: 10,
                date: NaiveDate::from_ymd_opt(2016, 4, 12).unwrap(),
            },
            HourlyRecord {
                user_id: 1,
                hour: hour(12, 10),
                step_count: 300,
                total_intensity: 10,
                date: NaiveDate::from_ymd_opt(2016, 4, 12).unwrap(),
            },
        ];
        let daily = prepare_daily(&[daily_row(1, 12, 9000), daily_row(1, 13, 0)], 0).records;

        let baselines = compute_baselines(&hourly, &daily, 0.75);
        let baseline = &baselines[&1];
        assert_eq!(baseline.median_step_count, Some(200.0));
        // Only the defined ratio participates
        assert_eq!(baseline.ratio_p75, Some(45.0 / 9000.0));
    }

    #[test]
    fn test_baselines_cover_daily_only_users() {
        let daily = prepare_daily(&[daily_row(9, 12, 9000)], 0).records;
        let baselines = compute_baselines(&[], &daily, 0.75);
        let baseline = &baselines[&9];
        assert_eq!(baseline.median_step_count, None);
        assert!(baseline.ratio_p75.is_some());
    }
}
