//! Activity classification
//!
//! This stage turns joined hourly records and prepared daily records into
//! per-user instance counts:
//! - per-hour running and weightlifting flags, per-day cycling flags
//! - run-collapsing of consecutive flagged hours into discrete instances
//! - per-user aggregation with zero-fill for users missing a category
//!
//! All threshold comparisons are strict: a value exactly at a bound does not
//! pass it.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::{Preset, Thresholds};
use crate::types::{DailyRecord, HourlyRecord, InstanceCounts, UserBaseline};

/// Outcome of the classification stage
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Instance counts per user. Users with no flagged activity in a category
    /// carry an explicit zero; users absent here had no classifiable rows at
    /// all and are zero-filled by the summary stage.
    pub counts: HashMap<u64, InstanceCounts>,
    /// Joined hourly rows with no daily record for their (user, date)
    pub hours_without_daily_match: usize,
}

/// Classify all users' records under the given thresholds.
///
/// `hourly` must be sorted ascending by (user, hour), the order the
/// preprocessing join produces, so run-collapsing sees consecutive hours
/// adjacently.
pub fn classify(
    hourly: &[HourlyRecord],
    daily: &[DailyRecord],
    baselines: &HashMap<u64, UserBaseline>,
    thresholds: &Thresholds,
) -> Classification {
    let daily_by_key: HashMap<(u64, NaiveDate), &DailyRecord> =
        daily.iter().map(|d| ((d.user_id, d.date), d)).collect();

    // Cycling is decided at daily granularity
    let mut cycling_days: HashMap<u64, HashSet<NaiveDate>> = HashMap::new();
    for record in daily {
        if is_cycling_day(record, baselines.get(&record.user_id), thresholds) {
            cycling_days
                .entry(record.user_id)
                .or_default()
                .insert(record.date);
        }
    }

    let mut counts: HashMap<u64, InstanceCounts> = HashMap::new();
    let mut hours_without_daily_match = 0;

    // Run-collapse state, reset at each user boundary
    let mut current_user: Option<u64> = None;
    let mut prev_running = false;
    let mut prev_weightlifting = false;

    for record in hourly {
        if current_user != Some(record.user_id) {
            current_user = Some(record.user_id);
            prev_running = false;
            prev_weightlifting = false;
        }

        // Hours without a matching daily record do not participate
        let day = match daily_by_key.get(&(record.user_id, record.date)) {
            Some(day) => *day,
            None => {
                hours_without_daily_match += 1;
                continue;
            }
        };

        let baseline = baselines.get(&record.user_id);
        let running = is_running_hour(record, day, baseline, thresholds);
        let weightlifting = is_weightlifting_hour(record, thresholds);

        let entry = counts.entry(record.user_id).or_default();
        // An instance starts at every false-to-true transition; a leading
        // true counts as a start
        if running && !prev_running {
            entry.running += 1;
        }
        if weightlifting && !prev_weightlifting {
            entry.weightlifting += 1;
        }
        prev_running = running;
        prev_weightlifting = weightlifting;

        // Median preset: cycling days broadcast to every matching hour
        if thresholds.preset == Preset::Median {
            let on_cycling_day = cycling_days
                .get(&record.user_id)
                .is_some_and(|days| days.contains(&record.date));
            if on_cycling_day {
                entry.cycling += 1;
            }
        }
    }

    // Refined preset: cycling counted directly at daily granularity
    if thresholds.preset == Preset::Refined {
        for (user_id, days) in &cycling_days {
            counts.entry(*user_id).or_default().cycling += days.len() as u32;
        }
    }

    Classification {
        counts,
        hours_without_daily_match,
    }
}

/// Per-hour running flag. The refined preset uses fixed thresholds; the
/// median preset compares steps against the user's median hourly steps.
fn is_running_hour(
    record: &HourlyRecord,
    day: &DailyRecord,
    baseline: Option<&UserBaseline>,
    thresholds: &Thresholds,
) -> bool {
    if day.total_active_distance <= thresholds.running_min_distance {
        return false;
    }
    match thresholds.preset {
        Preset::Refined => {
            record.total_intensity > thresholds.running_min_intensity
                && record.step_count > thresholds.running_min_steps
        }
        Preset::Median => match baseline.and_then(|b| b.median_step_count) {
            Some(median) => f64::from(record.step_count) > median,
            None => false,
        },
    }
}

/// Per-hour weightlifting flag, identical across presets
fn is_weightlifting_hour(record: &HourlyRecord, thresholds: &Thresholds) -> bool {
    record.total_intensity > thresholds.weightlifting_min_intensity
        && record.step_count < thresholds.weightlifting_max_steps
}

/// Per-day cycling flag
fn is_cycling_day(
    record: &DailyRecord,
    baseline: Option<&UserBaseline>,
    thresholds: &Thresholds,
) -> bool {
    if record.total_active_distance <= thresholds.cycling_min_distance {
        return false;
    }
    match thresholds.preset {
        Preset::Refined => match (record.am_step_ratio, baseline.and_then(|b| b.ratio_p75)) {
            (Some(ratio), Some(p75)) => ratio > p75,
            _ => false,
        },
        // Distance is positive here, the division is safe
        Preset::Median => {
            f64::from(record.total_steps) / record.total_active_distance
                <= thresholds.cycling_max_steps_per_distance
        }
    }
}
