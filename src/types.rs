//! Core types for the Stridewise pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: joined hourly records, prepared daily records, per-user baselines,
//! and the per-user classification summary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One joined hourly observation for a single user.
///
/// Produced by the inner join of the hourly-steps and hourly-intensity tables
/// on (user, hour). The `date` field is the calendar-date component of `hour`
/// and is used to attach the matching daily record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub user_id: u64,
    pub hour: NaiveDateTime,
    pub step_count: u32,
    pub total_intensity: u32,
    /// Calendar date of `hour` (no time-zone handling; the data carries none)
    pub date: NaiveDate,
}

/// One prepared daily observation for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user_id: u64,
    pub date: NaiveDate,
    pub total_steps: u32,
    pub total_distance: f64,
    pub very_active_distance: f64,
    pub moderately_active_distance: f64,
    pub light_active_distance: f64,
    pub very_active_minutes: u32,
    pub fairly_active_minutes: u32,
    /// Derived: very active + moderately active distance
    pub total_active_distance: f64,
    /// Derived: (very + fairly active minutes) / total steps.
    /// `None` when total steps is zero, so a zero denominator can never
    /// propagate into percentile computation or classification.
    pub am_step_ratio: Option<f64>,
}

/// Per-user statistics computed once per run and immutable thereafter.
///
/// Baselines make classification relative rather than absolute: the median
/// preset compares hourly steps against `median_step_count`, and the refined
/// preset compares a day's activity ratio against `ratio_p75`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBaseline {
    pub user_id: u64,
    /// Median of the user's hourly step counts. `None` if the user has no
    /// joined hourly records.
    pub median_step_count: Option<f64>,
    /// 75th percentile of the user's daily active-minutes-to-steps ratio.
    /// `None` if the user has no daily record with a defined ratio.
    pub ratio_p75: Option<f64>,
}

/// Overall activity category assigned to a user.
///
/// A category is "active" when its instance count reaches the configured
/// minimum. Priority order: more than one active category wins
/// `CrossTrainer`, exactly one wins that category, none wins `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Running,
    Cycling,
    Weightlifting,
    CrossTrainer,
    Inactive,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Running => "running",
            ActivityCategory::Cycling => "cycling",
            ActivityCategory::Weightlifting => "weightlifting",
            ActivityCategory::CrossTrainer => "cross_trainer",
            ActivityCategory::Inactive => "inactive",
        }
    }
}

/// Per-user activity instance counts.
///
/// An instance is a maximal run of consecutive flagged hours (or a flagged
/// day, for cycling under the refined preset), counted at each false-to-true
/// transition of the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCounts {
    pub running: u32,
    pub cycling: u32,
    pub weightlifting: u32,
}

/// Final per-user summary row handed to the reporting consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: u64,
    pub running_instances: u32,
    pub cycling_instances: u32,
    pub weightlifting_instances: u32,
    pub category: ActivityCategory,
}

/// Counts of rows excluded during the run.
///
/// Every exclusion the pipeline makes is a local data decision, never fatal;
/// this struct surfaces those decisions instead of discarding rows silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Raw rows read from the hourly-steps table
    pub hourly_step_rows: usize,
    /// Raw rows read from the hourly-intensity table
    pub hourly_intensity_rows: usize,
    /// Raw rows read from the daily-activity table
    pub daily_rows: usize,
    /// Hourly rows whose timestamp failed every known format
    pub unparseable_hour_timestamps: usize,
    /// Daily rows whose date failed every known format
    pub unparseable_daily_dates: usize,
    /// Hourly step rows with no intensity row for the same (user, hour)
    pub step_rows_unmatched: usize,
    /// Hourly intensity rows with no step row for the same (user, hour)
    pub intensity_rows_unmatched: usize,
    /// Joined hourly rows with no daily record for the same (user, date)
    pub hours_without_daily_match: usize,
    /// Daily rows removed by the minimum-total-steps floor
    pub daily_rows_below_step_floor: usize,
    /// Daily rows kept but with an undefined activity ratio (zero steps)
    pub daily_rows_without_ratio: usize,
    /// Users in the final summary
    pub users_in_summary: usize,
}

/// Output of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// One row per user seen in any input table, sorted by user id
    pub summaries: Vec<UserSummary>,
    pub diagnostics: RunDiagnostics,
}
