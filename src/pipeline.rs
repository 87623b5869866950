//! Pipeline orchestration
//!
//! This module provides the public entry points for Stridewise. It runs the
//! full pipeline over the three loaded input tables:
//! load -> join/prepare -> baselines -> classify -> summarize.

use std::collections::HashMap;
use std::path::Path;

use crate::category;
use crate::classify::classify;
use crate::config::Thresholds;
use crate::error::ClassifyError;
use crate::loader::InputTables;
use crate::preprocess::{compute_baselines, join_hourly, prepare_daily};
use crate::types::{InstanceCounts, RunDiagnostics, RunOutput, UserSummary};

/// Run the full classification pipeline over loaded tables.
///
/// Deterministic for identical input: summaries come back sorted by user id,
/// and every user appearing in any input table appears exactly once, with
/// zero for categories they have no instances of.
pub fn run_classification(
    tables: &InputTables,
    thresholds: &Thresholds,
) -> Result<RunOutput, ClassifyError> {
    thresholds.validate()?;

    let join = join_hourly(&tables.steps, &tables.intensity);
    let prep = prepare_daily(&tables.daily, thresholds.daily_min_total_steps);
    let baselines = compute_baselines(
        &join.records,
        &prep.records,
        thresholds.cycling_ratio_percentile,
    );
    let classification = classify(&join.records, &prep.records, &baselines, thresholds);

    let summaries = summarize(
        &tables.all_user_ids(),
        &classification.counts,
        thresholds.cross_trainer_min_instances,
    );

    let diagnostics = RunDiagnostics {
        hourly_step_rows: tables.steps.len(),
        hourly_intensity_rows: tables.intensity.len(),
        daily_rows: tables.daily.len(),
        unparseable_hour_timestamps: join.unparseable_timestamps,
        unparseable_daily_dates: prep.unparseable_dates,
        step_rows_unmatched: join.step_rows_unmatched,
        intensity_rows_unmatched: join.intensity_rows_unmatched,
        hours_without_daily_match: classification.hours_without_daily_match,
        daily_rows_below_step_floor: prep.below_step_floor,
        daily_rows_without_ratio: prep.without_ratio,
        users_in_summary: summaries.len(),
    };

    Ok(RunOutput {
        summaries,
        diagnostics,
    })
}

/// Load the three input files and run the pipeline
pub fn classify_files<P1, P2, P3>(
    steps: P1,
    intensity: P2,
    daily: P3,
    thresholds: &Thresholds,
) -> Result<RunOutput, ClassifyError>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
    P3: AsRef<Path>,
{
    let tables = InputTables::from_paths(steps, intensity, daily)?;
    run_classification(&tables, thresholds)
}

/// Outer join to the full user set, zero-filling missing categories
fn summarize(
    all_user_ids: &[u64],
    counts: &HashMap<u64, InstanceCounts>,
    min_instances: u32,
) -> Vec<UserSummary> {
    all_user_ids
        .iter()
        .map(|&user_id| {
            let c = counts.get(&user_id).copied().unwrap_or_default();
            UserSummary {
                user_id,
                running_instances: c.running,
                cycling_instances: c.cycling,
                weightlifting_instances: c.weightlifting,
                category: category::assign(&c, min_instances),
            }
        })
        .collect()
}

/// Configured pipeline handle for repeated runs with the same thresholds
#[derive(Debug, Clone)]
pub struct ActivityPipeline {
    thresholds: Thresholds,
}

impl Default for ActivityPipeline {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl ActivityPipeline {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn run(&self, tables: &InputTables) -> Result<RunOutput, ClassifyError> {
        run_classification(tables, &self.thresholds)
    }
}
