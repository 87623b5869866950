//! Summary reporting
//!
//! Downstream consumer of the classification output. Aggregates per-category
//! instance totals, attaches producer/provenance metadata, and serializes to
//! JSON. No business logic beyond summation lives here; rendering for humans
//! is the CLI's job, keeping the core free of presentation concerns.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClassifyError;
use crate::types::{RunDiagnostics, RunOutput, UserSummary};
use crate::{PRODUCER_NAME, VERSION};

/// Producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    /// Unique id for this run of the pipeline
    pub instance_id: String,
}

impl ReportProducer {
    fn for_this_run() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Aggregate instance totals across all users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub running: u64,
    pub cycling: u64,
    pub weightlifting: u64,
}

impl CategoryTotals {
    pub fn from_summaries(summaries: &[UserSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut acc, s| {
            acc.running += u64::from(s.running_instances);
            acc.cycling += u64::from(s.cycling_instances);
            acc.weightlifting += u64::from(s.weightlifting_instances);
            acc
        })
    }
}

/// Complete report handed to presentation consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub producer: ReportProducer,
    pub generated_at_utc: String,
    pub totals: CategoryTotals,
    pub users: Vec<UserSummary>,
    pub diagnostics: RunDiagnostics,
}

impl ActivityReport {
    /// Build a report from a finished run
    pub fn from_run(output: &RunOutput) -> Self {
        Self {
            producer: ReportProducer::for_this_run(),
            generated_at_utc: Utc::now().to_rfc3339(),
            totals: CategoryTotals::from_summaries(&output.summaries),
            users: output.summaries.clone(),
            diagnostics: output.diagnostics,
        }
    }

    pub fn to_json(&self) -> Result<String, ClassifyError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ClassifyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityCategory;
    use pretty_assertions::assert_eq;

    fn summary(user_id: u64, running: u32, cycling: u32, weightlifting: u32) -> UserSummary {
        UserSummary {
            user_id,
            running_instances: running,
            cycling_instances: cycling,
            weightlifting_instances: weightlifting,
            category: ActivityCategory::Inactive,
        }
    }

    #[test]
    fn test_totals_sum_across_users() {
        let summaries = vec![summary(1, 8, 2, 0), summary(2, 1, 9, 4)];
        let totals = CategoryTotals::from_summaries(&summaries);
        assert_eq!(totals.running, 9);
        assert_eq!(totals.cycling, 11);
        assert_eq!(totals.weightlifting, 4);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(
            CategoryTotals::from_summaries(&[]),
            CategoryTotals::default()
        );
    }

    #[test]
    fn test_report_serialization() {
        let output = RunOutput {
            summaries: vec![summary(1, 8, 0, 0)],
            diagnostics: RunDiagnostics::default(),
        };
        let report = ActivityReport::from_run(&output);
        let json = report.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["totals"]["running"], 8);
        assert_eq!(value["users"][0]["user_id"], 1);

        // Round-trips through the typed representation
        let loaded: ActivityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.users, report.users);
        assert_eq!(loaded.totals, report.totals);
    }
}
