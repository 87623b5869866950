//! Overall category assignment
//!
//! A category is active when its instance count reaches the configured
//! minimum (default 7, read as "at least weekly" over the capture window).

use crate::types::{ActivityCategory, InstanceCounts};

/// Assign the overall category for one user's instance counts.
///
/// Priority order: more than one active category -> `CrossTrainer`;
/// exactly one -> that category; none -> `Inactive`.
pub fn assign(counts: &InstanceCounts, min_instances: u32) -> ActivityCategory {
    let running = counts.running >= min_instances;
    let cycling = counts.cycling >= min_instances;
    let weightlifting = counts.weightlifting >= min_instances;

    match (running, cycling, weightlifting) {
        (true, false, false) => ActivityCategory::Running,
        (false, true, false) => ActivityCategory::Cycling,
        (false, false, true) => ActivityCategory::Weightlifting,
        (false, false, false) => ActivityCategory::Inactive,
        _ => ActivityCategory::CrossTrainer,
    }
}
