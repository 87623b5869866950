//! Threshold configuration
//!
//! All classification thresholds live in an immutable [`Thresholds`] value
//! passed into the pipeline. Two named presets cover the historical rule
//! sets: [`Preset::Refined`] (fixed absolute thresholds, percentile-based
//! cycling rule) and [`Preset::Median`] (baseline-relative running rule,
//! steps-per-distance cycling rule).

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// Default minimum instance count for a category to be considered active
pub const DEFAULT_MIN_INSTANCES: u32 = 7;

/// Named rule set selecting between the historical threshold iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Fixed running thresholds; cycling judged against the user's
    /// 75th-percentile activity ratio and counted per day
    Refined,
    /// Running judged against the user's median hourly steps; cycling judged
    /// by steps-per-distance and counted per hour on cycling days
    Median,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Refined => "refined",
            Preset::Median => "median",
        }
    }
}

/// Immutable threshold configuration for one pipeline run.
///
/// Comparison semantics are strict: a value exactly equal to a minimum bound
/// does not pass it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub preset: Preset,
    /// Daily total active distance a running hour must exceed (km)
    pub running_min_distance: f64,
    /// Hourly intensity a running hour must exceed (refined preset)
    pub running_min_intensity: u32,
    /// Hourly steps a running hour must exceed (refined preset; the median
    /// preset uses the user's median instead)
    pub running_min_steps: u32,
    /// Hourly intensity a weightlifting hour must exceed
    pub weightlifting_min_intensity: u32,
    /// Hourly steps a weightlifting hour must stay under
    pub weightlifting_max_steps: u32,
    /// Daily total active distance a cycling day must exceed (km)
    pub cycling_min_distance: f64,
    /// Quantile of the activity ratio used for the refined cycling rule
    pub cycling_ratio_percentile: f64,
    /// Upper bound on daily steps per active-distance km for the median
    /// preset's cycling rule
    pub cycling_max_steps_per_distance: f64,
    /// Daily rows at or below this step count are dropped before
    /// classification (0 keeps everything)
    pub daily_min_total_steps: u32,
    /// Instance count at which a category counts as active
    pub cross_trainer_min_instances: u32,
}

impl Thresholds {
    /// Refined rule set: fixed absolute running thresholds and the
    /// percentile-based daily cycling rule
    pub fn refined() -> Self {
        Self {
            preset: Preset::Refined,
            running_min_distance: 3.2,
            running_min_intensity: 40,
            running_min_steps: 2500,
            weightlifting_min_intensity: 50,
            weightlifting_max_steps: 2000,
            cycling_min_distance: 20.0,
            cycling_ratio_percentile: 0.75,
            cycling_max_steps_per_distance: 2050.0 / 1.6,
            daily_min_total_steps: 100,
            cross_trainer_min_instances: DEFAULT_MIN_INSTANCES,
        }
    }

    /// Median rule set: running relative to the user's median hourly steps,
    /// cycling by steps-per-distance, no daily step floor
    pub fn median() -> Self {
        Self {
            preset: Preset::Median,
            daily_min_total_steps: 0,
            ..Self::refined()
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Refined => Self::refined(),
            Preset::Median => Self::median(),
        }
    }

    /// Check internal consistency before a run
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if !(0.0..=1.0).contains(&self.cycling_ratio_percentile) {
            return Err(ClassifyError::InvalidThreshold(format!(
                "cycling_ratio_percentile must be within [0, 1], got {}",
                self.cycling_ratio_percentile
            )));
        }
        if self.cycling_min_distance <= 0.0 {
            return Err(ClassifyError::InvalidThreshold(format!(
                "cycling_min_distance must be positive, got {}",
                self.cycling_min_distance
            )));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::refined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_refined_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.preset, Preset::Refined);
        assert_eq!(t.running_min_steps, 2500);
        assert_eq!(t.daily_min_total_steps, 100);
        assert_eq!(t.cross_trainer_min_instances, 7);
    }

    #[test]
    fn test_median_preset_keeps_shared_thresholds() {
        let t = Thresholds::median();
        assert_eq!(t.preset, Preset::Median);
        // Weightlifting rule is identical across presets
        assert_eq!(t.weightlifting_min_intensity, 50);
        assert_eq!(t.weightlifting_max_steps, 2000);
        // The median preset keeps every daily row
        assert_eq!(t.daily_min_total_steps, 0);
    }

    #[test]
    fn test_validate_rejects_bad_percentile() {
        let t = Thresholds {
            cycling_ratio_percentile: 1.5,
            ..Thresholds::refined()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_distance() {
        let t = Thresholds {
            cycling_min_distance: 0.0,
            ..Thresholds::refined()
        };
        assert!(t.validate().is_err());
    }
}
