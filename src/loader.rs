//! CSV input adapter
//!
//! Reads the three upstream export tables (hourly steps, hourly intensities,
//! daily activity) into typed rows. Column names match the exports exactly.
//! Timestamps that fail every known format become `None` rather than failing
//! the load; everything else malformed is a hard [`ClassifyError::Csv`].

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::ClassifyError;

/// Timestamp formats tried in order for hourly rows. The first entry is the
/// format the current exports use; the rest cover older export variants.
const HOUR_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date formats tried in order for daily rows
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// One row of the hourly-steps export
#[derive(Debug, Clone, PartialEq)]
pub struct StepsRow {
    pub user_id: u64,
    /// `None` when the export's timestamp was unparseable
    pub hour: Option<NaiveDateTime>,
    pub step_count: u32,
}

/// One row of the hourly-intensities export
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityRow {
    pub user_id: u64,
    pub hour: Option<NaiveDateTime>,
    pub total_intensity: u32,
}

/// One row of the daily-activity export
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub user_id: u64,
    pub date: Option<NaiveDate>,
    pub total_steps: u32,
    pub total_distance: f64,
    pub very_active_distance: f64,
    pub moderately_active_distance: f64,
    pub light_active_distance: f64,
    pub very_active_minutes: u32,
    pub fairly_active_minutes: u32,
}

// Raw serde rows mirroring the export headers verbatim

#[derive(Debug, Deserialize)]
struct RawStepsRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityHour")]
    activity_hour: String,
    #[serde(rename = "StepTotal")]
    step_total: u32,
}

#[derive(Debug, Deserialize)]
struct RawIntensityRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityHour")]
    activity_hour: String,
    #[serde(rename = "TotalIntensity")]
    total_intensity: u32,
}

#[derive(Debug, Deserialize)]
struct RawDailyRow {
    #[serde(rename = "Id")]
    id: u64,
    #[serde(rename = "ActivityDate")]
    activity_date: String,
    #[serde(rename = "TotalSteps")]
    total_steps: u32,
    #[serde(rename = "TotalDistance")]
    total_distance: f64,
    #[serde(rename = "VeryActiveDistance")]
    very_active_distance: f64,
    #[serde(rename = "ModeratelyActiveDistance")]
    moderately_active_distance: f64,
    #[serde(rename = "LightActiveDistance")]
    light_active_distance: f64,
    #[serde(rename = "VeryActiveMinutes")]
    very_active_minutes: u32,
    #[serde(rename = "FairlyActiveMinutes")]
    fairly_active_minutes: u32,
}

/// Parse an hourly timestamp, trying each known format in order
fn parse_hour(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    HOUR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a daily date. Some export variants put a full timestamp in the date
/// column, so hourly formats are tried as a fallback and truncated.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_hour(raw).map(|dt| dt.date()))
}

/// Read the hourly-steps table
pub fn read_hourly_steps<R: io::Read>(reader: R) -> Result<Vec<StepsRow>, ClassifyError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let raw: RawStepsRow = result?;
        rows.push(StepsRow {
            user_id: raw.id,
            hour: parse_hour(&raw.activity_hour),
            step_count: raw.step_total,
        });
    }
    Ok(rows)
}

/// Read the hourly-intensities table
pub fn read_hourly_intensity<R: io::Read>(reader: R) -> Result<Vec<IntensityRow>, ClassifyError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let raw: RawIntensityRow = result?;
        rows.push(IntensityRow {
            user_id: raw.id,
            hour: parse_hour(&raw.activity_hour),
            total_intensity: raw.total_intensity,
        });
    }
    Ok(rows)
}

/// Read the daily-activity table
pub fn read_daily_activity<R: io::Read>(reader: R) -> Result<Vec<DailyRow>, ClassifyError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let raw: RawDailyRow = result?;
        rows.push(DailyRow {
            user_id: raw.id,
            date: parse_date(&raw.activity_date),
            total_steps: raw.total_steps,
            total_distance: raw.total_distance,
            very_active_distance: raw.very_active_distance,
            moderately_active_distance: raw.moderately_active_distance,
            light_active_distance: raw.light_active_distance,
            very_active_minutes: raw.very_active_minutes,
            fairly_active_minutes: raw.fairly_active_minutes,
        });
    }
    Ok(rows)
}

/// The three loaded input tables for one run
#[derive(Debug, Clone, PartialEq)]
pub struct InputTables {
    pub steps: Vec<StepsRow>,
    pub intensity: Vec<IntensityRow>,
    pub daily: Vec<DailyRow>,
}

impl InputTables {
    /// Load all three tables from readers
    pub fn from_readers<R1, R2, R3>(
        steps: R1,
        intensity: R2,
        daily: R3,
    ) -> Result<Self, ClassifyError>
    where
        R1: io::Read,
        R2: io::Read,
        R3: io::Read,
    {
        Ok(Self {
            steps: read_hourly_steps(steps)?,
            intensity: read_hourly_intensity(intensity)?,
            daily: read_daily_activity(daily)?,
        })
    }

    /// Load all three tables from file paths
    pub fn from_paths<P1, P2, P3>(
        steps: P1,
        intensity: P2,
        daily: P3,
    ) -> Result<Self, ClassifyError>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        P3: AsRef<Path>,
    {
        Self::from_readers(
            File::open(steps)?,
            File::open(intensity)?,
            File::open(daily)?,
        )
    }

    /// User ids appearing in any of the three tables, deduplicated and sorted.
    /// The final summary must carry exactly these users.
    pub fn all_user_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .steps
            .iter()
            .map(|r| r.user_id)
            .chain(self.intensity.iter().map(|r| r.user_id))
            .chain(self.daily.iter().map(|r| r.user_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hour_export_format() {
        let dt = parse_hour("4/12/2016 9:00:00 AM").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2016, 4, 12)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );

        let pm = parse_hour("4/12/2016 11:00:00 PM").unwrap();
        assert_eq!(pm.format("%H").to_string(), "23");
    }

    #[test]
    fn test_parse_hour_fallback_formats() {
        assert!(parse_hour("2016-04-12 09:00:00").is_some());
        assert!(parse_hour("4/12/2016 09:00").is_some());
        assert!(parse_hour("not a timestamp").is_none());
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        let d = parse_date("4/12/16").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2016, 4, 12).unwrap());
    }

    #[test]
    fn test_parse_date_accepts_full_timestamp() {
        let d = parse_date("4/12/2016 12:00:00 AM").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2016, 4, 12).unwrap());
    }

    #[test]
    fn test_read_hourly_steps() {
        let csv = "Id,ActivityHour,StepTotal\n\
                   1503960366,4/12/2016 9:00:00 AM,1200\n\
                   1503960366,garbage,300\n";
        let rows = read_hourly_steps(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].step_count, 1200);
        assert!(rows[0].hour.is_some());
        // Unparseable timestamp tolerated, not fatal
        assert!(rows[1].hour.is_none());
        assert_eq!(rows[1].step_count, 300);
    }

    #[test]
    fn test_read_daily_activity() {
        let csv = "Id,ActivityDate,TotalSteps,TotalDistance,VeryActiveDistance,\
                   ModeratelyActiveDistance,LightActiveDistance,VeryActiveMinutes,FairlyActiveMinutes\n\
                   1503960366,4/12/16,13162,8.5,1.88,0.55,6.06,25,13\n";
        let rows = read_daily_activity(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_steps, 13162);
        assert_eq!(row.very_active_minutes, 25);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2016, 4, 12));
    }

    #[test]
    fn test_malformed_numeric_field_is_fatal() {
        let csv = "Id,ActivityHour,StepTotal\n1503960366,4/12/2016 9:00:00 AM,not-a-number\n";
        assert!(read_hourly_steps(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_all_user_ids_deduplicates_across_tables() {
        let tables = InputTables {
            steps: vec![StepsRow {
                user_id: 2,
                hour: None,
                step_count: 0,
            }],
            intensity: vec![IntensityRow {
                user_id: 1,
                hour: None,
                total_intensity: 0,
            }],
            daily: vec![],
        };
        assert_eq!(tables.all_user_ids(), vec![1, 2]);
    }
}
