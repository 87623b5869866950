//! Stridewise CLI
//!
//! Commands:
//! - classify: run the full pipeline and emit the activity report
//! - validate: load the inputs and report parse/drop counts without classifying

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use stridewise::report::CategoryTotals;
use stridewise::{
    ActivityReport, ClassifyError, InputTables, Preset, RunOutput, Thresholds, VERSION,
};

/// Stridewise - activity-type classification from wearable step and intensity logs
#[derive(Parser)]
#[command(name = "stridewise")]
#[command(version = VERSION)]
#[command(about = "Classify wearable users by activity type", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the classification pipeline and emit the report
    Classify {
        /// Hourly steps CSV (Id, ActivityHour, StepTotal)
        #[arg(long)]
        steps: PathBuf,

        /// Hourly intensities CSV (Id, ActivityHour, TotalIntensity)
        #[arg(long)]
        intensity: PathBuf,

        /// Daily activity CSV (Id, ActivityDate, TotalSteps, ...)
        #[arg(long)]
        daily: PathBuf,

        /// Threshold preset
        #[arg(long, default_value = "refined")]
        preset: PresetArg,

        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum instance count for a category to be active
        #[arg(long)]
        min_instances: Option<u32>,
    },

    /// Load the inputs and print a parse report without classifying
    Validate {
        /// Hourly steps CSV
        #[arg(long)]
        steps: PathBuf,

        /// Hourly intensities CSV
        #[arg(long)]
        intensity: PathBuf,

        /// Daily activity CSV
        #[arg(long)]
        daily: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    /// Fixed thresholds, percentile-based cycling rule
    Refined,
    /// Median-relative running rule, steps-per-distance cycling rule
    Median,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Refined => Preset::Refined,
            PresetArg::Median => Preset::Median,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary table
    Table,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ClassifyError> {
    match cli.command {
        Commands::Classify {
            steps,
            intensity,
            daily,
            preset,
            format,
            output,
            min_instances,
        } => cmd_classify(
            &steps,
            &intensity,
            &daily,
            preset,
            format,
            output.as_deref(),
            min_instances,
        ),

        Commands::Validate {
            steps,
            intensity,
            daily,
            json,
        } => cmd_validate(&steps, &intensity, &daily, json),
    }
}

fn cmd_classify(
    steps: &PathBuf,
    intensity: &PathBuf,
    daily: &PathBuf,
    preset: PresetArg,
    format: OutputFormat,
    output: Option<&std::path::Path>,
    min_instances: Option<u32>,
) -> Result<(), ClassifyError> {
    let mut thresholds = Thresholds::from_preset(preset.into());
    if let Some(min) = min_instances {
        thresholds.cross_trainer_min_instances = min;
    }

    let tables = InputTables::from_paths(steps, intensity, daily)?;
    let result = stridewise::run_classification(&tables, &thresholds)?;
    let report = ActivityReport::from_run(&result);

    let rendered = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::JsonPretty => report.to_json_pretty()?,
        OutputFormat::Table => render_table(&result, &report.totals),
    };

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(())
}

fn cmd_validate(
    steps: &PathBuf,
    intensity: &PathBuf,
    daily: &PathBuf,
    json: bool,
) -> Result<(), ClassifyError> {
    let tables = InputTables::from_paths(steps, intensity, daily)?;

    // A throwaway run whose diagnostics double as the parse report
    let result = stridewise::run_classification(&tables, &Thresholds::default())?;
    let d = result.diagnostics;

    if json {
        println!("{}", serde_json::to_string_pretty(&d)?);
    } else {
        println!("Input Report");
        println!("============");
        println!("Hourly step rows:        {}", d.hourly_step_rows);
        println!("Hourly intensity rows:   {}", d.hourly_intensity_rows);
        println!("Daily rows:              {}", d.daily_rows);
        println!("Unparseable hour stamps: {}", d.unparseable_hour_timestamps);
        println!("Unparseable daily dates: {}", d.unparseable_daily_dates);
        println!("Step rows unmatched:     {}", d.step_rows_unmatched);
        println!("Intensity rows unmatched:{}", d.intensity_rows_unmatched);
        println!("Hours without daily row: {}", d.hours_without_daily_match);
        println!("Users found:             {}", d.users_in_summary);
    }

    Ok(())
}

fn render_table(result: &RunOutput, totals: &CategoryTotals) -> String {
    let mut out = String::new();
    out.push_str("Activity Classification\n");
    out.push_str("=======================\n");
    out.push_str(&format!(
        "{:<12} {:>8} {:>8} {:>14} {}\n",
        "User", "Running", "Cycling", "Weightlifting", "Category"
    ));

    for user in &result.summaries {
        out.push_str(&format!(
            "{:<12} {:>8} {:>8} {:>14} {}\n",
            user.user_id,
            user.running_instances,
            user.cycling_instances,
            user.weightlifting_instances,
            user.category.as_str()
        ));
    }

    out.push_str(&format!(
        "\nTotals: running {}, cycling {}, weightlifting {}\n",
        totals.running, totals.cycling, totals.weightlifting
    ));

    let d = &result.diagnostics;
    let dropped = d.unparseable_hour_timestamps
        + d.unparseable_daily_dates
        + d.step_rows_unmatched
        + d.intensity_rows_unmatched
        + d.hours_without_daily_match;
    if dropped > 0 {
        out.push_str(&format!(
            "Excluded rows: {dropped} (run `stridewise validate` for a breakdown)\n"
        ));
    }

    out
}

// Error object emitted on failure, machine-readable for wrapping tools

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ClassifyError> for CliError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ClassifyError::Csv(e) => CliError {
                code: "CSV_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure inputs carry the upstream export headers".to_string()),
            },
            ClassifyError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ClassifyError::InvalidThreshold(msg) => CliError {
                code: "INVALID_THRESHOLD".to_string(),
                message: msg,
                hint: Some("Review the threshold overrides".to_string()),
            },
        }
    }
}
