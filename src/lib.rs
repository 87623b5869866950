//! Stridewise - Heuristic activity-type classification from wearable logs
//!
//! Stridewise classifies each user in a wearable-device export as a runner,
//! cyclist, weightlifter, cross-trainer, or inactive through a deterministic
//! batch pipeline: CSV loading → hourly/daily joining → per-user baselines →
//! threshold flagging → run-collapsing into instances → category assignment.
//!
//! ## Modules
//!
//! - **Loader**: typed CSV input with tolerant timestamp parsing
//! - **Preprocessor**: joins, derived fields, per-user baselines
//! - **Classifier**: threshold flags and run-length instance collapsing
//! - **Reporter**: per-category totals and JSON report output

pub mod category;
pub mod classify;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod types;

pub use config::{Preset, Thresholds};
pub use error::ClassifyError;
pub use loader::InputTables;
pub use pipeline::{classify_files, run_classification, ActivityPipeline};
pub use report::ActivityReport;
pub use types::{ActivityCategory, RunDiagnostics, RunOutput, UserSummary};

/// Crate version embedded in report provenance
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report provenance
pub const PRODUCER_NAME: &str = "stridewise";
