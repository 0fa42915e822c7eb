//! CSV export of cohort outcomes.
//!
//! Two reports are written for a simulated cohort:
//! * `<prefix>survival_times.csv` with one row per death (`death,survival_time`) in processing
//!   order.
//! * `<prefix>living_count.csv` with the number of living patients at every period of the
//!   horizon (`time,alive`).

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{info, trace};
use serde::Serialize;

use crate::error::SurvivalError;
use crate::horizon::{Period, TimeHorizon};
use crate::outcomes::CohortOutcomes;

pub const SURVIVAL_TIMES_REPORT: &str = "survival_times.csv";
pub const LIVING_COUNT_REPORT: &str = "living_count.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub directory: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            file_prefix: String::new(),
            directory: PathBuf::from("."),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file prefix option (e.g., "report_")
    pub fn file_prefix(&mut self, file_prefix: impl Into<String>) -> &mut Self {
        self.file_prefix = file_prefix.into();
        self
    }

    /// Sets the directory where reports will be output
    pub fn directory(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        self.directory = directory.into();
        self
    }

    /// Sets whether to overwrite existing reports of the same name if they exist
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn report_path(&self, report_name: &str) -> PathBuf {
        self.directory.join(format!("{}{}", self.file_prefix, report_name))
    }
}

#[derive(Serialize)]
struct SurvivalTimeRow {
    death: usize,
    survival_time: Period,
}

#[derive(Serialize)]
struct LivingCountRow {
    time: Period,
    alive: usize,
}

// Checks that the path is a CSV and that it may be written.
fn check_report_path(path: &Path, overwrite: bool) -> Result<(), SurvivalError> {
    if path.extension().and_then(OsStr::to_str) != Some("csv") {
        return Err(SurvivalError::ReportError(format!(
            "report output files must be CSVs: {}",
            path.display()
        )));
    }
    if !overwrite && path.exists() {
        return Err(SurvivalError::ReportError(format!(
            "file already exists: {}. Enable overwrite to replace it.",
            path.display()
        )));
    }
    Ok(())
}

// Creates all parent directories if they do not exist.
fn create_report_file(path: &Path, overwrite: bool) -> Result<File, SurvivalError> {
    check_report_path(path, overwrite)?;
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    trace!("creating report file {}", path.display());
    Ok(File::create(path)?)
}

/// Writes one row per death, in the order the patients were processed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_survival_times(
    outcomes: &CohortOutcomes,
    path: &Path,
    overwrite: bool,
) -> Result<(), SurvivalError> {
    let mut writer = Writer::from_writer(create_report_file(path, overwrite)?);
    for (death, &survival_time) in outcomes.survival_times().iter().enumerate() {
        writer.serialize(SurvivalTimeRow {
            death,
            survival_time,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the number of living patients at every period in `[0, horizon]`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_living_count(
    outcomes: &CohortOutcomes,
    horizon: &TimeHorizon,
    path: &Path,
    overwrite: bool,
) -> Result<(), SurvivalError> {
    let mut writer = Writer::from_writer(create_report_file(path, overwrite)?);
    let dense = outcomes.living_count().dense(horizon.time_steps());
    for (time, alive) in (0..).zip(dense) {
        writer.serialize(LivingCountRow { time, alive })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes both reports into the configured directory. Both paths are checked before either file
/// is created, so a refused report never leaves the other one behind.
///
/// # Errors
///
/// Returns an error if either report cannot be written.
pub fn write_reports(
    outcomes: &CohortOutcomes,
    horizon: &TimeHorizon,
    options: &ReportOptions,
) -> Result<(), SurvivalError> {
    let survival_times_path = options.report_path(SURVIVAL_TIMES_REPORT);
    let living_count_path = options.report_path(LIVING_COUNT_REPORT);
    check_report_path(&survival_times_path, options.overwrite)?;
    check_report_path(&living_count_path, options.overwrite)?;

    write_survival_times(outcomes, &survival_times_path, options.overwrite)?;
    write_living_count(outcomes, horizon, &living_count_path, options.overwrite)?;
    info!(
        "wrote reports {} and {}",
        survival_times_path.display(),
        living_count_path.display()
    );
    Ok(())
}
