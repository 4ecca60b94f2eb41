//! CSV output of the per-tick counts recorded for every scenario.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{debug, trace};
use serde::Serialize;

use crate::error::SimError;
use crate::time_series::TimeSeries;

pub const COUNTS_REPORT_NAME: &str = "sir_counts.csv";

/// One row of the counts report.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CountsRow<'a> {
    pub scenario: &'a str,
    pub tick: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

/// Where reports are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("."),
            file_prefix: String::new(),
        }
    }
}

impl ReportOptions {
    /// Sets the directory reports are written to.
    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.directory = directory;
        self
    }

    /// Sets a prefix prepended to every report file name.
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut Self {
        self.file_prefix = file_prefix;
        self
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}{}", self.file_prefix, name))
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path) -> Result<File, SimError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(SimError::SimError(format!(
            "report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

pub struct CountsReport {
    path: PathBuf,
    writer: Writer<File>,
}

impl CountsReport {
    /// Creates the counts report file, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a CSV or cannot be created.
    pub fn create(options: &ReportOptions) -> Result<CountsReport, SimError> {
        let path = options.path_for(COUNTS_REPORT_NAME);
        let file = generate_validate_filepath(&path)?;
        debug!("writing counts report to {}", path.display());
        Ok(CountsReport {
            path,
            writer: Writer::from_writer(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per tick of `series`.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be written.
    pub fn write_series(&mut self, scenario: &str, series: &TimeSeries) -> Result<(), SimError> {
        trace!("writing {} rows for scenario {}", series.len(), scenario);
        for (tick, counts) in series.iter().enumerate() {
            self.writer.serialize(CountsRow {
                scenario,
                tick,
                susceptible: counts.susceptible,
                infected: counts.infected,
                recovered: counts.recovered,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
