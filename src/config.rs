//! Configuration management and validation.
//!
//! Provides the processing configuration: input and output locations,
//! table scan limits, ingestion concurrency and audit thresholds. Values
//! are layered defaults -> TOML file -> command-line flags.

use crate::constants::{
    DEFAULT_DRIVER_FOLDER, DEFAULT_FILE_PATTERN, DEFAULT_MAX_EMPTY_ROWS, DEFAULT_MAX_SCAN_ROWS,
    DEFAULT_OUTLIER_SIGMA, DEFAULT_VEHICLE_FOLDER,
};
use crate::error::{ProcessorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Limits that bound the row scan of a single billing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Consecutive blank description cells that end the table
    pub max_empty_rows: usize,

    /// Rows scanned past the header before the scan is truncated
    pub max_scan_rows: u32,

    /// Keep rows whose description has no recognizable plate
    pub keep_unplated_rows: bool,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_empty_rows: DEFAULT_MAX_EMPTY_ROWS,
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
            keep_unplated_rows: false,
        }
    }
}

/// Complete processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Folder holding the invoice workbooks
    pub input_dir: PathBuf,

    /// Folder receiving the report folders
    pub output_dir: PathBuf,

    /// Glob pattern selecting invoice files inside `input_dir`
    pub file_pattern: String,

    /// Sub-folder of `output_dir` for per-vehicle reports
    pub vehicle_folder: String,

    /// Sub-folder of `output_dir` for per-driver reports
    pub driver_folder: String,

    /// Files parsed concurrently (1 = sequential, 0 = one per CPU)
    pub workers: usize,

    /// Outlier threshold in standard deviations above the mean
    pub outlier_sigma: f64,

    /// Month label for report names; detected from file names when unset
    pub month: Option<String>,

    /// Parse and audit only, without writing reports
    pub dry_run: bool,

    pub scan: ScanLimits,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("invoices"),
            output_dir: PathBuf::from("reports"),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            vehicle_folder: DEFAULT_VEHICLE_FOLDER.to_string(),
            driver_folder: DEFAULT_DRIVER_FOLDER.to_string(),
            workers: 1,
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            month: None,
            dry_run: false,
            scan: ScanLimits::default(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with input and output folders
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            ProcessorError::configuration(format!("invalid config {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default location of the configuration file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("invoice-processor").join("config.toml"))
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Use a fixed month label instead of detecting it
    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    /// Set the file pattern used for input discovery
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Set table scan limits
    pub fn with_scan_limits(mut self, scan: ScanLimits) -> Self {
        self.scan = scan;
        self
    }

    /// Set the outlier threshold in standard deviations
    pub fn with_outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = sigma;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Number of files to parse concurrently, resolving 0 to the CPU count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    pub fn vehicle_output_dir(&self) -> PathBuf {
        self.output_dir.join(&self.vehicle_folder)
    }

    pub fn driver_output_dir(&self) -> PathBuf {
        self.output_dir.join(&self.driver_folder)
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.file_pattern.trim().is_empty() {
            return Err(ProcessorError::configuration("file pattern must not be empty"));
        }
        if self.vehicle_folder.trim().is_empty() || self.driver_folder.trim().is_empty() {
            return Err(ProcessorError::configuration(
                "report folder names must not be empty",
            ));
        }
        if self.vehicle_folder == self.driver_folder {
            return Err(ProcessorError::configuration(
                "vehicle and driver reports need separate folders",
            ));
        }
        if self.scan.max_empty_rows == 0 {
            return Err(ProcessorError::configuration(
                "max_empty_rows must be at least 1",
            ));
        }
        if self.scan.max_scan_rows == 0 {
            return Err(ProcessorError::configuration("max_scan_rows must be at least 1"));
        }
        if !self.outlier_sigma.is_finite() || self.outlier_sigma < 0.0 {
            return Err(ProcessorError::configuration(format!(
                "outlier_sigma must be a non-negative number, got {}",
                self.outlier_sigma
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProcessorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.max_empty_rows, 5);
        assert_eq!(config.scan.max_scan_rows, 1000);
        assert_eq!(config.file_pattern, "*.xlsx");
        assert_eq!(config.workers, 1);
        assert!(!config.scan.keep_unplated_rows);
    }

    #[test]
    fn test_builder_methods() {
        let config = ProcessorConfig::new("in", "out")
            .with_workers(4)
            .with_month("май")
            .with_outlier_sigma(3.0)
            .with_dry_run();

        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.effective_workers(), 4);
        assert_eq!(config.month.as_deref(), Some("май"));
        assert_eq!(config.outlier_sigma, 3.0);
        assert!(config.dry_run);
        assert_eq!(config.vehicle_output_dir(), PathBuf::from("out/by-vehicle"));
        assert_eq!(config.driver_output_dir(), PathBuf::from("out/by-driver"));
    }

    #[test]
    fn test_zero_workers_resolves_to_cpu_count() {
        let config = ProcessorConfig::default().with_workers(0);
        assert!(config.effective_workers() >= 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ProcessorConfig::default();
        config.driver_folder = config.vehicle_folder.clone();
        assert!(config.validate().is_err());

        let config = ProcessorConfig::default().with_outlier_sigma(-1.0);
        assert!(config.validate().is_err());

        let config = ProcessorConfig::default().with_scan_limits(ScanLimits {
            max_empty_rows: 0,
            ..Default::default()
        });
        assert!(config.validate().is_err());

        let config = ProcessorConfig::default().with_file_pattern(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "input_dir = \"/data/invoices\"").unwrap();
        writeln!(file, "workers = 3").unwrap();
        writeln!(file, "[scan]").unwrap();
        writeln!(file, "max_empty_rows = 8").unwrap();

        let config = ProcessorConfig::from_toml_file(file.path()).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("/data/invoices"));
        assert_eq!(config.workers, 3);
        assert_eq!(config.scan.max_empty_rows, 8);
        assert_eq!(config.scan.max_scan_rows, 1000);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "workers = \"many\"").unwrap();

        let err = ProcessorConfig::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ProcessorError::Configuration { .. }));
    }
}
