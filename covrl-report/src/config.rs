// covrl-report/src/config.rs
//! Settings for locating a run and analyzing its artifacts.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, `COVRL_*` environment variables, and command line flags.

use crate::constants;
use crate::errors::ReportError;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where run artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Directory holding one subdirectory per run
    pub base_dir: PathBuf,
    /// Fuzzer instance directory inside the run directory
    pub fuzzer_instance: String,
    pub bitmap_file: String,
    pub stats_file: String,
    pub plot_file: String,
    /// Training log, relative to the run directory
    pub training_log_file: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            base_dir: utils::default_base_dir(),
            fuzzer_instance: constants::DEFAULT_FUZZER_INSTANCE.to_string(),
            bitmap_file: constants::artifacts::BITMAP.to_string(),
            stats_file: constants::artifacts::STATS.to_string(),
            plot_file: constants::artifacts::PLOT_DATA.to_string(),
            training_log_file: constants::artifacts::TRAINING_LOG.to_string(),
        }
    }
}

/// Tunables for the derived metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Coverage percentage strictly above which the bitmap is saturated
    pub saturation_threshold_pct: f64,
    /// Number of intervals the coverage timeline is split into
    pub sample_intervals: usize,
    /// Fine-tune calls per training cycle
    pub calls_per_cycle: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            saturation_threshold_pct: constants::SATURATION_THRESHOLD_PCT,
            sample_intervals: constants::SAMPLE_INTERVALS,
            calls_per_cycle: constants::CALLS_PER_CYCLE,
        }
    }
}

/// Reference values from a published run, shown next to measured values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineReference {
    pub error_rate: f64,
    pub total_coverage: u64,
    pub valid_coverage: u64,
    pub cycles_per_day: u32,
}

impl Default for BaselineReference {
    fn default() -> Self {
        Self {
            error_rate: constants::baseline::ERROR_RATE,
            total_coverage: constants::baseline::TOTAL_COVERAGE,
            valid_coverage: constants::baseline::VALID_COVERAGE,
            cycles_per_day: constants::baseline::CYCLES_PER_DAY,
        }
    }
}

/// Complete settings for one report invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutSettings,
    pub analysis: AnalysisSettings,
    pub baseline: BaselineReference,
}

impl Settings {
    /// Load settings from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ReportError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a TOML settings file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let config_str = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&config_str)
            .map_err(|e| ReportError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config_str)
    }

    fn apply_env(&mut self) {
        if let Some(base_dir) = utils::get_base_dir_override() {
            self.layout.base_dir = base_dir;
        }
        if let Some(instance) = utils::get_fuzzer_instance_override() {
            self.layout.fuzzer_instance = instance;
        }
    }

    /// Reject settings that would make the pipeline degenerate
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.analysis.sample_intervals == 0 {
            return Err(ReportError::Config("sample_intervals must be at least 1".to_string()));
        }
        if self.analysis.calls_per_cycle == 0 {
            return Err(ReportError::Config("calls_per_cycle must be at least 1".to_string()));
        }
        if !self.analysis.saturation_threshold_pct.is_finite() {
            return Err(ReportError::Config("saturation_threshold_pct must be finite".to_string()));
        }
        Ok(())
    }

    /// Resolve the artifact paths for a run
    pub fn layout_for(&self, run_id: &str, run_dir: Option<PathBuf>) -> RunLayout {
        let run_dir = run_dir.unwrap_or_else(|| self.layout.base_dir.join(run_id));
        let fuzzer_dir = run_dir.join(&self.layout.fuzzer_instance);
        RunLayout {
            run_id: run_id.to_string(),
            bitmap: fuzzer_dir.join(&self.layout.bitmap_file),
            stats: fuzzer_dir.join(&self.layout.stats_file),
            plot_data: fuzzer_dir.join(&self.layout.plot_file),
            training_log: run_dir.join(&self.layout.training_log_file),
            run_dir,
        }
    }
}

/// Resolved artifact paths of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub bitmap: PathBuf,
    pub stats: PathBuf,
    pub plot_data: PathBuf,
    pub training_log: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baseline() {
        let baseline = BaselineReference::default();
        assert_eq!(baseline.error_rate, 58.84);
        assert_eq!(baseline.total_coverage, 23246);
        assert_eq!(baseline.valid_coverage, 20844);
    }

    #[test]
    fn test_layout_convention() {
        let mut settings = Settings::default();
        settings.layout.base_dir = PathBuf::from("/data/out");
        let layout = settings.layout_for("run2", None);

        assert_eq!(layout.run_dir, PathBuf::from("/data/out/run2"));
        assert_eq!(layout.bitmap, PathBuf::from("/data/out/run2/fuzzer01/fuzz_bitmap"));
        assert_eq!(layout.stats, PathBuf::from("/data/out/run2/fuzzer01/fuzzer_stats"));
        assert_eq!(layout.plot_data, PathBuf::from("/data/out/run2/fuzzer01/plot_data"));
        assert_eq!(layout.training_log, PathBuf::from("/data/out/run2/covrl.log"));
    }

    #[test]
    fn test_run_dir_override() {
        let settings = Settings::default();
        let layout = settings.layout_for("ignored", Some(PathBuf::from("/tmp/run")));
        assert_eq!(layout.bitmap, PathBuf::from("/tmp/run/fuzzer01/fuzz_bitmap"));
        assert_eq!(layout.run_id, "ignored");
    }

    #[test]
    fn test_partial_toml() -> Result<(), Box<dyn std::error::Error>> {
        let settings = Settings::from_toml(
            r#"
            [layout]
            fuzzer_instance = "main"

            [analysis]
            saturation_threshold_pct = 60.0
            "#,
        )?;
        assert_eq!(settings.layout.fuzzer_instance, "main");
        assert_eq!(settings.layout.bitmap_file, "fuzz_bitmap");
        assert_eq!(settings.analysis.saturation_threshold_pct, 60.0);
        assert_eq!(settings.analysis.sample_intervals, 8);
        assert_eq!(settings.baseline, BaselineReference::default());
        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        let err = Settings::from_file(Path::new("/nonexistent/covrl.toml")).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let mut settings = Settings::default();
        settings.analysis.sample_intervals = 0;
        assert!(settings.validate().is_err());
    }
}
