// covrl-report/src/analysis/stats.rs
//! Parsing of the fuzzer's `key: value` statistics file

use crate::errors::{ReportError, Stage};
use crate::utils;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

/// Keys every statistics file must carry
pub const REQUIRED_KEYS: [&str; 7] = [
    "start_time",
    "last_update",
    "execs_done",
    "paths_total",
    "unique_crashes",
    "unique_hangs",
    "bitmap_cvg",
];

/// Raw statistics, values kept as the fuzzer wrote them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    fields: HashMap<String, String>,
}

impl RunStats {
    /// Split each line on its first colon. Lines without one are skipped.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn require(&self, key: &str) -> Result<&str, ReportError> {
        self.get(key)
            .ok_or_else(|| ReportError::malformed(Stage::FuzzerStats, key, "missing key"))
    }

    fn require_int<T: std::str::FromStr>(&self, key: &str) -> Result<T, ReportError> {
        let raw = self.require(key)?;
        raw.parse().map_err(|_| {
            ReportError::malformed(Stage::FuzzerStats, key, format!("`{}` is not an integer", raw))
        })
    }

    /// Check required keys and compute runtime and throughput
    pub fn summarize(&self) -> Result<StatsSummary, ReportError> {
        for key in REQUIRED_KEYS {
            self.require(key)?;
        }

        let start_time: i64 = self.require_int("start_time")?;
        let last_update: i64 = self.require_int("last_update")?;
        let execs_done: u64 = self.require_int("execs_done")?;

        let runtime_secs = last_update.checked_sub(start_time).ok_or_else(|| {
            ReportError::malformed(
                Stage::FuzzerStats,
                "last_update",
                format!("runtime {} - {} overflows", last_update, start_time),
            )
        })?;
        let runtime_hours = runtime_secs as f64 / 3600.0;
        let exec_per_sec = exec_rate(execs_done, runtime_hours);
        debug!(
            "Stats: runtime {:.2}h, {} execs, exec/sec {:?}",
            runtime_hours, execs_done, exec_per_sec
        );

        Ok(StatsSummary {
            start_time,
            last_update,
            runtime_secs,
            runtime_hours,
            execs_done,
            exec_per_sec,
            paths_total: self.require("paths_total")?.to_string(),
            unique_crashes: self.require("unique_crashes")?.to_string(),
            unique_hangs: self.require("unique_hangs")?.to_string(),
            bitmap_cvg: self.require("bitmap_cvg")?.to_string(),
        })
    }

    /// Read, parse and summarize the statistics file at `path`
    pub fn load(path: &Path) -> Result<StatsSummary, ReportError> {
        let text = utils::read_artifact_text(Stage::FuzzerStats, path)?;
        let stats = Self::parse(&text);
        info!("Parsed {} fuzzer stats from {}", stats.len(), path.display());
        stats.summarize()
    }
}

/// Average executions per second. `None` when the run has no positive duration.
pub fn exec_rate(execs_done: u64, runtime_hours: f64) -> Option<f64> {
    if runtime_hours > 0.0 {
        Some(execs_done as f64 / (runtime_hours * 3600.0))
    } else {
        None
    }
}

/// Derived figures from the statistics file
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub start_time: i64,
    pub last_update: i64,
    pub runtime_secs: i64,
    pub runtime_hours: f64,
    pub execs_done: u64,
    /// `None` stands for an undefined rate (zero or negative runtime)
    pub exec_per_sec: Option<f64>,
    pub paths_total: String,
    pub unique_crashes: String,
    pub unique_hangs: String,
    pub bitmap_cvg: String,
}
