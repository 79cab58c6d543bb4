// covrl-report/src/analysis/training_log.rs
//! Training metrics mined from the RL fine-tuning log.
//!
//! The log is free text. Fine-tune calls are counted by a literal marker and
//! the trainer's result dictionaries are scraped for `train_loss` and
//! `train_runtime` values.

use crate::errors::{ReportError, Stage};
use crate::utils;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Printed once at the start of every fine-tune call
pub const FINETUNE_START_MARKER: &str = "Start fine-tuning";

static TRAIN_LOSS_REGEX: Lazy<Regex> = Lazy::new(|| field_regex("train_loss"));
static TRAIN_RUNTIME_REGEX: Lazy<Regex> = Lazy::new(|| field_regex("train_runtime"));

/// Matches `'<name>': <float>` with either quote style
fn field_regex(name: &str) -> Regex {
    let pattern = format!(
        r#"['"]{}['"]\s*:\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)"#,
        regex::escape(name)
    );
    Regex::new(&pattern).expect("field pattern is valid")
}

/// Every float captured by `regex`, in order of appearance
fn extract_floats(regex: &Regex, field: &str, text: &str) -> Vec<f64> {
    regex
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = &caps[1];
            match raw.parse::<f64>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping unparsable {} value `{}`: {}", field, raw, e);
                    None
                }
            }
        })
        .collect()
}

/// Number of complete training cycles for `finetune_calls` calls.
///
/// Each cycle is assumed to be exactly `calls_per_cycle` consecutive calls
/// (critic, then actor). Aborted or interleaved calls are not detected.
pub fn pair_into_cycles(finetune_calls: usize, calls_per_cycle: usize) -> usize {
    finetune_calls / calls_per_cycle.max(1)
}

/// Metrics extracted from a training log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingMetrics {
    pub finetune_calls: usize,
    pub cycles_done: usize,
    /// Losses rounded to 4 decimals
    pub train_losses: Vec<f64>,
    /// Per-call runtimes in seconds
    pub train_runtimes: Vec<f64>,
}

impl TrainingMetrics {
    pub fn extract(text: &str, calls_per_cycle: usize) -> Self {
        let finetune_calls = text.matches(FINETUNE_START_MARKER).count();
        let train_losses = extract_floats(&TRAIN_LOSS_REGEX, "train_loss", text)
            .into_iter()
            .map(|loss| utils::round_to(loss, 4))
            .collect();
        let train_runtimes = extract_floats(&TRAIN_RUNTIME_REGEX, "train_runtime", text);

        Self {
            finetune_calls,
            cycles_done: pair_into_cycles(finetune_calls, calls_per_cycle),
            train_losses,
            train_runtimes,
        }
    }

    /// Sum of all fine-tune runtimes in minutes
    pub fn total_runtime_minutes(&self) -> f64 {
        self.train_runtimes.iter().sum::<f64>() / 60.0
    }
}

/// Outcome of the training log stage
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingLog {
    /// The log file does not exist
    Missing { path: PathBuf },
    Found(TrainingMetrics),
}

impl TrainingLog {
    /// Read and mine the log at `path`. A missing file is not an error.
    pub fn load(path: &Path, calls_per_cycle: usize) -> Result<Self, ReportError> {
        let Some(text) = utils::read_optional_text(Stage::RlCycles, path)? else {
            info!("No training log at {}", path.display());
            return Ok(TrainingLog::Missing {
                path: path.to_path_buf(),
            });
        };

        let metrics = TrainingMetrics::extract(&text, calls_per_cycle);
        info!(
            "Found {} fine-tune calls in {}",
            metrics.finetune_calls,
            path.display()
        );
        debug!(
            "Training log: {} losses, {} runtimes",
            metrics.train_losses.len(),
            metrics.train_runtimes.len()
        );
        Ok(TrainingLog::Found(metrics))
    }
}
