// covrl-report/src/analysis/mod.rs
//! Analysis stages, one per run artifact

pub mod bitmap;
pub mod plot;
pub mod stats;
pub mod training_log;

pub use bitmap::BitmapSummary;
pub use plot::{CoverageTimeline, PlotRow, SampledRow};
pub use stats::{RunStats, StatsSummary};
pub use training_log::{TrainingLog, TrainingMetrics};

use crate::config::{AnalysisSettings, RunLayout};
use crate::errors::ReportError;

/// Derived values of every stage for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunAnalysis {
    pub bitmap: BitmapSummary,
    pub stats: StatsSummary,
    pub timeline: CoverageTimeline,
    pub training: TrainingLog,
}

/// Run all stages in order. The first failing mandatory stage aborts the run;
/// a missing training log does not.
pub fn analyze_run(layout: &RunLayout, settings: &AnalysisSettings) -> Result<RunAnalysis, ReportError> {
    Ok(RunAnalysis {
        bitmap: BitmapSummary::load(&layout.bitmap, settings.saturation_threshold_pct)?,
        stats: RunStats::load(&layout.stats)?,
        timeline: CoverageTimeline::load(&layout.plot_data, settings.sample_intervals)?,
        training: TrainingLog::load(&layout.training_log, settings.calls_per_cycle)?,
    })
}
