// covrl-report/src/reporters/mod.rs
//! Text rendering of a run analysis

use crate::analysis::{BitmapSummary, CoverageTimeline, RunAnalysis, StatsSummary, TrainingLog};
use crate::config::BaselineReference;
use chrono::DateTime;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Section headers, in print order
pub const SECTIONS: [&str; 5] = [
    "BITMAP",
    "FUZZER STATS",
    "COVERAGE OVER TIME",
    "RL CYCLES",
    "ERROR RATE",
];

/// Human-readable report for one run
pub struct RunReport<'a> {
    pub run_id: &'a str,
    pub analysis: &'a RunAnalysis,
    pub baseline: &'a BaselineReference,
}

impl<'a> RunReport<'a> {
    pub fn new(run_id: &'a str, analysis: &'a RunAnalysis, baseline: &'a BaselineReference) -> Self {
        Self {
            run_id,
            analysis,
            baseline,
        }
    }
}

impl Display for RunReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== CovRL Run {} ===\n", self.run_id)?;
        write_bitmap(f, &self.analysis.bitmap, self.baseline)?;
        write_stats(f, &self.analysis.stats)?;
        write_timeline(f, &self.analysis.timeline)?;
        write_training(f, &self.analysis.training, self.baseline)?;
        write_error_rate(f, self.baseline)
    }
}

fn write_bitmap(f: &mut Formatter<'_>, bitmap: &BitmapSummary, baseline: &BaselineReference) -> fmt::Result {
    writeln!(f, "[{}]", SECTIONS[0])?;
    writeln!(f, "  size         : {} (2^{})", bitmap.length, bitmap.log2_length())?;
    writeln!(f, "  edges hit    : {}", bitmap.edges_hit)?;
    writeln!(f, "  coverage     : {:.2}%", bitmap.coverage_pct)?;
    writeln!(f, "  paper total  : {}", baseline.total_coverage)?;
    writeln!(f, "  paper valid  : {}", baseline.valid_coverage)?;
    if bitmap.saturated {
        let size = bitmap.recommended_map_size();
        writeln!(
            f,
            "  !! SATURATED: rebuild the target with AFL_MAP_SIZE={} (2^{})",
            size,
            size.ilog2()
        )?;
    }
    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn write_stats(f: &mut Formatter<'_>, stats: &StatsSummary) -> fmt::Result {
    writeln!(f, "\n[{}]", SECTIONS[1])?;
    match u64::try_from(stats.runtime_secs) {
        Ok(secs) => writeln!(
            f,
            "  runtime       : {:.2}h ({})",
            stats.runtime_hours,
            humantime::format_duration(Duration::from_secs(secs))
        )?,
        Err(_) => writeln!(f, "  runtime       : {:.2}h", stats.runtime_hours)?,
    }
    writeln!(f, "  started       : {}", format_timestamp(stats.start_time))?;
    writeln!(f, "  last update   : {}", format_timestamp(stats.last_update))?;
    writeln!(f, "  execs_done    : {}", crate::utils::group_thousands(stats.execs_done))?;
    match stats.exec_per_sec {
        Some(rate) => writeln!(f, "  exec/sec avg  : {:.2}", rate)?,
        None => writeln!(f, "  exec/sec avg  : undefined (no elapsed runtime)")?,
    }
    writeln!(f, "  paths_total   : {}", stats.paths_total)?;
    writeln!(f, "  unique_crashes: {}", stats.unique_crashes)?;
    writeln!(f, "  unique_hangs  : {}", stats.unique_hangs)?;
    writeln!(f, "  bitmap_cvg    : {}", stats.bitmap_cvg)
}

fn write_timeline(f: &mut Formatter<'_>, timeline: &CoverageTimeline) -> fmt::Result {
    writeln!(f, "\n[{}]  ({} datapoints)", SECTIONS[2], timeline.row_count)?;
    writeln!(f, "  {:>8}  {:>7}  {:>8}  {:>7}", "time(h)", "paths", "crashes", "exec/s")?;
    for row in &timeline.samples {
        writeln!(
            f,
            "  {:8.1}  {:>7}  {:>8}  {:>7}",
            row.elapsed_hours, row.paths, row.crashes, row.exec_rate
        )?;
    }
    Ok(())
}

fn write_training(f: &mut Formatter<'_>, training: &TrainingLog, baseline: &BaselineReference) -> fmt::Result {
    writeln!(f, "\n[{}]", SECTIONS[3])?;
    let metrics = match training {
        TrainingLog::Missing { path } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return writeln!(f, "  {} not found", name);
        }
        TrainingLog::Found(metrics) => metrics,
    };

    writeln!(f, "  finetune calls : {}  (critic + actor per cycle)", metrics.finetune_calls)?;
    writeln!(
        f,
        "  cycles done    : {}  (paper: ~{} in 24h)",
        metrics.cycles_done, baseline.cycles_per_day
    )?;
    if !metrics.train_losses.is_empty() {
        let losses: Vec<String> = metrics.train_losses.iter().map(|l| format!("{:?}", l)).collect();
        writeln!(f, "  train losses   : [{}]", losses.join(", "))?;
    }
    if !metrics.train_runtimes.is_empty() {
        let per_call: Vec<String> = metrics.train_runtimes.iter().map(|r| format!("{:.1}", r)).collect();
        writeln!(
            f,
            "  total finetune : {:.1} min  |  per call: [{}]s",
            metrics.total_runtime_minutes(),
            per_call.join(", ")
        )?;
    }
    Ok(())
}

fn write_error_rate(f: &mut Formatter<'_>, baseline: &BaselineReference) -> fmt::Result {
    writeln!(f, "\n[{}]", SECTIONS[4])?;
    // No error-rate metric is derived from the run artifacts yet
    writeln!(f, "  not computed   (paper: {:.2}%)", baseline.error_rate)
}
