// CovRL run report
// Core library definition

pub mod constants;
pub mod utils;

// Core modules
pub mod analysis;
pub mod config;
pub mod errors;
pub mod reporters;

// Re-exports for convenience
pub use analysis::{analyze_run, RunAnalysis};
pub use config::{BaselineReference, RunLayout, Settings};
pub use errors::{ReportError, Stage};
pub use reporters::RunReport;

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise the filter comes from `COVRL_LOG_LEVEL`
/// and defaults to warnings only. Logs go to stderr so stdout carries only the
/// report. Safe to call more than once.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(utils::get_log_level());
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Analyze a run and render its report
///
/// Nothing is rendered unless every mandatory artifact was analyzed.
pub fn generate_report(layout: &RunLayout, settings: &Settings) -> Result<String, ReportError> {
    log::info!("Analyzing run {} in {}", layout.run_id, layout.run_dir.display());
    let analysis = analyze_run(layout, &settings.analysis)?;
    Ok(RunReport::new(&layout.run_id, &analysis, &settings.baseline).to_string())
}
