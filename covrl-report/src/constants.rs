// covrl-report/src/constants.rs
//! Shared constants for the run report

/// Default directory holding one subdirectory per run, relative to `$HOME`
pub const DEFAULT_BASE_DIR: &str = "data_store/out";

/// Default fuzzer instance directory inside a run directory
pub const DEFAULT_FUZZER_INSTANCE: &str = "fuzzer01";

/// Artifact file names
pub mod artifacts {
    /// Raw coverage bitmap written by the fuzzer
    pub const BITMAP: &str = "fuzz_bitmap";
    /// `key: value` run statistics written by the fuzzer
    pub const STATS: &str = "fuzzer_stats";
    /// Periodic snapshot CSV written by the fuzzer
    pub const PLOT_DATA: &str = "plot_data";
    /// RL fine-tuning log, lives in the run directory
    pub const TRAINING_LOG: &str = "covrl.log";
}

/// Coverage percentage above which the bitmap is considered saturated
pub const SATURATION_THRESHOLD_PCT: f64 = 70.0;

/// Number of intervals the coverage timeline is split into
pub const SAMPLE_INTERVALS: usize = 8;

/// Fine-tune calls making up one training cycle (critic, then actor)
pub const CALLS_PER_CYCLE: usize = 2;

/// Reference values from the published CovRL run
pub mod baseline {
    /// Error rate in percent
    pub const ERROR_RATE: f64 = 58.84;
    /// Total edges covered
    pub const TOTAL_COVERAGE: u64 = 23246;
    /// Edges covered by valid inputs
    pub const VALID_COVERAGE: u64 = 20844;
    /// Training cycles completed in 24 hours
    pub const CYCLES_PER_DAY: u32 = 9;
}

/// Environment variables consulted when building settings
pub mod env_vars {
    /// Overrides the base directory
    pub const BASE_DIR: &str = "COVRL_BASE_DIR";
    /// Overrides the fuzzer instance name
    pub const FUZZER_INSTANCE: &str = "COVRL_FUZZER_INSTANCE";
    /// Log filter used when `RUST_LOG` is unset
    pub const LOG_LEVEL: &str = "COVRL_LOG_LEVEL";
}

/// Log filter used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";
