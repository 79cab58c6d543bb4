//! Report generator for a single CovRL fuzzing run

use anyhow::Result;
use clap::Parser;
use covrl_report::{generate_report, Settings};
use log::debug;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Identifier of the run to summarize
    run_id: String,

    /// Directory holding one subdirectory per run
    #[arg(long, short = 'b')]
    base_dir: Option<PathBuf>,

    /// Use this run directory directly instead of <base-dir>/<run-id>
    #[arg(long, short = 'r')]
    run_dir: Option<PathBuf>,

    /// Fuzzer instance directory inside the run directory
    #[arg(long, short = 'f')]
    fuzzer: Option<String>,

    /// TOML settings file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<String> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(base_dir) = cli.base_dir {
        settings.layout.base_dir = base_dir;
    }
    if let Some(fuzzer) = cli.fuzzer {
        settings.layout.fuzzer_instance = fuzzer;
    }

    let layout = settings.layout_for(&cli.run_id, cli.run_dir);
    Ok(generate_report(&layout, &settings)?)
}

fn main() {
    let cli = Cli::parse();
    covrl_report::init_logging();

    match run(cli) {
        Ok(report) => print!("{}", report),
        Err(e) => {
            debug!("Report generation failed: {:?}", e);
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
