// covrl-report/src/errors.rs
//! Error types for report generation

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bitmap,
    FuzzerStats,
    CoverageOverTime,
    RlCycles,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Bitmap => "bitmap",
            Stage::FuzzerStats => "fuzzer stats",
            Stage::CoverageOverTime => "coverage over time",
            Stage::RlCycles => "rl cycles",
        };
        f.write_str(name)
    }
}

/// Errors that abort report generation
#[derive(Error, Debug)]
pub enum ReportError {
    /// A required artifact does not exist or could not be read
    #[error("[{stage}] cannot read {}: {source}", .path.display())]
    MissingArtifact {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A required artifact exists but holds no data
    #[error("[{stage}] {} is empty", .path.display())]
    EmptyArtifact { stage: Stage, path: PathBuf },

    /// A required field is absent or unparsable
    #[error("[{stage}] malformed field `{field}`: {detail}")]
    MalformedData {
        stage: Stage,
        field: String,
        detail: String,
    },

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    pub(crate) fn missing(stage: Stage, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::MissingArtifact {
            stage,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(stage: Stage, field: impl Into<String>, detail: impl Into<String>) -> Self {
        ReportError::MalformedData {
            stage,
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Stage the error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ReportError::MissingArtifact { stage, .. }
            | ReportError::EmptyArtifact { stage, .. }
            | ReportError::MalformedData { stage, .. } => Some(*stage),
            ReportError::Config(_) => None,
        }
    }
}
