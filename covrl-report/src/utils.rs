// covrl-report/src/utils.rs
//! Utility functions shared by the analysis stages

use crate::constants;
use crate::errors::{ReportError, Stage};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Get the log filter from environment or default to warnings only
pub fn get_log_level() -> String {
    env::var(constants::env_vars::LOG_LEVEL)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| constants::DEFAULT_LOG_LEVEL.to_string())
}

/// Get the base directory override from the environment, if set
pub fn get_base_dir_override() -> Option<PathBuf> {
    env::var_os(constants::env_vars::BASE_DIR)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Get the fuzzer instance override from the environment, if set
pub fn get_fuzzer_instance_override() -> Option<String> {
    env::var(constants::env_vars::FUZZER_INSTANCE)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Default base directory, `~/data_store/out`
pub fn default_base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::DEFAULT_BASE_DIR)
}

/// Read a mandatory binary artifact in full
pub fn read_artifact_bytes(stage: Stage, path: &Path) -> Result<Vec<u8>, ReportError> {
    fs::read(path).map_err(|e| ReportError::missing(stage, path, e))
}

/// Read a mandatory text artifact in full. Contents that are not UTF-8 are
/// malformed, not missing.
pub fn read_artifact_text(stage: Stage, path: &Path) -> Result<String, ReportError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => ReportError::malformed(
            stage,
            "contents",
            format!("{} is not valid UTF-8", path.display()),
        ),
        _ => ReportError::missing(stage, path, e),
    })
}

/// Read an optional text artifact; `Ok(None)` when the file does not exist.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_optional_text(stage: Stage, path: &Path) -> Result<Option<String>, ReportError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ReportError::missing(stage, path, e)),
    }
}

/// Format an integer with `,` thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(100000), "100,000");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(12.34, 1), 12.3);
        assert_eq!(round_to(2.0, 4), 2.0);
    }

    #[test]
    fn test_optional_text_absent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let text = read_optional_text(Stage::RlCycles, &dir.path().join("covrl.log"))?;
        assert!(text.is_none());
        Ok(())
    }

    #[test]
    fn test_optional_text_lossy() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("covrl.log");
        fs::write(&path, b"Start fine-tuning \xff\n")?;
        let text = read_optional_text(Stage::RlCycles, &path)?.unwrap_or_default();
        assert!(text.contains("Start fine-tuning"));
        Ok(())
    }

    #[test]
    fn test_mandatory_artifact_missing() {
        let err = read_artifact_bytes(Stage::Bitmap, Path::new("/nonexistent/fuzz_bitmap"))
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingArtifact { stage: Stage::Bitmap, .. }));
    }

    #[test]
    fn test_mandatory_text_not_utf8() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fuzzer_stats");
        fs::write(&path, b"execs_done : \xff\xfe\n")?;

        let err = read_artifact_text(Stage::FuzzerStats, &path).unwrap_err();
        assert!(matches!(err, ReportError::MalformedData { stage: Stage::FuzzerStats, .. }));
        assert!(err.to_string().contains("not valid UTF-8"));
        Ok(())
    }
}
