// covrl-report/src/analysis/bitmap.rs
//! Edge coverage derived from the fuzzer's raw coverage bitmap

use crate::errors::{ReportError, Stage};
use crate::utils;
use log::{debug, info, warn};
use std::path::Path;

/// Coverage figures for a single bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapSummary {
    /// Number of slots in the bitmap
    pub length: usize,
    /// Slots with a non-zero hit count
    pub edges_hit: usize,
    /// `edges_hit / length * 100`
    pub coverage_pct: f64,
    /// Set when `coverage_pct` exceeds the saturation threshold
    pub saturated: bool,
}

impl BitmapSummary {
    /// Count covered edges. Returns `None` for an empty bitmap.
    pub fn analyze(bitmap: &[u8], saturation_threshold_pct: f64) -> Option<Self> {
        if bitmap.is_empty() {
            return None;
        }
        let edges_hit = bitmap.iter().filter(|&&b| b > 0).count();
        let coverage_pct = edges_hit as f64 / bitmap.len() as f64 * 100.0;
        Some(Self {
            length: bitmap.len(),
            edges_hit,
            coverage_pct,
            saturated: coverage_pct > saturation_threshold_pct,
        })
    }

    /// Read and analyze the bitmap at `path`
    pub fn load(path: &Path, saturation_threshold_pct: f64) -> Result<Self, ReportError> {
        let bitmap = utils::read_artifact_bytes(Stage::Bitmap, path)?;
        info!("Loaded {} byte coverage bitmap from {}", bitmap.len(), path.display());

        let summary = Self::analyze(&bitmap, saturation_threshold_pct).ok_or_else(|| {
            ReportError::EmptyArtifact {
                stage: Stage::Bitmap,
                path: path.to_path_buf(),
            }
        })?;
        debug!(
            "Bitmap: {} of {} edges hit ({:.2}%)",
            summary.edges_hit, summary.length, summary.coverage_pct
        );
        if summary.saturated {
            warn!(
                "Coverage bitmap is {:.2}% full, edge collisions are likely; use a {} byte map",
                summary.coverage_pct,
                summary.recommended_map_size()
            );
        }
        Ok(summary)
    }

    /// Base-2 logarithm of the bitmap length (bit length minus one)
    pub fn log2_length(&self) -> u32 {
        self.length.ilog2()
    }

    /// Next power of two above the current length
    pub fn recommended_map_size(&self) -> usize {
        (self.length + 1).next_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bitmap_with_hits(len: usize, hits: usize) -> Vec<u8> {
        let mut bitmap = vec![0u8; len];
        for slot in bitmap.iter_mut().take(hits) {
            *slot = 1;
        }
        bitmap
    }

    #[test]
    fn test_empty_bitmap() {
        assert!(BitmapSummary::analyze(&[], 70.0).is_none());
    }

    #[test]
    fn test_hit_magnitude_is_ignored() {
        let summary = BitmapSummary::analyze(&[0, 1, 255, 0, 3, 0, 0, 0], 70.0).unwrap();
        assert_eq!(summary.edges_hit, 3);
        assert_eq!(summary.coverage_pct, 37.5);
    }

    #[test]
    fn test_typical_run() {
        let summary = BitmapSummary::analyze(&bitmap_with_hits(65536, 100), 70.0).unwrap();
        assert_eq!(summary.length, 65536);
        assert_eq!(summary.edges_hit, 100);
        assert_eq!(format!("{:.2}", summary.coverage_pct), "0.15");
        assert!(!summary.saturated);
        assert_eq!(summary.log2_length(), 16);
    }

    #[test]
    fn test_saturation_boundary() {
        // 70% exactly is not saturated, anything above is
        let at = BitmapSummary::analyze(&bitmap_with_hits(100, 70), 70.0).unwrap();
        assert!(!at.saturated);
        let above = BitmapSummary::analyze(&bitmap_with_hits(100, 71), 70.0).unwrap();
        assert!(above.saturated);
    }

    #[test]
    fn test_recommended_map_size() {
        let summary = BitmapSummary::analyze(&bitmap_with_hits(65536, 60000), 70.0).unwrap();
        assert!(summary.saturated);
        assert_eq!(summary.recommended_map_size(), 131072);
        assert_eq!(summary.recommended_map_size().ilog2(), 17);
    }

    #[test]
    fn test_load_empty_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fuzz_bitmap");
        std::fs::write(&path, b"")?;
        let err = BitmapSummary::load(&path, 70.0).unwrap_err();
        assert!(matches!(err, ReportError::EmptyArtifact { stage: Stage::Bitmap, .. }));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let err = BitmapSummary::load(Path::new("/nonexistent/fuzz_bitmap"), 70.0).unwrap_err();
        assert!(matches!(err, ReportError::MissingArtifact { stage: Stage::Bitmap, .. }));
    }

    proptest! {
        #[test]
        fn prop_coverage_matches_hit_ratio(bitmap in proptest::collection::vec(any::<u8>(), 1..4096)) {
            let summary = BitmapSummary::analyze(&bitmap, 70.0).unwrap();
            let hits = bitmap.iter().filter(|&&b| b != 0).count();
            prop_assert_eq!(summary.edges_hit, hits);
            prop_assert_eq!(summary.coverage_pct, hits as f64 / bitmap.len() as f64 * 100.0);
            prop_assert_eq!(summary.saturated, summary.coverage_pct > 70.0);
        }
    }
}
