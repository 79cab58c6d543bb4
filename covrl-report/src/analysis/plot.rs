// covrl-report/src/analysis/plot.rs
//! Down-sampling of the fuzzer's `plot_data` snapshot series

use crate::errors::{ReportError, Stage};
use crate::utils;
use log::{debug, info};
use std::path::Path;

const TIME_FIELD: usize = 0;
const PATHS_FIELD: usize = 3;
const CRASHES_FIELD: usize = 7;
const EXEC_RATE_FIELD: usize = 10;

/// One snapshot line, fields trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRow {
    pub relative_time: i64,
    pub paths: String,
    pub crashes: String,
    pub exec_rate: String,
}

impl PlotRow {
    /// Parse a comma-separated data line. `line_no` is the 1-based line in the file.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ReportError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |idx: usize, name: &str| {
            fields.get(idx).copied().ok_or_else(|| {
                ReportError::malformed(
                    Stage::CoverageOverTime,
                    name,
                    format!("line {} has only {} fields", line_no, fields.len()),
                )
            })
        };

        let raw_time = field(TIME_FIELD, "relative_time")?;
        let relative_time = raw_time.parse().map_err(|_| {
            ReportError::malformed(
                Stage::CoverageOverTime,
                "relative_time",
                format!("line {}: `{}` is not an integer", line_no, raw_time),
            )
        })?;

        Ok(Self {
            relative_time,
            paths: field(PATHS_FIELD, "paths")?.to_string(),
            crashes: field(CRASHES_FIELD, "crashes")?.to_string(),
            exec_rate: field(EXEC_RATE_FIELD, "exec_rate")?.to_string(),
        })
    }
}

/// A displayed point of the coverage timeline
#[derive(Debug, Clone, PartialEq)]
pub struct SampledRow {
    /// Hours since the first snapshot
    pub elapsed_hours: f64,
    pub paths: String,
    pub crashes: String,
    pub exec_rate: String,
}

/// Sampled timeline plus the number of data rows it was drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTimeline {
    pub row_count: usize,
    pub samples: Vec<SampledRow>,
}

/// Drop blank and `#` comment lines, keeping each row's 1-based file line number
pub fn data_lines(text: &str) -> Vec<(usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(idx, line)| (idx + 1, line))
        .collect()
}

/// Indices of the rows shown for a series of `row_count` rows
pub fn sample_indices(row_count: usize, intervals: usize) -> impl Iterator<Item = usize> {
    let step = (row_count / intervals.max(1)).max(1);
    (0..row_count).step_by(step)
}

impl CoverageTimeline {
    /// Sample `intervals + 1` evenly spaced rows at most. Returns `Ok(None)`
    /// when the text holds no data rows.
    pub fn sample(text: &str, intervals: usize) -> Result<Option<Self>, ReportError> {
        let lines = data_lines(text);
        let Some(&(first_no, first)) = lines.first() else {
            return Ok(None);
        };
        let t0 = PlotRow::parse(first, first_no)?.relative_time;

        let samples = sample_indices(lines.len(), intervals)
            .map(|idx| -> Result<SampledRow, ReportError> {
                let (line_no, line) = lines[idx];
                let row = PlotRow::parse(line, line_no)?;
                let elapsed = row.relative_time.checked_sub(t0).ok_or_else(|| {
                    ReportError::malformed(
                        Stage::CoverageOverTime,
                        "relative_time",
                        format!("line {}: {} - {} overflows", line_no, row.relative_time, t0),
                    )
                })?;
                Ok(SampledRow {
                    elapsed_hours: elapsed as f64 / 3600.0,
                    paths: row.paths,
                    crashes: row.crashes,
                    exec_rate: row.exec_rate,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Sampled {} of {} plot rows", samples.len(), lines.len());
        Ok(Some(Self {
            row_count: lines.len(),
            samples,
        }))
    }

    /// Read and sample the plot data at `path`
    pub fn load(path: &Path, intervals: usize) -> Result<Self, ReportError> {
        let text = utils::read_artifact_text(Stage::CoverageOverTime, path)?;
        let timeline = Self::sample(&text, intervals)?.ok_or_else(|| ReportError::EmptyArtifact {
            stage: Stage::CoverageOverTime,
            path: path.to_path_buf(),
        })?;
        info!("Loaded {} plot datapoints from {}", timeline.row_count, path.display());
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "# relative_time, cycles_done, cur_item, corpus_count, pending_total, pending_favs, map_size, saved_crashes, saved_hangs, max_depth, execs_per_sec, total_execs, edges_found";

    fn row(t: i64, paths: u64, crashes: u64, rate: f64) -> String {
        format!("{t}, 0, 0, {paths}, 10, 1, 1.23%, {crashes}, 0, 2, {rate:.2}, 1000, 500")
    }

    fn series(n: usize) -> String {
        let mut text = String::from(HEADER);
        text.push('\n');
        for i in 0..n {
            text.push_str(&row(100 + i as i64 * 60, i as u64, 0, 250.0));
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_row_fields_are_trimmed() -> Result<(), Box<dyn std::error::Error>> {
        let parsed = PlotRow::parse(&row(3600, 42, 1, 99.5), 1)?;
        assert_eq!(parsed.relative_time, 3600);
        assert_eq!(parsed.paths, "42");
        assert_eq!(parsed.crashes, "1");
        assert_eq!(parsed.exec_rate, "99.50");
        Ok(())
    }

    #[test]
    fn test_short_row() {
        let err = PlotRow::parse("1, 2, 3", 4).unwrap_err();
        assert!(err.to_string().contains("paths"));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_error_names_file_line() {
        let text = format!("{}\n\n{}\n1, 2, 3\n", HEADER, row(100, 1, 0, 1.0));
        let err = CoverageTimeline::sample(&text, 8).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{err}");
    }

    #[test]
    fn test_elapsed_overflow_is_malformed() {
        let text = format!("{}\n{}\n", row(i64::MIN, 1, 0, 1.0), row(1, 2, 0, 1.0));
        match CoverageTimeline::sample(&text, 8) {
            Err(ReportError::MalformedData { stage, field, .. }) => {
                assert_eq!(stage, Stage::CoverageOverTime);
                assert_eq!(field, "relative_time");
            }
            other => panic!("expected an overflow error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_row() -> Result<(), Box<dyn std::error::Error>> {
        let timeline = CoverageTimeline::sample(&series(1), 8)?.unwrap();
        assert_eq!(timeline.row_count, 1);
        assert_eq!(timeline.samples.len(), 1);
        assert_eq!(timeline.samples[0].elapsed_hours, 0.0);
        Ok(())
    }

    #[test]
    fn test_800_rows_step_100() {
        let indices: Vec<usize> = sample_indices(800, 8).collect();
        assert_eq!(indices, vec![0, 100, 200, 300, 400, 500, 600, 700]);
    }

    #[test]
    fn test_uneven_series_yields_nine_points() {
        let indices: Vec<usize> = sample_indices(803, 8).collect();
        assert_eq!(indices.len(), 9);
        assert_eq!(indices[8], 800);
    }

    #[test]
    fn test_short_series_keeps_every_row() {
        let indices: Vec<usize> = sample_indices(5, 8).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let mut text = series(9);
        text.insert_str(HEADER.len() + 1, "\n   \n");
        let timeline = CoverageTimeline::sample(&text, 8)?.unwrap();
        assert_eq!(timeline.row_count, 9);
        assert_eq!(timeline.samples.len(), 9);
        assert_eq!(timeline.samples[8].paths, "8");
        Ok(())
    }

    #[test]
    fn test_elapsed_hours_from_first_row() -> Result<(), Box<dyn std::error::Error>> {
        let text = format!("{}\n{}\n", row(1000, 1, 0, 1.0), row(1000 + 5400, 2, 0, 1.0));
        let timeline = CoverageTimeline::sample(&text, 8)?.unwrap();
        assert_eq!(timeline.samples[1].elapsed_hours, 1.5);
        Ok(())
    }

    #[test]
    fn test_no_data_rows() -> Result<(), Box<dyn std::error::Error>> {
        assert!(CoverageTimeline::sample(HEADER, 8)?.is_none());
        Ok(())
    }

    #[test]
    fn test_unsampled_rows_are_not_parsed() -> Result<(), Box<dyn std::error::Error>> {
        let mut text = series(16);
        text.push_str("truncated");
        // 17 rows, step 2: the trailing row sits at index 16 and is sampled
        assert!(CoverageTimeline::sample(&text, 8).is_err());

        let mut text = series(17);
        text.push_str("truncated");
        // 18 rows, step 2: index 17 is skipped
        let timeline = CoverageTimeline::sample(&text, 8)?.unwrap();
        assert_eq!(timeline.row_count, 18);
        Ok(())
    }
}
