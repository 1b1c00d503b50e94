//! Aggregation, persistence, and rendering of sweep results.
//!
//! [`summarize`] is a pure function from raw trials to a [`Report`]; calling
//! it twice on the same input yields identical content. The serialized JSON
//! table is the sweep's only durable artifact and is read back solely for
//! rendering, never re-parsed by the harness itself.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::ParameterPoint;
use crate::runner::{TrialResult, TrialStatus};

/// Errors from report persistence.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Report
// =============================================================================

/// One grid point's aggregated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub point: ParameterPoint,
    pub status: TrialStatus,
    /// Successful iterations.
    pub iterations: usize,
    pub requested: usize,
    pub min_secs: Option<f64>,
    pub median_secs: Option<f64>,
    pub max_secs: Option<f64>,
    /// Model fits one tuning call implies: `resolution^tuned_params * folds`.
    pub models_trained: u64,
    /// Worst observed time in minutes, for eyeballing sweep cost.
    pub max_minutes: Option<f64>,
}

/// The full sweep result table, one row per grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Hyperparameter count behind the `models_trained` derivation.
    pub tuned_params: u32,
    pub rows: Vec<ReportRow>,
}

/// Aggregate raw trials into a report. Pure; the input is not consumed or
/// reordered.
pub fn summarize(results: &[(ParameterPoint, TrialResult)], tuned_params: u32) -> Report {
    let rows = results
        .iter()
        .map(|(point, trial)| {
            let min_secs = trial.min().map(|d| d.as_secs_f64());
            let median_secs = trial.median().map(|d| d.as_secs_f64());
            let max_secs = trial.max().map(|d| d.as_secs_f64());
            ReportRow {
                point: point.clone(),
                status: trial.status(),
                iterations: trial.elapsed.len(),
                requested: trial.requested,
                min_secs,
                median_secs,
                max_secs,
                models_trained: (point.grid_resolution as u64).pow(tuned_params)
                    * point.cv_folds as u64,
                max_minutes: max_secs.map(|s| s / 60.0),
            }
        })
        .collect();

    Report { tuned_params, rows }
}

impl Report {
    /// Write the report as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Read a report back from a JSON artifact.
    pub fn load(path: &Path) -> Result<Report, ReportError> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    /// Render a markdown view, faceted by row count.
    ///
    /// Within a facet, one line per (threads, workers) series and resolution,
    /// ordered by models trained: median elapsed time with min/max as the
    /// error band.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Parallel Tuning Benchmark\n\n");

        let mut row_counts: Vec<usize> = self.rows.iter().map(|r| r.point.row_count).collect();
        row_counts.sort_unstable();
        row_counts.dedup();

        for row_count in row_counts {
            out.push_str(&format!("## {} rows\n\n", row_count));
            out.push_str("| models trained | threads x workers | median (s) | min (s) | max (s) | status |\n");
            out.push_str("|----------------|-------------------|------------|---------|---------|--------|\n");

            let mut facet: Vec<&ReportRow> = self
                .rows
                .iter()
                .filter(|r| r.point.row_count == row_count)
                .collect();
            facet.sort_by_key(|r| (r.models_trained, r.point.threads, r.point.workers));

            for row in facet {
                let status = match row.status {
                    TrialStatus::Complete => "ok".to_string(),
                    TrialStatus::Partial => {
                        format!("partial {}/{}", row.iterations, row.requested)
                    }
                    TrialStatus::Failed => "failed".to_string(),
                };
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    row.models_trained,
                    row.point.label(),
                    format_secs(row.median_secs),
                    format_secs(row.min_secs),
                    format_secs(row.max_secs),
                    status,
                ));
            }
            out.push('\n');
        }

        out
    }
}

fn format_secs(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn point(row_count: usize, threads: usize, workers: usize) -> ParameterPoint {
        ParameterPoint {
            engine: "mock".to_string(),
            cv_folds: 8,
            grid_resolution: 5,
            row_count,
            threads,
            workers,
        }
    }

    fn results() -> Vec<(ParameterPoint, TrialResult)> {
        vec![
            (
                point(100, 2, 4),
                TrialResult {
                    elapsed: vec![
                        Duration::from_secs(4),
                        Duration::from_secs(6),
                        Duration::from_secs(5),
                    ],
                    requested: 3,
                    failures: vec![],
                },
            ),
            (
                point(10_000, 1, 1),
                TrialResult {
                    elapsed: vec![],
                    requested: 3,
                    failures: vec!["engine failure: out of memory".to_string(); 3],
                },
            ),
        ]
    }

    #[test]
    fn derived_columns() {
        let report = summarize(&results(), 2);
        let row = &report.rows[0];
        // 5^2 candidates x 8 folds.
        assert_eq!(row.models_trained, 200);
        assert_relative_eq!(row.median_secs.unwrap(), 5.0);
        assert_relative_eq!(row.max_minutes.unwrap(), 0.1);
        assert_eq!(row.status, TrialStatus::Complete);
    }

    #[test]
    fn failed_points_are_surfaced_not_dropped() {
        let report = summarize(&results(), 2);
        let row = &report.rows[1];
        assert_eq!(row.status, TrialStatus::Failed);
        assert_eq!(row.iterations, 0);
        assert_eq!(row.median_secs, None);
        assert_eq!(row.models_trained, 200);
    }

    #[test]
    fn summarize_is_idempotent() {
        let input = results();
        assert_eq!(summarize(&input, 2), summarize(&input, 2));
    }

    #[test]
    fn markdown_facets_by_row_count() {
        let markdown = summarize(&results(), 2).to_markdown();
        assert!(markdown.contains("## 100 rows"));
        assert!(markdown.contains("## 10000 rows"));
        assert!(markdown.contains("| 200 | 2t/4w | 5.00 | 4.00 | 6.00 | ok |"));
        assert!(markdown.contains("| 200 | 1t/1w | - | - | - | failed |"));
    }
}
