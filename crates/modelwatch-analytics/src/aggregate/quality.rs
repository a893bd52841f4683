use serde::{Deserialize, Serialize};

use crate::records::{Dataset, QualityReport, Severity};

/// Percentage points added per issue that mentions missing values.
pub const MISSING_RATE_STEP: f64 = 5.0;
const MISSING_KEYWORD: &str = "missing";
const UNKNOWN_DATASET: &str = "Unknown Dataset";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityHeatmapRow {
    pub dataset_name: String,
    pub quality_score: f64,
    pub missing_rate: f64,
    pub issue_count: usize,
    pub severity: Severity,
}

/// Estimated missing-value rate of a report, in percent.
///
/// This is a presentation heuristic, not a measurement: each issue whose
/// description mentions "missing" adds 5 points, capped at 100.
pub fn estimate_missing_rate(report: &QualityReport) -> f64 {
    let hits = report
        .issues
        .iter()
        .filter(|i| i.description.to_lowercase().contains(MISSING_KEYWORD))
        .count();
    (hits as f64 * MISSING_RATE_STEP).min(100.0)
}

/// Severity tier of a report. Rules are evaluated high, then medium, then low.
pub fn report_severity(report: &QualityReport) -> Severity {
    let has = |sev: Severity| report.issues.iter().any(|i| i.severity == sev);

    if has(Severity::High) || report.quality_score < 60.0 {
        Severity::High
    } else if has(Severity::Medium) || report.quality_score < 80.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// One heatmap row per report, joined to its dataset name.
pub fn quality_heatmap(reports: &[QualityReport], datasets: &[Dataset]) -> Vec<QualityHeatmapRow> {
    reports
        .iter()
        .map(|report| {
            let dataset_name = datasets
                .iter()
                .find(|d| d.id == report.dataset_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| UNKNOWN_DATASET.to_string());

            QualityHeatmapRow {
                dataset_name,
                quality_score: report.quality_score,
                missing_rate: estimate_missing_rate(report),
                issue_count: report.issues.len(),
                severity: report_severity(report),
            }
        })
        .collect()
}
