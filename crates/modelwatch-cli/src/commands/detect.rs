//! `modelwatch detect`: drift between a baseline and a current CSV sample.
//!
//! Every numeric column is a feature, except `prediction` and `actual`,
//! which feed prediction drift and concept drift when present.
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use modelwatch_analytics::detection::{DriftDetector, DriftReport};
use modelwatch_analytics::records::MonitoringJobRecord;
use ndarray::Array2;
use serde::Serialize;

pub const PREDICTION_COLUMN: &str = "prediction";
pub const ACTUAL_COLUMN: &str = "actual";

/// Parsed sample: feature matrix plus the optional label columns.
#[derive(Debug, Clone)]
pub struct Sample {
    pub features: Vec<String>,
    pub matrix: Array2<f64>,
    pub predictions: Option<Vec<f64>>,
    pub actuals: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectOutput {
    pub report: DriftReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_job: Option<MonitoringJobRecord>,
}

/// Read a CSV (or TSV, by extension) sample with a header row.
pub fn read_sample<P: AsRef<Path>>(path: P) -> Result<Sample> {
    let path = path.as_ref();
    let is_tsv = path.extension().map(|e| e == "tsv").unwrap_or(false);
    let delimiter = if is_tsv { b'\t' } else { b',' };

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open sample: {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let label_index = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let prediction_idx = label_index(PREDICTION_COLUMN);
    let actual_idx = label_index(ACTUAL_COLUMN);
    let feature_idx: Vec<usize> = (0..headers.len())
        .filter(|i| Some(*i) != prediction_idx && Some(*i) != actual_idx)
        .collect();

    let mut values: Vec<f64> = Vec::new();
    let mut predictions = Vec::new();
    let mut actuals = Vec::new();
    let mut rows = 0;

    let parse = |raw: &str, column: &str, row: usize| -> Result<f64> {
        raw.trim().parse::<f64>().with_context(|| {
            format!(
                "{}: row {} column '{}' is not numeric: '{}'",
                path.display(),
                row + 1,
                column,
                raw
            )
        })
    };

    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {} of {}", row + 1, path.display()))?;
        for &i in &feature_idx {
            values.push(parse(record.get(i).unwrap_or(""), &headers[i], row)?);
        }
        if let Some(i) = prediction_idx {
            predictions.push(parse(record.get(i).unwrap_or(""), &headers[i], row)?);
        }
        if let Some(i) = actual_idx {
            actuals.push(parse(record.get(i).unwrap_or(""), &headers[i], row)?);
        }
        rows += 1;
    }

    let matrix = Array2::from_shape_vec((rows, feature_idx.len()), values)
        .with_context(|| format!("Ragged rows in {}", path.display()))?;

    Ok(Sample {
        features: feature_idx.iter().map(|&i| headers[i].clone()).collect(),
        matrix,
        predictions: prediction_idx.map(|_| predictions),
        actuals: actual_idx.map(|_| actuals),
    })
}

/// Run every applicable drift check of `detector` on the two samples.
pub fn detect(detector: &DriftDetector, baseline: &Sample, current: &Sample) -> Result<DriftReport> {
    if baseline.features != current.features {
        bail!(
            "Feature columns differ: baseline {:?}, current {:?}",
            baseline.features,
            current.features
        );
    }

    let data_drift = detector.detect_data_drift(current.matrix.view(), baseline.matrix.view(), &current.features)?;

    let prediction_drift = match (&current.predictions, &baseline.predictions) {
        (Some(curr), Some(base)) => Some(detector.detect_prediction_drift(curr, base)),
        _ => None,
    };

    let concept_drift = match (&current.predictions, &current.actuals) {
        (Some(pred), Some(actual)) => Some(detector.detect_concept_drift(pred, actual)?),
        _ => None,
    };

    Ok(DriftReport {
        data_drift,
        concept_drift,
        prediction_drift,
    })
}

/// Load both samples, detect, and project into a monitoring job when `entity` is set.
pub fn run_detect(
    baseline: &Path,
    current: &Path,
    threshold: Option<f64>,
    entity: Option<&str>,
) -> Result<DetectOutput> {
    let detector = threshold.map(DriftDetector::new).unwrap_or_default();
    let baseline = read_sample(baseline)?;
    let current = read_sample(current)?;
    log::info!(
        "Comparing {} baseline rows against {} current rows over {} features",
        baseline.matrix.nrows(),
        current.matrix.nrows(),
        current.features.len()
    );

    let report = detect(&detector, &baseline, &current)?;
    if report.any_detected() {
        log::warn!(
            "Drift detected in features: {}",
            report.data_drift.affected_features.join(", ")
        );
    }

    Ok(DetectOutput {
        monitoring_job: entity.map(|id| report.to_monitoring_job(id)),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn label_columns_are_split_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "sample.csv",
            "age,income,prediction,actual\n30,1000,1,1\n40,2000,0,1\n",
        );
        let sample = read_sample(&path).unwrap();
        assert_eq!(sample.features, vec!["age", "income"]);
        assert_eq!(sample.matrix.dim(), (2, 2));
        assert_eq!(sample.predictions, Some(vec![1.0, 0.0]));
        assert_eq!(sample.actuals, Some(vec![1.0, 1.0]));
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "bad.csv", "age\nforty\n");
        let err = read_sample(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("not numeric"));
    }
}
