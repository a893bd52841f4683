//! Statistical drift checks between a baseline and a current sample.
//!
//! Three detectors are provided:
//!
//! * data drift: two-sample Kolmogorov-Smirnov test per feature column,
//! * concept drift: accuracy degradation against a reference accuracy,
//! * prediction drift: relative shift of the mean prediction.
//!
//! A [`DriftReport`] projects into a [`MonitoringJobRecord`] so detector
//! output can be fed straight into the aggregators.
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::AnalyticsError;
use crate::records::MonitoringJobRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub feature: String,
    pub statistic: f64,
    pub p_value: f64,
    pub drifted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDriftResult {
    pub detected: bool,
    /// Largest KS statistic among drifted features, scaled to percent.
    pub score: f64,
    pub affected_features: Vec<String>,
    /// Smallest p-value over all features.
    pub p_value: f64,
    pub features: Vec<FeatureDrift>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptDriftResult {
    pub detected: bool,
    pub score: f64,
    pub current_accuracy: f64,
    pub baseline_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDriftResult {
    pub detected: bool,
    pub score: f64,
    pub current_mean: f64,
    pub baseline_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub data_drift: DataDriftResult,
    pub concept_drift: Option<ConceptDriftResult>,
    pub prediction_drift: Option<PredictionDriftResult>,
}

impl DriftReport {
    /// Project the report into a monitoring job reading for `entity_id`.
    ///
    /// `data_drift` is the largest per-feature KS statistic and `model_drift`
    /// the concept drift accuracy loss, both clamped to `[0, 1]`.
    pub fn to_monitoring_job(&self, entity_id: &str) -> MonitoringJobRecord {
        let max_statistic = self
            .data_drift
            .features
            .iter()
            .map(|f| f.statistic)
            .fold(0.0_f64, f64::max);

        MonitoringJobRecord {
            entity_id: entity_id.to_string(),
            data_drift: Some(max_statistic.clamp(0.0, 1.0)),
            model_drift: self
                .concept_drift
                .as_ref()
                .map(|c| (c.score / 100.0).clamp(0.0, 1.0)),
        }
    }

    pub fn any_detected(&self) -> bool {
        self.data_drift.detected
            || self.concept_drift.as_ref().map_or(false, |c| c.detected)
            || self.prediction_drift.as_ref().map_or(false, |p| p.detected)
    }
}

/// Drift detector with a single significance / tolerance threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftDetector {
    pub threshold: f64,
    pub baseline_accuracy: f64,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self {
            threshold: 0.10,
            baseline_accuracy: 0.95,
        }
    }
}

impl DriftDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Compare each feature column of `current` against `baseline` with a KS test.
    ///
    /// A feature drifts when its p-value falls below the detector threshold.
    /// Columns are tested in parallel; results keep feature order.
    pub fn detect_data_drift(
        &self,
        current: ArrayView2<f64>,
        baseline: ArrayView2<f64>,
        features: &[String],
    ) -> Result<DataDriftResult, AnalyticsError> {
        if current.ncols() != baseline.ncols() {
            return Err(AnalyticsError::ShapeMismatch {
                baseline: baseline.ncols(),
                current: current.ncols(),
            });
        }
        if features.len() != current.ncols() {
            return Err(AnalyticsError::FeatureCount {
                features: current.ncols(),
                names: features.len(),
            });
        }

        let per_feature: Vec<FeatureDrift> = (0..features.len())
            .into_par_iter()
            .map(|i| {
                let base = baseline.column(i).to_vec();
                let curr = current.column(i).to_vec();
                let (statistic, p_value) = ks_two_sample(&base, &curr);
                FeatureDrift {
                    feature: features[i].clone(),
                    statistic,
                    p_value,
                    drifted: p_value < self.threshold,
                }
            })
            .collect();

        let affected_features: Vec<String> = per_feature
            .iter()
            .filter(|f| f.drifted)
            .map(|f| f.feature.clone())
            .collect();
        let max_drift = per_feature
            .iter()
            .filter(|f| f.drifted)
            .map(|f| f.statistic)
            .fold(0.0_f64, f64::max);
        let p_value = per_feature
            .iter()
            .map(|f| f.p_value)
            .fold(1.0_f64, f64::min);

        Ok(DataDriftResult {
            detected: !affected_features.is_empty(),
            score: max_drift * 100.0,
            affected_features,
            p_value,
            features: per_feature,
        })
    }

    /// Accuracy degradation of `predictions` against `actuals`.
    ///
    /// An empty sample carries no evidence and reports no drift.
    pub fn detect_concept_drift<T: PartialEq>(
        &self,
        predictions: &[T],
        actuals: &[T],
    ) -> Result<ConceptDriftResult, AnalyticsError> {
        if predictions.len() != actuals.len() {
            return Err(AnalyticsError::LengthMismatch {
                predictions: predictions.len(),
                actuals: actuals.len(),
            });
        }

        let accuracy = if predictions.is_empty() {
            self.baseline_accuracy
        } else {
            let hits = predictions
                .iter()
                .zip(actuals)
                .filter(|(p, a)| p == a)
                .count();
            hits as f64 / predictions.len() as f64
        };

        let drift = (self.baseline_accuracy - accuracy).abs();
        Ok(ConceptDriftResult {
            detected: drift > self.threshold,
            score: drift * 100.0,
            current_accuracy: accuracy,
            baseline_accuracy: self.baseline_accuracy,
        })
    }

    /// Relative shift of the mean prediction.
    ///
    /// A zero (or undefined) baseline mean cannot be compared against and
    /// yields a zero score.
    pub fn detect_prediction_drift(&self, current: &[f64], baseline: &[f64]) -> PredictionDriftResult {
        let current_mean = if current.is_empty() { 0.0 } else { current.iter().mean() };
        let baseline_mean = if baseline.is_empty() { 0.0 } else { baseline.iter().mean() };

        if baseline_mean == 0.0 || !baseline_mean.is_finite() {
            log::warn!("Baseline prediction mean is zero; prediction drift not computed");
            return PredictionDriftResult {
                detected: false,
                score: 0.0,
                current_mean,
                baseline_mean,
            };
        }

        let drift = ((current_mean - baseline_mean) / baseline_mean).abs();
        PredictionDriftResult {
            detected: drift > self.threshold,
            score: drift * 100.0,
            current_mean,
            baseline_mean,
        }
    }
}

/// Two-sample Kolmogorov-Smirnov statistic and asymptotic p-value.
///
/// The p-value always comes from the asymptotic Kolmogorov series with the
/// effective sample size `n*m/(n+m)`; no exact small-sample distribution is
/// used. For small samples it can differ from an exact test, so readings
/// close to the drift threshold may classify differently.
///
/// Returns `(0.0, 1.0)` when either sample is empty.
pub fn ks_two_sample(a: &[f64], b: &[f64]) -> (f64, f64) {
    if a.is_empty() || b.is_empty() {
        return (0.0, 1.0);
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0_f64;

    while i < a.len() && j < b.len() {
        let (x1, x2) = (a[i], b[j]);
        // Step past ties in both samples together.
        if x1 <= x2 {
            i += 1;
        }
        if x2 <= x1 {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }

    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let p_value = kolmogorov_q((en + 0.12 + 0.11 / en) * d);
    (d, p_value)
}

/// Complementary Kolmogorov distribution `Q_KS(lambda)`.
fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut term_prev = 0.0_f64;

    for j in 1..=100 {
        let jf = j as f64;
        let term = fac * (a2 * jf * jf).exp();
        sum += term;
        if term.abs() <= 0.001 * term_prev || term.abs() <= 1.0e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        term_prev = term.abs();
    }
    // Series did not converge: lambda is near zero, samples are indistinguishable.
    1.0
}
