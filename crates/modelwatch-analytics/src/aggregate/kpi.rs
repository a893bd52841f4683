use serde::{Deserialize, Serialize};

use crate::aggregate::health::production_percentage;
use crate::aggregate::quality::estimate_missing_rate;
use crate::config::{KpiCategory, KpiMetric, KpiStatus, ThresholdTable};
use crate::records::{metric_keys, MetricRecord, MonitoringJobRecord, QualityReport, RegistryModel};
use crate::stats::{mean, round2, round_to};

/// One KPI card: current value, baseline comparison and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiEntry {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub baseline: f64,
    pub delta_pct: f64,
    pub status: KpiStatus,
    pub category: KpiCategory,
}

/// [`kpi_metrics_with`] using the default threshold table.
pub fn kpi_metrics(
    models: &[RegistryModel],
    records: &[MetricRecord],
    jobs: &[MonitoringJobRecord],
    quality_reports: &[QualityReport],
) -> Vec<KpiEntry> {
    kpi_metrics_with(models, records, jobs, quality_reports, &ThresholdTable::default())
}

/// Flat KPI list across the performance, stability, features and business categories.
///
/// A KPI is only emitted when its source collection is non-empty and the
/// averaged value is positive; missing data omits the entry instead of
/// reporting a zero. Metrics absent from `table` are skipped.
pub fn kpi_metrics_with(
    models: &[RegistryModel],
    records: &[MetricRecord],
    jobs: &[MonitoringJobRecord],
    quality_reports: &[QualityReport],
    table: &ThresholdTable,
) -> Vec<KpiEntry> {
    let record_mean = |key: &str| -> Option<f64> {
        if records.is_empty() {
            return None;
        }
        let values: Vec<f64> = records.iter().map(|r| r.metric(key)).collect();
        Some(mean(&values))
    };

    let job_mean = |pick: fn(&MonitoringJobRecord) -> Option<f64>| -> Option<f64> {
        if jobs.is_empty() {
            return None;
        }
        let values: Vec<f64> = jobs.iter().map(|j| pick(j).unwrap_or(0.0)).collect();
        Some(mean(&values))
    };

    let quality_mean = |pick: fn(&QualityReport) -> f64| -> Option<f64> {
        if quality_reports.is_empty() {
            return None;
        }
        let values: Vec<f64> = quality_reports.iter().map(pick).collect();
        Some(mean(&values))
    };

    let sources: Vec<(KpiMetric, Option<f64>)> = vec![
        (KpiMetric::Auc, record_mean(metric_keys::AUC)),
        (KpiMetric::KsStatistic, record_mean(metric_keys::KS)),
        (KpiMetric::Gini, record_mean(metric_keys::GINI)),
        (KpiMetric::Psi, record_mean(metric_keys::PSI)),
        (KpiMetric::PopulationStability, job_mean(|j| j.data_drift)),
        (KpiMetric::ModelDrift, job_mean(|j| j.model_drift)),
        (KpiMetric::DataQualityScore, quality_mean(|q| q.quality_score)),
        (KpiMetric::MissingRate, quality_mean(estimate_missing_rate)),
        (KpiMetric::BadRate, record_mean(metric_keys::BAD_RATE)),
        (
            KpiMetric::ProductionCoverage,
            (!models.is_empty()).then(|| production_percentage(models) as f64),
        ),
    ];

    let mut entries: Vec<KpiEntry> = sources
        .into_iter()
        .filter_map(|(metric, value)| {
            let value = value.filter(|v| *v > 0.0)?;
            let Some(threshold) = table.get(metric) else {
                log::debug!("No threshold configured for {}, skipping", metric);
                return None;
            };
            Some(KpiEntry {
                name: metric.label().to_string(),
                value: round_to(value, 4),
                unit: threshold.unit.clone(),
                baseline: threshold.baseline,
                delta_pct: round2(threshold.delta_pct(value)),
                status: threshold.classify(value),
                category: threshold.category,
            })
        })
        .collect();

    // Categories come from the table, so a custom table may regroup metrics.
    entries.sort_by_key(|e| e.category);
    entries
}
