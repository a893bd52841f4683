use serde::{Deserialize, Serialize};

use crate::config::{DRIFT_ALERT_THRESHOLD, DRIFT_CRITICAL_THRESHOLD};
use crate::records::{DeploymentRecord, DeploymentStatus, MonitoringJobRecord, RegistryModel};
use crate::stats::{mean, round2};

/// Portfolio-wide health figures shown on the overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthRollup {
    pub total_models: usize,
    pub models_in_production: usize,
    pub production_percentage: u32,
    pub avg_drift: f64,
    pub alert_count: usize,
    pub critical_alerts: usize,
    pub warning_alerts: usize,
}

/// Share of registry models in production, rounded to a whole percent.
pub fn production_percentage(models: &[RegistryModel]) -> u32 {
    if models.is_empty() {
        return 0;
    }
    let in_prod = models.iter().filter(|m| m.in_production()).count();
    (in_prod as f64 / models.len() as f64 * 100.0).round() as u32
}

/// Data and model drift of every job as one sample; absent readings count as zero.
pub(crate) fn pooled_drift(jobs: &[MonitoringJobRecord]) -> Vec<f64> {
    jobs.iter()
        .flat_map(|j| [j.data_drift.unwrap_or(0.0), j.model_drift.unwrap_or(0.0)])
        .collect()
}

/// Roll models, monitoring jobs and deployments up into one [`HealthRollup`].
///
/// Alerts are drift readings above 0.15 plus failed deployments. Readings
/// above 0.25 and failed deployments are critical; the rest are warnings.
pub fn health_rollup(
    models: &[RegistryModel],
    jobs: &[MonitoringJobRecord],
    deployments: &[DeploymentRecord],
) -> HealthRollup {
    let drift = pooled_drift(jobs);
    let failed = deployments
        .iter()
        .filter(|d| d.status == DeploymentStatus::Failed)
        .count();

    let drift_alerts = drift.iter().filter(|&&d| d > DRIFT_ALERT_THRESHOLD).count();
    let critical_drift = drift.iter().filter(|&&d| d > DRIFT_CRITICAL_THRESHOLD).count();

    let alert_count = drift_alerts + failed;
    let critical_alerts = critical_drift + failed;

    HealthRollup {
        total_models: models.len(),
        models_in_production: models.iter().filter(|m| m.in_production()).count(),
        production_percentage: production_percentage(models),
        avg_drift: round2(mean(&drift)),
        alert_count,
        critical_alerts,
        warning_alerts: alert_count - critical_alerts,
    }
}
