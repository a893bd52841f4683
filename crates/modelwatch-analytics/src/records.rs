//! Record types consumed by the aggregators.
//!
//! These are read-only projections of upstream collections. Nothing in the
//! crate mutates them; aggregates are recomputed from a fresh snapshot.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Red/amber/green classification attached to a metric snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    #[default]
    Green,
    Amber,
    Red,
}

impl fmt::Display for RagStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RagStatus::Green => write!(f, "green"),
            RagStatus::Amber => write!(f, "amber"),
            RagStatus::Red => write!(f, "red"),
        }
    }
}

/// Scalar metrics produced for one entity in one period (vintage).
///
/// Identity is `(entity_id, period)`. Periods compare lexically, so ISO
/// dates and `YYYY-MM` / `YYYYQn` strings order correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity_id: String,
    pub period: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub status: RagStatus,
}

impl MetricRecord {
    /// Value of a named metric, `0.0` when absent.
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }
}

/// Well-known metric keys in [`MetricRecord::metrics`].
pub mod metric_keys {
    pub const KS: &str = "ks";
    pub const PSI: &str = "psi";
    pub const AUC: &str = "auc";
    pub const GINI: &str = "gini";
    pub const BAD_RATE: &str = "bad_rate";
}

/// One monitoring run for an entity. Drift readings are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringJobRecord {
    pub entity_id: String,
    #[serde(default)]
    pub data_drift: Option<f64>,
    #[serde(default)]
    pub model_drift: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Staging => write!(f, "staging"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Created,
    Building,
    Deploying,
    Active,
    Failed,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DeploymentStatus::Created => "created",
            DeploymentStatus::Building => "building",
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Active => "active",
            DeploymentStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub model_id: String,
    pub environment: Environment,
    pub status: DeploymentStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub description: String,
}

/// Data-quality assessment of one dataset. `quality_score` is in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub dataset_id: String,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStage {
    Development,
    Staging,
    Production,
    Archived,
}

/// A model version registered in the model registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub stage: ModelStage,
}

impl RegistryModel {
    pub fn in_production(&self) -> bool {
        self.stage == ModelStage::Production
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
}

/// Every upstream collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub models: Vec<RegistryModel>,
    pub metrics: Vec<MetricRecord>,
    pub monitoring_jobs: Vec<MonitoringJobRecord>,
    pub deployments: Vec<DeploymentRecord>,
    pub quality_reports: Vec<QualityReport>,
    pub datasets: Vec<Dataset>,
}

/// All records of one entity, sorted by ascending period.
pub fn metrics_for_entity(records: &[MetricRecord], entity_id: &str) -> Vec<MetricRecord> {
    let mut out: Vec<MetricRecord> = records
        .iter()
        .filter(|r| r.entity_id == entity_id)
        .cloned()
        .collect();
    // Stable sort keeps insertion order for duplicate periods.
    out.sort_by(|a, b| a.period.cmp(&b.period));
    out
}

/// The record with the greatest period for `entity_id`.
///
/// On duplicate periods the first record encountered wins.
pub fn latest_metric_for_entity<'a>(
    records: &'a [MetricRecord],
    entity_id: &str,
) -> Option<&'a MetricRecord> {
    records
        .iter()
        .filter(|r| r.entity_id == entity_id)
        .fold(None, |best: Option<&MetricRecord>, r| match best {
            Some(b) if b.period >= r.period => Some(b),
            _ => Some(r),
        })
}

/// Distinct entity ids in first-appearance order.
pub fn entity_ids(records: &[MetricRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in records {
        if !seen.iter().any(|id| id == &r.entity_id) {
            seen.push(r.entity_id.clone());
        }
    }
    seen
}
