//! Pure aggregators from record collections to dashboard summaries.
//!
//! Each function takes borrowed snapshots and returns fresh values, so calls
//! are re-entrant and idempotent. None of them fail.
pub mod deployments;
pub mod drift;
pub mod health;
pub mod kpi;
pub mod quality;

pub use deployments::{deployment_status, DeploymentStatusRow};
pub use drift::{drift_distribution, DriftSummary};
pub use health::{health_rollup, HealthRollup};
pub use kpi::{kpi_metrics, kpi_metrics_with, KpiEntry};
pub use quality::{estimate_missing_rate, quality_heatmap, QualityHeatmapRow};
