use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{DeploymentRecord, DeploymentStatus, Environment, RegistryModel};

const UNKNOWN_MODEL: &str = "Unknown Model";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatusRow {
    pub deployment_id: String,
    pub model_name: String,
    pub model_version: String,
    pub environment: Environment,
    pub status: DeploymentStatus,
    pub timestamp: DateTime<Utc>,
}

/// Join each deployment to its registry model, in input order.
///
/// Deployments whose model is not in the registry keep placeholder name and
/// version strings instead of being dropped.
pub fn deployment_status(
    deployments: &[DeploymentRecord],
    models: &[RegistryModel],
) -> Vec<DeploymentStatusRow> {
    deployments
        .iter()
        .map(|d| {
            let model = models.iter().find(|m| m.id == d.model_id);
            DeploymentStatusRow {
                deployment_id: d.id.clone(),
                model_name: model
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
                model_version: model
                    .map(|m| m.version.clone())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                environment: d.environment,
                status: d.status,
                timestamp: d.timestamp,
            }
        })
        .collect()
}
