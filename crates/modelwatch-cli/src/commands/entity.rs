use modelwatch_analytics::records::{latest_metric_for_entity, metrics_for_entity, MetricRecord, Snapshot};
use serde::Serialize;

use crate::snapshot::entity_display_name;

/// Metric history of one entity plus its latest snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub name: String,
    pub history: Vec<MetricRecord>,
    pub latest: Option<MetricRecord>,
}

pub fn entity_summary(snapshot: &Snapshot, entity_id: &str) -> EntitySummary {
    let history = metrics_for_entity(&snapshot.metrics, entity_id);
    if history.is_empty() {
        log::warn!("No metric records for entity '{}'", entity_id);
    }
    EntitySummary {
        entity_id: entity_id.to_string(),
        name: entity_display_name(snapshot, entity_id),
        latest: latest_metric_for_entity(&snapshot.metrics, entity_id).cloned(),
        history,
    }
}
