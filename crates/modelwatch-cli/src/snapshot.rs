//! Loading dashboard snapshots from disk.
use std::path::Path;

use anyhow::{Context, Result};
use modelwatch_analytics::records::Snapshot;

/// Load a JSON snapshot of every record collection.
///
/// Collections missing from the file load as empty.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read snapshot: {}", path.as_ref().display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.as_ref().display()))?;
    log::debug!(
        "Loaded snapshot {}: {} models, {} metric records, {} monitoring jobs, {} deployments, {} quality reports",
        path.as_ref().display(),
        snapshot.models.len(),
        snapshot.metrics.len(),
        snapshot.monitoring_jobs.len(),
        snapshot.deployments.len(),
        snapshot.quality_reports.len()
    );
    Ok(snapshot)
}

/// Display name for `entity_id`: the registry model name when known.
pub fn entity_display_name(snapshot: &Snapshot, entity_id: &str) -> String {
    snapshot
        .models
        .iter()
        .find(|m| m.id == entity_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| entity_id.to_string())
}
