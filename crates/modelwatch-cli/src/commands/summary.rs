//! `modelwatch summary`: print one dashboard aggregate.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use modelwatch_analytics::aggregate::{
    deployment_status, drift_distribution, health_rollup, kpi_metrics_with, quality_heatmap, KpiEntry,
};
use modelwatch_analytics::config::ThresholdTable;
use modelwatch_analytics::records::Snapshot;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryView {
    Health,
    Drift,
    Quality,
    Kpis,
    Deployments,
}

impl SummaryView {
    pub const NAMES: [&'static str; 5] = ["health", "drift", "quality", "kpis", "deployments"];
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SummaryView::Health => "health",
            SummaryView::Drift => "drift",
            SummaryView::Quality => "quality",
            SummaryView::Kpis => "kpis",
            SummaryView::Deployments => "deployments",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SummaryView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health" => Ok(SummaryView::Health),
            "drift" => Ok(SummaryView::Drift),
            "quality" => Ok(SummaryView::Quality),
            "kpis" | "kpi" => Ok(SummaryView::Kpis),
            "deployments" => Ok(SummaryView::Deployments),
            _ => Err(format!("Unknown summary view: {}", s)),
        }
    }
}

/// Compute `view` over `snapshot` as a JSON value.
pub fn summarize(snapshot: &Snapshot, view: SummaryView, thresholds: &ThresholdTable) -> Result<Value> {
    let value = match view {
        SummaryView::Health => serde_json::to_value(health_rollup(
            &snapshot.models,
            &snapshot.monitoring_jobs,
            &snapshot.deployments,
        ))?,
        SummaryView::Drift => serde_json::to_value(drift_distribution(&snapshot.monitoring_jobs))?,
        SummaryView::Quality => {
            serde_json::to_value(quality_heatmap(&snapshot.quality_reports, &snapshot.datasets))?
        }
        SummaryView::Kpis => serde_json::to_value(snapshot_kpis(snapshot, thresholds))?,
        SummaryView::Deployments => {
            serde_json::to_value(deployment_status(&snapshot.deployments, &snapshot.models))?
        }
    };
    Ok(value)
}

pub fn snapshot_kpis(snapshot: &Snapshot, thresholds: &ThresholdTable) -> Vec<KpiEntry> {
    kpi_metrics_with(
        &snapshot.models,
        &snapshot.metrics,
        &snapshot.monitoring_jobs,
        &snapshot.quality_reports,
        thresholds,
    )
}

/// Load a threshold table, or the defaults when no file is given.
pub fn load_thresholds(path: Option<&Path>) -> Result<ThresholdTable> {
    match path {
        Some(p) => Ok(ThresholdTable::from_json_file(p)?),
        None => Ok(ThresholdTable::default()),
    }
}

/// Write the KPI list as CSV, one row per entry.
pub fn write_kpi_csv<P: AsRef<Path>>(entries: &[KpiEntry], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for entry in entries {
        wtr.serialize(entry)
            .with_context(|| format!("Failed to write KPI row '{}'", entry.name))?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    log::info!("Wrote {} KPI rows to {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names_parse() {
        for name in SummaryView::NAMES {
            let view: SummaryView = name.parse().unwrap();
            assert_eq!(view.to_string(), name);
        }
        assert!("overview".parse::<SummaryView>().is_err());
    }

    #[test]
    fn empty_snapshot_summaries_are_defaults() {
        let snapshot = Snapshot::default();
        let table = ThresholdTable::default();

        let health = summarize(&snapshot, SummaryView::Health, &table).unwrap();
        assert_eq!(health["total_models"], 0);
        assert_eq!(health["production_percentage"], 0);

        let kpis = summarize(&snapshot, SummaryView::Kpis, &table).unwrap();
        assert_eq!(kpis, Value::Array(vec![]));
    }
}
