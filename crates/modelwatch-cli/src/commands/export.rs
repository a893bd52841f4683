//! `modelwatch export`: build a report artifact from a snapshot.
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use modelwatch_analytics::aggregate::kpi_metrics_with;
use modelwatch_analytics::config::ThresholdTable;
use modelwatch_analytics::records::{latest_metric_for_entity, metrics_for_entity, MonitoringJobRecord, Snapshot};
use modelwatch_export::capture::{CaptureAdapter, DirectoryCaptureAdapter, NullCaptureAdapter};
use modelwatch_export::section::SectionKey;
use modelwatch_export::{ExportConfig, ExportFormat, ExportOrchestrator, ExportOutcome, ExportRequest};

use crate::commands::summary::load_thresholds;
use crate::snapshot::{entity_display_name, load_snapshot};

/// Command-line overrides for one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub snapshot: PathBuf,
    pub format: ExportFormat,
    pub entity: Option<String>,
    pub sections: Option<Vec<SectionKey>>,
    pub captures: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
}

/// Parse a comma separated section list such as `kpis,drift-distribution`.
pub fn parse_sections(raw: &str) -> Result<Vec<SectionKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<SectionKey>().map_err(anyhow::Error::msg))
        .collect()
}

/// Resolve the effective export configuration: file values, then flags.
pub fn resolve_config(args: &ExportArgs) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => {
            let config = ExportConfig::default();
            log::debug!(
                "No export config provided; using defaults:\n{}",
                serde_json::to_string_pretty(&config).unwrap_or_default()
            );
            config
        }
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(sections) = &args.sections {
        config.sections = sections.clone();
    }
    Ok(config)
}

/// Assemble the request the dashboard would hand to the orchestrator.
///
/// With an entity selected the history, latest record and KPIs are scoped
/// to it; otherwise they cover the whole portfolio.
pub fn build_request(
    snapshot: &Snapshot,
    args: &ExportArgs,
    config: &ExportConfig,
    thresholds: &ThresholdTable,
) -> ExportRequest {
    let mut request = ExportRequest::new(args.format);
    request.included_sections = config.sections.iter().copied().collect::<BTreeSet<_>>();

    match &args.entity {
        Some(id) => {
            let history = metrics_for_entity(&snapshot.metrics, id);
            let jobs: Vec<MonitoringJobRecord> = snapshot
                .monitoring_jobs
                .iter()
                .filter(|j| &j.entity_id == id)
                .cloned()
                .collect();
            request.kpis = kpi_metrics_with(
                &snapshot.models,
                &history,
                &jobs,
                &snapshot.quality_reports,
                thresholds,
            );
            request.latest_metric = latest_metric_for_entity(&snapshot.metrics, id).cloned();
            request.metrics_for_entity = history;
            request.selected_entity = Some(entity_display_name(snapshot, id));
        }
        None => {
            request.kpis = kpi_metrics_with(
                &snapshot.models,
                &snapshot.metrics,
                &snapshot.monitoring_jobs,
                &snapshot.quality_reports,
                thresholds,
            );
            request.metrics_for_entity = snapshot.metrics.clone();
        }
    }
    request
}

async fn export_with<A: CaptureAdapter>(
    adapter: A,
    config: ExportConfig,
    request: &ExportRequest,
) -> Result<ExportOutcome> {
    let orchestrator = ExportOrchestrator::new(adapter, config);
    let outcome = orchestrator
        .export(request)
        .await
        .context("Report export failed")?;
    Ok(outcome)
}

pub async fn run_export(args: &ExportArgs) -> Result<ExportOutcome> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let config = resolve_config(args)?;
    let thresholds = load_thresholds(args.thresholds.as_deref())?;
    let request = build_request(&snapshot, args, &config, &thresholds);

    match &args.captures {
        Some(dir) => export_with(DirectoryCaptureAdapter::new(dir), config, &request).await,
        None => export_with(NullCaptureAdapter, config, &request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_parse_from_comma_list() {
        let sections = parse_sections("kpis, drift-distribution,").unwrap();
        assert_eq!(sections, vec![SectionKey::Kpis, SectionKey::DriftDistribution]);
        assert!(parse_sections("kpis,bogus").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = ExportArgs {
            output_dir: Some(PathBuf::from("reports")),
            sections: Some(vec![SectionKey::Kpis]),
            ..ExportArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.sections, vec![SectionKey::Kpis]);
        assert_eq!(config.settle_delay_ms, 500);
    }
}
