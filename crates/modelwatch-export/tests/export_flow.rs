//! End-to-end export tests: capture, compose and write an artifact.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use modelwatch_analytics::aggregate::kpi_metrics;
use modelwatch_analytics::records::{MetricRecord, RagStatus};
use modelwatch_export::capture::{CaptureAdapter, CapturedImage, NullCaptureAdapter};
use modelwatch_export::orchestrator::report_file_name;
use modelwatch_export::section::SectionKey;
use modelwatch_export::{ExportConfig, ExportError, ExportFormat, ExportOrchestrator, ExportRequest};

/// Returns an image for the listed targets and records every call.
struct ScriptedAdapter {
    available: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    fn new(available: Vec<&'static str>) -> Self {
        Self {
            available,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CaptureAdapter for ScriptedAdapter {
    async fn capture(&self, target: &str) -> Option<CapturedImage> {
        self.calls.lock().unwrap().push(target.to_string());
        self.available
            .iter()
            .any(|t| *t == target)
            .then(|| CapturedImage::png(vec![0x89, b'P', b'N', b'G']))
    }
}

/// Records the instant of every capture call.
#[derive(Default)]
struct TimedAdapter {
    calls: Mutex<Vec<tokio::time::Instant>>,
}

#[async_trait]
impl CaptureAdapter for TimedAdapter {
    async fn capture(&self, _target: &str) -> Option<CapturedImage> {
        self.calls.lock().unwrap().push(tokio::time::Instant::now());
        Some(CapturedImage::png(vec![0x89, b'P', b'N', b'G']))
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

fn config(dir: &std::path::Path) -> ExportConfig {
    ExportConfig {
        output_dir: dir.to_path_buf(),
        settle_delay_ms: 0,
        ..ExportConfig::default()
    }
}

fn request(format: ExportFormat, sections: &[SectionKey]) -> ExportRequest {
    ExportRequest {
        included_sections: sections.iter().copied().collect::<BTreeSet<_>>(),
        generated_on: date(),
        ..ExportRequest::new(format)
    }
}

fn record(period: &str, auc: f64, ks: f64) -> MetricRecord {
    let mut metrics = BTreeMap::new();
    metrics.insert("auc".to_string(), auc);
    metrics.insert("ks".to_string(), ks);
    MetricRecord {
        entity_id: "m1".into(),
        period: period.into(),
        metrics,
        volume: 1000,
        status: RagStatus::Amber,
    }
}

#[tokio::test]
async fn kpi_only_export_writes_kpi_table() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = ExportOrchestrator::new(NullCaptureAdapter, config(dir.path()));

    let records = vec![record("2024-06", 0.80, 0.45)];
    let mut req = request(ExportFormat::PaginatedDocument, &[SectionKey::Kpis]);
    req.kpis = kpi_metrics(&[], &records, &[], &[]);
    assert!(req.kpis.iter().any(|k| k.name == "AUC"));

    let outcome = orchestrator.export(&req).await.unwrap();

    assert_eq!(outcome.sections, vec![SectionKey::Kpis]);
    assert!(outcome.degraded_sections.is_empty());
    assert_eq!(outcome.page_count, 1);
    assert_eq!(
        outcome.path.file_name().unwrap().to_str().unwrap(),
        "Portfolio_Report_2024-07-01.html"
    );

    let html = std::fs::read_to_string(&outcome.path).unwrap();
    assert_eq!(html.len(), outcome.bytes_written);
    assert!(html.contains("1. Key Performance Indicators"));
    assert!(html.contains("Metric"));
    assert!(html.contains("AUC"));
    assert!(html.contains("0.800"));
    // AUC 0.80 sits between the warning and good thresholds.
    assert!(html.contains("WARNING"));
    assert!(html.contains("background:#fef3c7"));
    assert!(!html.contains("No KPI data available"));
    assert!(html.contains("Page 1 of 1"));
    assert!(!html.contains("<img"));
}

#[tokio::test]
async fn kpi_export_without_rows_shows_note() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = ExportOrchestrator::new(NullCaptureAdapter, config(dir.path()));

    let outcome = orchestrator
        .export(&request(ExportFormat::PaginatedDocument, &[SectionKey::Kpis]))
        .await
        .unwrap();

    let html = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(html.contains("No KPI data available"));
    assert!(!html.contains("<img"));
}

#[tokio::test(start_paused = true)]
async fn captures_wait_for_one_settle_delay() {
    let dir = tempfile::tempdir().unwrap();
    let delay = Duration::from_millis(300);
    let cfg = ExportConfig {
        settle_delay_ms: 300,
        ..config(dir.path())
    };
    let orchestrator = ExportOrchestrator::new(TimedAdapter::default(), cfg);
    let req = request(
        ExportFormat::PaginatedDocument,
        &[
            SectionKey::PerformanceTrend,
            SectionKey::DriftDistribution,
            SectionKey::QualityHeatmap,
            SectionKey::DecileAnalysis,
        ],
    );

    let start = tokio::time::Instant::now();
    let (_, degraded) = orchestrator.build_document(&req).await;
    let elapsed = start.elapsed();

    assert!(degraded.is_empty());
    let calls = orchestrator.adapter().calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 4);
    for call in &calls {
        assert!(*call - start >= delay, "capture ran before the settle delay");
    }
    assert!(elapsed >= delay);
    assert!(elapsed < delay * 2, "waited {:?}; expected a single settle delay", elapsed);
}

#[tokio::test(start_paused = true)]
async fn table_only_export_skips_settle_delay() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ExportConfig {
        settle_delay_ms: 300,
        ..config(dir.path())
    };
    let orchestrator = ExportOrchestrator::new(TimedAdapter::default(), cfg);

    let start = tokio::time::Instant::now();
    orchestrator
        .build_document(&request(ExportFormat::PaginatedDocument, &[SectionKey::Kpis]))
        .await;

    assert!(start.elapsed() < Duration::from_millis(300));
    assert!(orchestrator.adapter().calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_captures_degrade_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = ScriptedAdapter::new(vec!["section-performance-trend"]);
    let orchestrator = ExportOrchestrator::new(adapter, config(dir.path()));

    let mut req = request(
        ExportFormat::PaginatedDocument,
        &[
            SectionKey::Kpis,
            SectionKey::PerformanceTrend,
            SectionKey::DriftDistribution,
        ],
    );
    req.selected_entity = Some("Retail PD".to_string());

    let (document, degraded) = orchestrator.build_document(&req).await;
    assert_eq!(degraded, vec![SectionKey::DriftDistribution]);
    assert_eq!(document.image_count(), 1);
    assert!(document.page_of_text("3. Drift Distribution").is_some());

    let outcome = orchestrator.export(&req).await.unwrap();
    assert_eq!(outcome.degraded_sections, vec![SectionKey::DriftDistribution]);
    assert!(outcome.path.ends_with("Retail_PD_Report_2024-07-01.html"));
    let html = std::fs::read_to_string(&outcome.path).unwrap();
    assert_eq!(html.matches("<img").count(), 1);
    assert!(html.contains("Retail PD Monitoring Report"));
}

#[tokio::test]
async fn only_included_image_sections_are_captured_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = ScriptedAdapter::new(vec![]);
    let orchestrator = ExportOrchestrator::new(adapter, config(dir.path()));

    let req = request(
        ExportFormat::SlideDeck,
        &[SectionKey::DecileAnalysis, SectionKey::Kpis, SectionKey::QualityHeatmap],
    );
    let (document, _) = orchestrator.build_document(&req).await;

    assert_eq!(
        *orchestrator.adapter().calls.lock().unwrap(),
        vec!["section-quality-heatmap", "section-decile-analysis"]
    );
    // Cover slide plus one slide per included section.
    assert_eq!(document.page_count(), 4);
    assert_eq!(document.page_of_text("1. Key Performance Indicators"), Some(1));
    assert_eq!(document.page_of_text("2. Data Quality Heatmap"), Some(2));
    assert_eq!(document.page_of_text("3. Decile Analysis"), Some(3));
}

#[tokio::test]
async fn slide_deck_uses_its_own_extension() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = ExportOrchestrator::new(NullCaptureAdapter, config(dir.path()));

    let mut metrics = BTreeMap::new();
    metrics.insert("auc".to_string(), 0.81);
    let latest = MetricRecord {
        entity_id: "m1".into(),
        period: "2024-06".into(),
        metrics,
        volume: 1200,
        status: RagStatus::Green,
    };
    let mut req = request(ExportFormat::SlideDeck, &[SectionKey::PerformanceTrend]);
    req.selected_entity = Some("Card Fraud".into());
    req.metrics_for_entity = vec![latest.clone()];
    req.latest_metric = Some(latest);

    let outcome = orchestrator.export(&req).await.unwrap();
    assert!(outcome.path.ends_with("Card_Fraud_Report_2024-07-01.slides.html"));
    assert_eq!(outcome.page_count, 2);
    assert_eq!(outcome.degraded_sections, vec![SectionKey::PerformanceTrend]);

    let html = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(html.contains("size: 13.333in 7.5in"));
    assert!(html.contains("Latest status: GREEN"));
    assert!(html.contains("Page 2 of 2"));
}

#[tokio::test]
async fn unwritable_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();
    let orchestrator = ExportOrchestrator::new(NullCaptureAdapter, config(&blocker));

    let err = orchestrator
        .export(&request(ExportFormat::PaginatedDocument, &[SectionKey::Kpis]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Write { .. }));
}

#[test]
fn report_names_follow_entity_and_date() {
    assert_eq!(
        report_file_name(Some("Retail PD"), date(), ExportFormat::PaginatedDocument),
        "Retail_PD_Report_2024-07-01.html"
    );
    assert_eq!(
        report_file_name(None, date(), ExportFormat::PaginatedDocument),
        "Portfolio_Report_2024-07-01.html"
    );
}
