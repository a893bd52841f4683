//! Export orchestration: settle, capture, compose, write.
use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use modelwatch_analytics::aggregate::KpiEntry;
use modelwatch_analytics::records::MetricRecord;

use crate::capture::{CaptureAdapter, CapturedImage};
use crate::composer::{PaginatedComposer, SectionComposer, SectionContent, SlideDeckComposer};
use crate::config::{ExportConfig, ExportFormat};
use crate::cover::{CoverSummary, DEFAULT_ENTITY};
use crate::error::ExportError;
use crate::layout::{Document, PageGeometry};
use crate::render;
use crate::section::{section_plan, ExportSection, SectionKey, SectionKind};

/// Everything one export needs from the current dashboard state.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Display name of the selected entity; `None` exports the whole portfolio.
    pub selected_entity: Option<String>,
    pub metrics_for_entity: Vec<MetricRecord>,
    pub latest_metric: Option<MetricRecord>,
    pub kpis: Vec<KpiEntry>,
    pub included_sections: BTreeSet<SectionKey>,
    pub generated_on: NaiveDate,
}

impl ExportRequest {
    /// Request for `format` with every section included and today's date.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            selected_entity: None,
            metrics_for_entity: Vec::new(),
            latest_metric: None,
            kpis: Vec::new(),
            included_sections: SectionKey::ALL.into_iter().collect(),
            generated_on: Local::now().date_naive(),
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub page_count: usize,
    pub bytes_written: usize,
    /// Included sections in output order.
    pub sections: Vec<SectionKey>,
    /// Image sections exported header-only because their capture failed.
    pub degraded_sections: Vec<SectionKey>,
}

/// `{Entity_Name}_Report_{YYYY-MM-DD}.{ext}`; entity defaults to `Portfolio`.
pub fn report_file_name(entity: Option<&str>, date: NaiveDate, format: ExportFormat) -> String {
    let name: String = entity
        .unwrap_or(DEFAULT_ENTITY)
        .chars()
        .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_Report_{}.{}", name, date.format("%Y-%m-%d"), format.extension())
}

pub struct ExportOrchestrator<A> {
    adapter: A,
    config: ExportConfig,
}

impl<A: CaptureAdapter> ExportOrchestrator<A> {
    pub fn new(adapter: A, config: ExportConfig) -> Self {
        Self { adapter, config }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Capture every included image section.
    ///
    /// Waits once for the settle delay before the first capture, then runs
    /// the captures concurrently. Results are returned in `plan` order;
    /// table sections and failed captures are `None`.
    async fn capture_sections(&self, plan: &[ExportSection]) -> Vec<Option<CapturedImage>> {
        if !plan.iter().any(|s| s.kind.is_image()) {
            return vec![None; plan.len()];
        }

        tokio::time::sleep(self.config.settle_delay()).await;

        join_all(plan.iter().map(|section| async move {
            match section.kind {
                SectionKind::Image { .. } => self.adapter.capture(&section.capture_target).await,
                SectionKind::Table => None,
            }
        }))
        .await
    }

    /// Capture and lay out the report without writing it.
    ///
    /// Returns the document together with the image sections that lost
    /// their capture.
    pub async fn build_document(&self, request: &ExportRequest) -> (Document, Vec<SectionKey>) {
        let plan: Vec<ExportSection> = section_plan(&request.included_sections)
            .into_iter()
            .filter(|s| s.included)
            .collect();

        let images = self.capture_sections(&plan).await;

        let degraded: Vec<SectionKey> = plan
            .iter()
            .zip(&images)
            .filter(|(section, image)| section.kind.is_image() && image.is_none())
            .map(|(section, _)| section.key)
            .collect();
        for key in &degraded {
            log::warn!("Section '{}' exported without an image", key);
        }

        let cover = CoverSummary::new(
            request.selected_entity.as_deref(),
            &request.metrics_for_entity,
            request.latest_metric.as_ref(),
            request.generated_on,
        );

        let fraction = self.config.image_width_fraction;
        let document = match request.format {
            ExportFormat::PaginatedDocument => compose(
                PaginatedComposer::new(PageGeometry::a4_portrait(), &cover, fraction),
                &plan,
                &images,
                &request.kpis,
            ),
            ExportFormat::SlideDeck => compose(
                SlideDeckComposer::new(PageGeometry::wide_slide(), &cover, fraction),
                &plan,
                &images,
                &request.kpis,
            ),
        };
        (document, degraded)
    }

    /// Run one export end to end.
    ///
    /// Capture misses degrade their section and the export continues. Only a
    /// failure to write the artifact is returned as an error.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportOutcome, ExportError> {
        log::info!(
            "Exporting {} report for {} ({} sections)",
            request.format,
            request.selected_entity.as_deref().unwrap_or(DEFAULT_ENTITY),
            request.included_sections.len()
        );

        let (document, degraded_sections) = self.build_document(request).await;

        let file_name = report_file_name(
            request.selected_entity.as_deref(),
            request.generated_on,
            request.format,
        );
        let path = self.config.output_dir.join(file_name);
        let title = format!(
            "{} Report {}",
            request.selected_entity.as_deref().unwrap_or(DEFAULT_ENTITY),
            request.generated_on.format("%Y-%m-%d")
        );
        let bytes_written = render::write_artifact(&document, &path, &title)?;

        log::info!(
            "Wrote {} ({} pages, {} bytes)",
            path.display(),
            document.page_count(),
            bytes_written
        );

        Ok(ExportOutcome {
            path,
            format: request.format,
            page_count: document.page_count(),
            bytes_written,
            sections: request.included_sections.iter().copied().collect(),
            degraded_sections,
        })
    }
}

fn compose<C: SectionComposer>(
    mut composer: C,
    plan: &[ExportSection],
    images: &[Option<CapturedImage>],
    kpis: &[KpiEntry],
) -> Document {
    for (i, (section, image)) in plan.iter().zip(images).enumerate() {
        let content = match section.kind {
            SectionKind::Table => SectionContent::Table(kpis),
            SectionKind::Image { .. } => SectionContent::Image(image.as_ref()),
        };
        log::debug!("Composing section {} '{}'", i + 1, section.key);
        composer.append_section(i + 1, section, content);
    }
    composer.finish()
}
