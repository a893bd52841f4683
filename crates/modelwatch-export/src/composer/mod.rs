//! Document composers: one shared section interface, two page models.
//!
//! A composer is created with the cover summary already laid out, receives
//! each included section in order through [`SectionComposer::append_section`]
//! and is consumed by [`SectionComposer::finish`], which stamps the
//! `Page X of N` footers once the total page count is known.
use modelwatch_analytics::aggregate::KpiEntry;

use crate::capture::CapturedImage;
use crate::config::DEFAULT_IMAGE_WIDTH_FRACTION;
use crate::layout::{Document, Element, ElementKind, Page, PageGeometry};
use crate::section::ExportSection;

mod paginated;
mod slides;

pub use paginated::PaginatedComposer;
pub use slides::SlideDeckComposer;

/// What a section contributes besides its numbered header.
#[derive(Debug, Clone, Copy)]
pub enum SectionContent<'a> {
    /// KPI rows rendered as a literal table.
    Table(&'a [KpiEntry]),
    /// Captured raster; `None` when the capture failed.
    Image(Option<&'a CapturedImage>),
}

pub trait SectionComposer {
    /// Lay out one section. `number` is its 1-based position among included sections.
    fn append_section(&mut self, number: usize, section: &ExportSection, content: SectionContent<'_>);

    /// Stamp page numbers and hand back the finished document.
    fn finish(self) -> Document;
}

pub(crate) const KPI_COLUMNS: [&str; 6] = ["Metric", "Category", "Value", "Baseline", "Delta", "Status"];
const KPI_COLUMN_SHARES: [f64; 6] = [0.26, 0.16, 0.14, 0.14, 0.14, 0.16];

pub(crate) fn kpi_column_widths(table_width: f64) -> Vec<f64> {
    KPI_COLUMN_SHARES.iter().map(|s| s * table_width).collect()
}

fn format_quantity(value: f64, unit: &str) -> String {
    if unit == "%" {
        format!("{:.1}%", value)
    } else {
        format!("{:.3}{}", value, unit)
    }
}

pub(crate) fn kpi_cells(entry: &KpiEntry) -> Vec<String> {
    vec![
        entry.name.clone(),
        entry.category.to_string(),
        format_quantity(entry.value, &entry.unit),
        format_quantity(entry.baseline, &entry.unit),
        format!("{:+.1}%", entry.delta_pct),
        entry.status.to_string().to_uppercase(),
    ]
}

/// `fraction` when it lies in `(0, 1]`, otherwise the configured default.
pub(crate) fn checked_width_fraction(fraction: f64) -> f64 {
    if fraction > 0.0 && fraction <= 1.0 {
        fraction
    } else {
        log::warn!(
            "Image width fraction {} outside (0, 1]; using {}",
            fraction,
            DEFAULT_IMAGE_WIDTH_FRACTION
        );
        DEFAULT_IMAGE_WIDTH_FRACTION
    }
}

pub(crate) fn heading(number: usize, section: &ExportSection) -> String {
    format!("{}. {}", number, section.title)
}

/// Second layout pass: add `Page X of N` to every page.
pub(crate) fn stamp_page_numbers(
    pages: &mut [Page],
    geometry: &PageGeometry,
    y: f64,
    height: f64,
    size_pt: f64,
    inverse: bool,
) {
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.elements.push(Element {
            x: geometry.margin,
            y,
            width: geometry.content_width(),
            height,
            kind: ElementKind::Text {
                text: format!("Page {} of {}", i + 1, total),
                size_pt,
                bold: false,
                inverse,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelwatch_analytics::config::{KpiCategory, KpiStatus};

    #[test]
    fn kpi_cells_format_units() {
        let entry = KpiEntry {
            name: "Data Quality Score".into(),
            value: 88.24,
            unit: "%".into(),
            baseline: 85.0,
            delta_pct: 3.82,
            status: KpiStatus::Warning,
            category: KpiCategory::Features,
        };
        assert_eq!(
            kpi_cells(&entry),
            vec!["Data Quality Score", "features", "88.2%", "85.0%", "+3.8%", "WARNING"]
        );
    }

    #[test]
    fn width_fraction_outside_unit_interval_falls_back() {
        assert_eq!(checked_width_fraction(0.5), 0.5);
        assert_eq!(checked_width_fraction(1.0), 1.0);
        assert_eq!(checked_width_fraction(1.5), DEFAULT_IMAGE_WIDTH_FRACTION);
        assert_eq!(checked_width_fraction(-0.5), DEFAULT_IMAGE_WIDTH_FRACTION);
        assert_eq!(checked_width_fraction(0.0), DEFAULT_IMAGE_WIDTH_FRACTION);
        assert_eq!(checked_width_fraction(f64::NAN), DEFAULT_IMAGE_WIDTH_FRACTION);
    }

    #[test]
    fn column_widths_span_table() {
        let total: f64 = kpi_column_widths(180.0).iter().sum();
        assert!((total - 180.0).abs() < 1e-9);
    }
}
