use modelwatch_analytics::aggregate::KpiEntry;

use super::{checked_width_fraction, heading, kpi_cells, kpi_column_widths, stamp_page_numbers, SectionComposer, SectionContent, KPI_COLUMNS};
use crate::config::ExportFormat;
use crate::cover::CoverSummary;
use crate::layout::{Document, Element, ElementKind, Fill, Page, PageGeometry};
use crate::section::{ExportSection, SectionKind};

// Inches.
const HEADER_BAND: f64 = 0.9;
const FOOTER_BAND: f64 = 0.45;
const CONTENT_GAP: f64 = 0.25;
const COVER_LINE: f64 = 0.4;
const MAX_ROW_HEIGHT: f64 = 0.4;
const POINTS_PER_INCH: f64 = 72.0;
// Share of a table row's height taken by its text.
const ROW_TEXT_SHARE: f64 = 0.7;

const COVER_TITLE_PT: f64 = 28.0;
const HEADER_PT: f64 = 24.0;
const BODY_PT: f64 = 16.0;
const TABLE_PT: f64 = 12.0;
const FOOTER_PT: f64 = 10.0;

/// Wide-layout deck: cover slide, then exactly one slide per section.
///
/// There is no cursor; each section slide has a header band, a content area
/// and a footer band.
pub struct SlideDeckComposer {
    geometry: PageGeometry,
    image_width_fraction: f64,
    slides: Vec<Page>,
}

fn text(x: f64, y: f64, width: f64, height: f64, text: String, size_pt: f64, bold: bool, inverse: bool) -> Element {
    Element {
        x,
        y,
        width,
        height,
        kind: ElementKind::Text {
            text,
            size_pt,
            bold,
            inverse,
        },
    }
}

impl SlideDeckComposer {
    pub fn new(geometry: PageGeometry, cover: &CoverSummary, image_width_fraction: f64) -> Self {
        let mut composer = Self {
            geometry,
            image_width_fraction: checked_width_fraction(image_width_fraction),
            slides: Vec::new(),
        };
        composer.layout_cover(cover);
        composer
    }

    fn header_band(&self, title: String, size_pt: f64) -> Vec<Element> {
        let g = &self.geometry;
        vec![
            Element {
                x: 0.0,
                y: 0.0,
                width: g.width,
                height: HEADER_BAND,
                kind: ElementKind::Band(Fill::Band),
            },
            text(g.margin, 0.2, g.content_width(), HEADER_BAND - 0.3, title, size_pt, true, true),
        ]
    }

    fn content_top(&self) -> f64 {
        HEADER_BAND + CONTENT_GAP
    }

    fn content_height(&self) -> f64 {
        self.geometry.height - FOOTER_BAND - CONTENT_GAP - self.content_top()
    }

    /// Cover slide; lines that do not fit continue on further summary slides.
    fn layout_cover(&mut self, cover: &CoverSummary) {
        let top = self.content_top() + CONTENT_GAP;
        let bottom = self.content_top() + self.content_height();
        let per_slide = (((bottom - top) / COVER_LINE).floor() as usize).max(1);

        let lines = cover.lines();
        let mut chunks: Vec<&[String]> = lines.chunks(per_slide).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }
        if chunks.len() > 1 {
            log::warn!(
                "Cover summary has {} lines; continuing on {} extra slide(s)",
                lines.len(),
                chunks.len() - 1
            );
        }

        for (i, chunk) in chunks.into_iter().enumerate() {
            let title = if i == 0 {
                cover.title.clone()
            } else {
                format!("{} (continued)", cover.title)
            };
            let mut slide = Page {
                elements: self.header_band(title, COVER_TITLE_PT),
            };
            for (j, line) in chunk.iter().enumerate() {
                slide.elements.push(text(
                    self.geometry.margin,
                    top + j as f64 * COVER_LINE,
                    self.geometry.content_width(),
                    COVER_LINE,
                    line.clone(),
                    BODY_PT,
                    false,
                    false,
                ));
            }
            self.slides.push(slide);
        }
    }

    fn table_elements(&self, entries: &[KpiEntry]) -> Vec<Element> {
        let g = &self.geometry;
        let top = self.content_top();
        if entries.is_empty() {
            return vec![text(
                g.margin,
                top,
                g.content_width(),
                COVER_LINE,
                "No KPI data available".to_string(),
                BODY_PT,
                false,
                false,
            )];
        }

        // Rows shrink so the whole table stays on its slide.
        let row_height = MAX_ROW_HEIGHT.min(self.content_height() / (entries.len() + 1) as f64);
        let size_pt = TABLE_PT.min(row_height * POINTS_PER_INCH * ROW_TEXT_SHARE);
        let widths = kpi_column_widths(g.content_width());

        let mut elements = vec![Element {
            x: g.margin,
            y: top,
            width: g.content_width(),
            height: row_height,
            kind: ElementKind::TableRow {
                cells: KPI_COLUMNS.iter().map(|c| c.to_string()).collect(),
                column_widths: widths.clone(),
                fill: Fill::TableHeader,
                header: true,
                size_pt,
            },
        }];
        for (i, entry) in entries.iter().enumerate() {
            elements.push(Element {
                x: g.margin,
                y: top + (i + 1) as f64 * row_height,
                width: g.content_width(),
                height: row_height,
                kind: ElementKind::TableRow {
                    cells: kpi_cells(entry),
                    column_widths: widths.clone(),
                    fill: entry.status.into(),
                    header: false,
                    size_pt,
                },
            });
        }
        elements
    }

    fn image_element(&self, image: &crate::capture::CapturedImage, aspect_ratio: f64) -> Element {
        let avail = self.content_height();
        let mut width = self.geometry.content_width() * self.image_width_fraction;
        let mut height = width / aspect_ratio;
        if height > avail {
            height = avail;
            width = height * aspect_ratio;
        }
        Element {
            x: (self.geometry.width - width) / 2.0,
            y: self.content_top(),
            width,
            height,
            kind: ElementKind::Image(image.clone()),
        }
    }
}

impl SectionComposer for SlideDeckComposer {
    fn append_section(&mut self, number: usize, section: &ExportSection, content: SectionContent<'_>) {
        let mut slide = Page {
            elements: self.header_band(heading(number, section), HEADER_PT),
        };

        match (content, section.kind) {
            (SectionContent::Table(entries), _) => slide.elements.extend(self.table_elements(entries)),
            (SectionContent::Image(Some(image)), SectionKind::Image { aspect_ratio }) => {
                slide.elements.push(self.image_element(image, aspect_ratio))
            }
            (SectionContent::Image(Some(_)), SectionKind::Table) => {
                log::warn!("Section '{}' is a table but received an image; skipped", section.key);
            }
            (SectionContent::Image(None), _) => {
                log::debug!("Section '{}' has no capture; header only", section.key);
            }
        }
        self.slides.push(slide);
    }

    fn finish(mut self) -> Document {
        let g = self.geometry;
        for slide in &mut self.slides {
            slide.elements.push(Element {
                x: 0.0,
                y: g.height - FOOTER_BAND,
                width: g.width,
                height: FOOTER_BAND,
                kind: ElementKind::Band(Fill::Band),
            });
        }
        let y = g.height - FOOTER_BAND + 0.1;
        stamp_page_numbers(&mut self.slides, &g, y, FOOTER_BAND - 0.2, FOOTER_PT, true);
        Document {
            format: ExportFormat::SlideDeck,
            geometry: g,
            pages: self.slides,
        }
    }
}
