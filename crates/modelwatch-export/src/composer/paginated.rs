use modelwatch_analytics::aggregate::KpiEntry;

use super::{checked_width_fraction, heading, kpi_cells, kpi_column_widths, stamp_page_numbers, SectionComposer, SectionContent, KPI_COLUMNS};
use crate::capture::CapturedImage;
use crate::config::ExportFormat;
use crate::cover::CoverSummary;
use crate::layout::{Document, Element, ElementKind, Fill, Page, PageGeometry};
use crate::section::{ExportSection, SectionKind};

// Block heights in page units (mm for A4).
const TITLE_HEIGHT: f64 = 14.0;
const LINE_HEIGHT: f64 = 6.0;
const HEADER_HEIGHT: f64 = 10.0;
const TABLE_HEADER_HEIGHT: f64 = 8.0;
const TABLE_ROW_HEIGHT: f64 = 7.0;
const NOTE_HEIGHT: f64 = 6.0;
const SECTION_GAP: f64 = 6.0;
const FOOTER_HEIGHT: f64 = 5.0;

const TITLE_PT: f64 = 20.0;
const HEADER_PT: f64 = 14.0;
const BODY_PT: f64 = 10.0;
const TABLE_PT: f64 = 9.0;
const FOOTER_PT: f64 = 8.0;

/// Fixed page size composer with a running vertical cursor.
///
/// Before every header, table row and image the composer checks whether the
/// block fits between the cursor and the bottom margin; if not it opens a new
/// page first. A header is kept together with the first block of its section.
pub struct PaginatedComposer {
    geometry: PageGeometry,
    image_width_fraction: f64,
    pages: Vec<Page>,
    cursor: f64,
}

impl PaginatedComposer {
    pub fn new(geometry: PageGeometry, cover: &CoverSummary, image_width_fraction: f64) -> Self {
        let mut composer = Self {
            geometry,
            image_width_fraction: checked_width_fraction(image_width_fraction),
            pages: vec![Page::default()],
            cursor: geometry.margin,
        };
        composer.layout_cover(cover);
        composer
    }

    /// Current vertical position on the last page.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Open a new page when `height` does not fit below the cursor.
    ///
    /// Returns `true` if a page break happened. A fresh page never breaks,
    /// so a block taller than the printable area cannot loop.
    fn ensure_space(&mut self, height: f64) -> bool {
        let overflows = self.cursor + height > self.geometry.printable_bottom();
        if overflows && self.cursor > self.geometry.margin {
            self.pages.push(Page::default());
            self.cursor = self.geometry.margin;
            return true;
        }
        false
    }

    fn place(&mut self, x: f64, width: f64, height: f64, kind: ElementKind) {
        let y = self.cursor;
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(Element {
                x,
                y,
                width,
                height,
                kind,
            });
        }
        self.cursor += height;
    }

    fn place_text(&mut self, text: String, height: f64, size_pt: f64, bold: bool) {
        let (x, width) = (self.geometry.margin, self.geometry.content_width());
        self.place(
            x,
            width,
            height,
            ElementKind::Text {
                text,
                size_pt,
                bold,
                inverse: false,
            },
        );
    }

    fn layout_cover(&mut self, cover: &CoverSummary) {
        self.ensure_space(TITLE_HEIGHT);
        self.place_text(cover.title.clone(), TITLE_HEIGHT, TITLE_PT, true);
        for line in cover.lines() {
            self.ensure_space(LINE_HEIGHT);
            self.place_text(line, LINE_HEIGHT, BODY_PT, false);
        }
        self.cursor += SECTION_GAP;
    }

    /// Image box for `aspect_ratio`, shrunk to fit a page under its header.
    fn image_size(&self, aspect_ratio: f64) -> (f64, f64) {
        let mut width = self.geometry.content_width() * self.image_width_fraction;
        let mut height = width / aspect_ratio;
        let max_height = self.geometry.printable_height() - HEADER_HEIGHT;
        if height > max_height {
            height = max_height;
            width = height * aspect_ratio;
        }
        (width, height)
    }

    fn lead_height(&self, section: &ExportSection, content: &SectionContent<'_>) -> f64 {
        match (content, section.kind) {
            (SectionContent::Table(rows), _) if rows.is_empty() => NOTE_HEIGHT,
            (SectionContent::Table(_), _) => TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT,
            (SectionContent::Image(Some(_)), SectionKind::Image { aspect_ratio }) => {
                self.image_size(aspect_ratio).1
            }
            _ => 0.0,
        }
    }

    fn place_table_header(&mut self, widths: &[f64]) {
        let (x, width) = (self.geometry.margin, self.geometry.content_width());
        self.place(
            x,
            width,
            TABLE_HEADER_HEIGHT,
            ElementKind::TableRow {
                cells: KPI_COLUMNS.iter().map(|c| c.to_string()).collect(),
                column_widths: widths.to_vec(),
                fill: Fill::TableHeader,
                header: true,
                size_pt: TABLE_PT,
            },
        );
    }

    fn layout_table(&mut self, entries: &[KpiEntry]) {
        if entries.is_empty() {
            self.ensure_space(NOTE_HEIGHT);
            self.place_text("No KPI data available".to_string(), NOTE_HEIGHT, BODY_PT, false);
            return;
        }

        let widths = kpi_column_widths(self.geometry.content_width());
        self.ensure_space(TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT);
        self.place_table_header(&widths);

        for entry in entries {
            if self.ensure_space(TABLE_ROW_HEIGHT) {
                // Repeat the column header on continuation pages.
                self.place_table_header(&widths);
            }
            let (x, width) = (self.geometry.margin, self.geometry.content_width());
            self.place(
                x,
                width,
                TABLE_ROW_HEIGHT,
                ElementKind::TableRow {
                    cells: kpi_cells(entry),
                    column_widths: widths.clone(),
                    fill: entry.status.into(),
                    header: false,
                    size_pt: TABLE_PT,
                },
            );
        }
    }

    fn layout_image(&mut self, image: &CapturedImage, aspect_ratio: f64) {
        let (width, height) = self.image_size(aspect_ratio);
        self.ensure_space(height);
        let x = self.geometry.margin + (self.geometry.content_width() - width) / 2.0;
        self.place(x, width, height, ElementKind::Image(image.clone()));
    }
}

impl SectionComposer for PaginatedComposer {
    fn append_section(&mut self, number: usize, section: &ExportSection, content: SectionContent<'_>) {
        let lead = self.lead_height(section, &content);
        self.ensure_space(HEADER_HEIGHT + lead);
        self.place_text(heading(number, section), HEADER_HEIGHT, HEADER_PT, true);

        match (content, section.kind) {
            (SectionContent::Table(entries), _) => self.layout_table(entries),
            (SectionContent::Image(Some(image)), SectionKind::Image { aspect_ratio }) => {
                self.layout_image(image, aspect_ratio)
            }
            (SectionContent::Image(Some(_)), SectionKind::Table) => {
                log::warn!("Section '{}' is a table but received an image; skipped", section.key);
            }
            (SectionContent::Image(None), _) => {
                log::debug!("Section '{}' has no capture; header only", section.key);
            }
        }
        self.cursor += SECTION_GAP;
    }

    fn finish(mut self) -> Document {
        let y = self.geometry.height - self.geometry.margin + (self.geometry.margin - FOOTER_HEIGHT) / 2.0;
        stamp_page_numbers(&mut self.pages, &self.geometry, y, FOOTER_HEIGHT, FOOTER_PT, false);
        Document {
            format: ExportFormat::PaginatedDocument,
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}
