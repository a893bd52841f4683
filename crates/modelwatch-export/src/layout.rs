//! Page geometry and the positioned-element document model.
use modelwatch_analytics::config::KpiStatus;

use crate::capture::CapturedImage;
use crate::config::ExportFormat;

/// A4 portrait, millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
pub const PAGE_MARGIN_MM: f64 = 15.0;

/// 16:9 wide slide layout, inches.
pub const WIDE_SLIDE_WIDTH_IN: f64 = 13.333;
pub const WIDE_SLIDE_HEIGHT_IN: f64 = 7.5;
pub const SLIDE_MARGIN_IN: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mm,
    In,
}

impl Unit {
    pub fn css(&self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::In => "in",
        }
    }
}

/// Fixed page size and uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub unit: Unit,
}

impl PageGeometry {
    pub fn a4_portrait() -> Self {
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margin: PAGE_MARGIN_MM,
            unit: Unit::Mm,
        }
    }

    pub fn wide_slide() -> Self {
        Self {
            width: WIDE_SLIDE_WIDTH_IN,
            height: WIDE_SLIDE_HEIGHT_IN,
            margin: SLIDE_MARGIN_IN,
            unit: Unit::In,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y a block may reach before it overflows the page.
    pub fn printable_bottom(&self) -> f64 {
        self.height - self.margin
    }

    pub fn printable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

/// Background fills used by bands and table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Band,
    TableHeader,
    Good,
    Warning,
    Critical,
}

impl Fill {
    pub fn css_color(&self) -> &'static str {
        match self {
            Fill::Band => "#1e3a5f",
            Fill::TableHeader => "#e2e8f0",
            Fill::Good => "#dcfce7",
            Fill::Warning => "#fef3c7",
            Fill::Critical => "#fee2e2",
        }
    }
}

impl From<KpiStatus> for Fill {
    fn from(status: KpiStatus) -> Self {
        match status {
            KpiStatus::Good => Fill::Good,
            KpiStatus::Warning => Fill::Warning,
            KpiStatus::Critical => Fill::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Text {
        text: String,
        size_pt: f64,
        bold: bool,
        /// Light text on a dark band.
        inverse: bool,
    },
    TableRow {
        cells: Vec<String>,
        column_widths: Vec<f64>,
        fill: Fill,
        header: bool,
        size_pt: f64,
    },
    Image(CapturedImage),
    Band(Fill),
}

/// An element placed at an absolute position on its page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: ElementKind,
}

impl Element {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    pub fn image_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Image(_)))
            .count()
    }

    pub fn table_rows(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::TableRow { .. }))
    }
}

/// A finished, laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub format: ExportFormat,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(Page::image_count).sum()
    }

    /// Index of the first page holding a text element equal to `needle`.
    pub fn page_of_text(&self, needle: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.contains_text(needle))
    }
}
