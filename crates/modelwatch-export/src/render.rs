//! Serialise a laid-out [`Document`] into a self-contained HTML artifact.
//!
//! Each page becomes a fixed-size box with absolutely positioned children in
//! the document's own unit, and `@page` carries the same size so printing
//! reproduces the pagination. Images are embedded as data URIs.
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::error::ExportError;
use crate::layout::{Document, Element, ElementKind};

fn stylesheet(doc: &Document) -> String {
    let g = &doc.geometry;
    let u = g.unit.css();
    format!(
        "@page {{ size: {w}{u} {h}{u}; margin: 0; }}\n\
         body {{ margin: 0; background: #cbd5e1; font-family: Helvetica, Arial, sans-serif; color: #0f172a; }}\n\
         .page {{ position: relative; width: {w}{u}; height: {h}{u}; margin: 0 auto 12px; background: #ffffff; overflow: hidden; page-break-after: always; break-after: page; }}\n\
         .el {{ position: absolute; box-sizing: border-box; white-space: nowrap; overflow: hidden; }}\n\
         .row span {{ display: inline-block; padding: 0 4px; box-sizing: border-box; }}\n\
         .row.header {{ font-weight: bold; }}\n\
         .inverse {{ color: #ffffff; }}\n\
         @media print {{ body {{ background: none; }} .page {{ margin: 0; }} }}",
        w = g.width,
        h = g.height,
        u = u,
    )
}

fn position(el: &Element, unit: &str) -> String {
    format!(
        "left:{:.2}{u};top:{:.2}{u};width:{:.2}{u};height:{:.2}{u};",
        el.x,
        el.y,
        el.width,
        el.height,
        u = unit
    )
}

fn render_element(el: &Element, unit: &str) -> Markup {
    let pos = position(el, unit);
    match &el.kind {
        ElementKind::Text {
            text,
            size_pt,
            bold,
            inverse,
        } => {
            let style = format!(
                "{}font-size:{}pt;font-weight:{};line-height:{:.2}{};",
                pos,
                size_pt,
                if *bold { "bold" } else { "normal" },
                el.height,
                unit
            );
            html! {
                div.el.inverse[*inverse] style=(style) { (text) }
            }
        }
        ElementKind::TableRow {
            cells,
            column_widths,
            fill,
            header,
            size_pt,
        } => {
            let style = format!(
                "{}background:{};line-height:{:.2}{};font-size:{:.1}pt;",
                pos,
                fill.css_color(),
                el.height,
                unit,
                size_pt
            );
            html! {
                div.el.row.header[*header] style=(style) {
                    @for (cell, width) in cells.iter().zip(column_widths) {
                        span style=(format!("width:{:.2}{}", width, unit)) { (cell) }
                    }
                }
            }
        }
        ElementKind::Image(image) => html! {
            img.el style=(pos) src=(image.data_uri()) alt="";
        },
        ElementKind::Band(fill) => {
            let style = format!("{}background:{};", pos, fill.css_color());
            html! { div.el style=(style) {} }
        }
    }
}

/// Render `doc` as a standalone HTML page set.
pub fn render_html(doc: &Document, title: &str) -> String {
    let unit = doc.geometry.unit.css();
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(stylesheet(doc))) }
            }
            body data-format=(doc.format.to_string()) data-pages=(doc.page_count()) {
                @for (i, page) in doc.pages.iter().enumerate() {
                    section.page data-page=(i + 1) {
                        @for el in &page.elements {
                            (render_element(el, unit))
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

/// Render `doc` and write it to `path`, creating parent directories.
///
/// Returns the number of bytes written. No partial artifact is cleaned up on
/// failure.
pub fn write_artifact(doc: &Document, path: &Path, title: &str) -> Result<usize, ExportError> {
    let to_err = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_err)?;
    }
    let html = render_html(doc, title);
    std::fs::write(path, html.as_bytes()).map_err(to_err)?;
    Ok(html.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedImage;
    use crate::config::ExportFormat;
    use crate::layout::{Fill, Page, PageGeometry};

    fn doc_with(elements: Vec<Element>) -> Document {
        Document {
            format: ExportFormat::PaginatedDocument,
            geometry: PageGeometry::a4_portrait(),
            pages: vec![Page { elements }],
        }
    }

    #[test]
    fn page_size_matches_geometry() {
        let html = render_html(&doc_with(vec![]), "Report");
        assert!(html.contains("size: 210mm 297mm"));
        assert!(html.contains("data-pages=\"1\""));
    }

    #[test]
    fn text_is_escaped() {
        let el = Element {
            x: 15.0,
            y: 15.0,
            width: 180.0,
            height: 10.0,
            kind: ElementKind::Text {
                text: "<script>".into(),
                size_pt: 10.0,
                bold: false,
                inverse: false,
            },
        };
        let html = render_html(&doc_with(vec![el]), "Report");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn images_are_embedded() {
        let el = Element {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            kind: ElementKind::Image(CapturedImage::png(b"abc".to_vec())),
        };
        let band = Element {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 1.0,
            kind: ElementKind::Band(Fill::Band),
        };
        let html = render_html(&doc_with(vec![el, band]), "Report");
        assert!(html.contains("data:image/png;base64,YWJj"));
        assert!(html.contains(Fill::Band.css_color()));
    }

    #[test]
    fn write_fails_into_a_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let target = blocker.join("report.html");
        let err = write_artifact(&doc_with(vec![]), &target, "Report").unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
