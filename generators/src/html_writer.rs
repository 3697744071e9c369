//! FILENAME: generators/src/html_writer.rs
//! HTML writer - one absolutely positioned div per page element.
//!
//! Every page becomes a `div.page` sized in points, and every element an
//! absolutely positioned child, so the browser shows the same layout the
//! PDF writer draws. Horizontal and vertical lines are thin filled divs;
//! diagonal lines have no div rendition and are skipped.

use std::path::Path;

use band_engine::{RenderedDocument, RenderedElement, RenderedText};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use model::style::{FontFamily, TextAlign};

use crate::error::GenerateError;
use crate::Generator;

const PAGE_CSS: &str = "\
body { background: #e8e8e8; margin: 0; padding: 16px; }
.page { position: relative; background: white; margin: 0 auto 16px auto; \
box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3); overflow: hidden; }
.el { position: absolute; white-space: nowrap; }
";

/// Writes a rendered document as a standalone HTML file.
#[derive(Debug, Clone, Default)]
pub struct HtmlGenerator;

impl HtmlGenerator {
    pub fn new() -> Self {
        HtmlGenerator
    }
}

impl Generator for HtmlGenerator {
    fn generate(&self, document: &RenderedDocument, path: &Path) -> Result<(), GenerateError> {
        if document.pages.is_empty() {
            return Err(GenerateError::EmptyDocument);
        }
        let markup = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (document.title) }
                    style { (PreEscaped(PAGE_CSS)) }
                }
                body {
                    @for page in &document.pages {
                        div class="page" style=(format!(
                            "width: {:.2}pt; height: {:.2}pt;",
                            document.page_width, document.page_height
                        )) {
                            @for element in &page.elements {
                                (element_markup(element))
                            }
                        }
                    }
                }
            }
        };
        std::fs::write(path, markup.into_string())?;
        Ok(())
    }
}

fn element_markup(element: &RenderedElement) -> Markup {
    match element {
        RenderedElement::Text(text) => html! {
            div class="el" style=(text_style(text)) { (text.text) }
        },
        RenderedElement::Line(line) => {
            let thickness = line.style.width as f64;
            if (line.y1 - line.y2).abs() < f64::EPSILON {
                let left = line.x1.min(line.x2);
                html! {
                    div class="el" style=(format!(
                        "left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; height: {:.2}pt; background: {};",
                        left,
                        line.y1 - thickness / 2.0,
                        (line.x2 - line.x1).abs(),
                        thickness,
                        line.style.color.to_css()
                    )) {}
                }
            } else if (line.x1 - line.x2).abs() < f64::EPSILON {
                let top = line.y1.min(line.y2);
                html! {
                    div class="el" style=(format!(
                        "left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; height: {:.2}pt; background: {};",
                        line.x1 - thickness / 2.0,
                        top,
                        thickness,
                        (line.y2 - line.y1).abs(),
                        line.style.color.to_css()
                    )) {}
                }
            } else {
                log::debug!("skipping diagonal line in HTML output");
                html! {}
            }
        }
        RenderedElement::Rect(rect) => {
            let mut style = format!(
                "left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; height: {:.2}pt;",
                rect.x, rect.y, rect.width, rect.height
            );
            if let Some(stroke) = &rect.stroke {
                style.push_str(&format!(
                    " border: {:.2}pt solid {};",
                    stroke.width,
                    stroke.color.to_css()
                ));
            }
            if let Some(fill) = &rect.fill {
                style.push_str(&format!(" background: {};", fill.to_css()));
            }
            html! { div class="el" style=(style) {} }
        }
    }
}

fn text_style(text: &RenderedText) -> String {
    let font = &text.style.font;
    let family = match font.family {
        FontFamily::Helvetica => "Helvetica, Arial, sans-serif",
        FontFamily::Times => "'Times New Roman', Times, serif",
        FontFamily::Courier => "'Courier New', Courier, monospace",
    };
    let align = match text.style.text_align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    };
    let mut style = format!(
        "left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; font-size: {}pt; \
font-family: {}; color: {}; text-align: {};",
        text.x,
        text.y,
        text.width,
        font.size,
        family,
        text.style.color.to_css(),
        align
    );
    if font.bold {
        style.push_str(" font-weight: bold;");
    }
    if font.italic {
        style.push_str(" font-style: italic;");
    }
    style
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use band_engine::{Label, ObjectValue, Report, ReportBand};
    use model::style::{Color, ElementStyle};
    use model::Record;

    fn write_to_string(report: &Report, records: &[Record]) -> String {
        let document = report.render(records).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        HtmlGenerator::new().generate(&document, &path).unwrap();
        std::fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn test_pages_become_positioned_divs() {
        let report = Report::new("Listing").with_detail(
            ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")),
        );
        let records = vec![Record::new().with("name", "Chair")];

        let output = write_to_string(&report, &records);
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<title>Listing</title>"));
        assert!(output.contains(r#"<div class="page""#));
        assert!(output.contains(">Chair</div>"));
    }

    #[test]
    fn test_text_escapes_markup() {
        let report = Report::new("Escapes").with_detail(
            ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "a < b & c")),
        );
        let records = vec![Record::new().with("name", "x")];

        let output = write_to_string(&report, &records);
        assert!(output.contains("a &lt; b &amp; c"));
        assert!(!output.contains("a < b & c"));
    }

    #[test]
    fn test_styles_reach_inline_css() {
        let style = ElementStyle::new()
            .with_bold(true)
            .with_color(Color::new(200, 0, 0))
            .with_align(TextAlign::Right);
        let report = Report::new("Styled").with_detail(
            ReportBand::new(14.0).with_element(Label::new(0.0, 0.0, "total").with_style(style)),
        );
        let records = vec![Record::new().with("name", "x")];

        let output = write_to_string(&report, &records);
        assert!(output.contains("font-weight: bold;"));
        assert!(output.contains("color: #c80000;"));
        assert!(output.contains("text-align: right;"));
    }
}
