//! FILENAME: generators/src/pdf_writer.rs
//! PDF writer - draws rendered pages with the printpdf built-in fonts.
//!
//! The engine positions everything from the top-left corner of the page;
//! PDF measures from the bottom-left, so every y flips here. Text boxes
//! anchor at their top edge, and the baseline sits an ascent below it.
//! Center/right alignment is estimated from the per-family average glyph
//! width, which is how the fixed fourteen PDF fonts are usually measured
//! without embedding metrics.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use band_engine::{RenderedDocument, RenderedElement, RenderedText};
use model::style::{FontFamily, FontSpec, LineStyle, TextAlign};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use crate::error::GenerateError;
use crate::Generator;

const MM_PER_PT: f64 = 25.4 / 72.0;
/// Portion of the font size between the top of the text box and the baseline.
const ASCENT_RATIO: f64 = 0.8;

/// Writes a rendered document as a PDF file.
#[derive(Debug, Clone, Default)]
pub struct PdfGenerator;

impl PdfGenerator {
    pub fn new() -> Self {
        PdfGenerator
    }
}

impl Generator for PdfGenerator {
    fn generate(&self, document: &RenderedDocument, path: &Path) -> Result<(), GenerateError> {
        if document.pages.is_empty() {
            return Err(GenerateError::EmptyDocument);
        }
        let page_width = to_mm(document.page_width);
        let page_height = to_mm(document.page_height);
        let (pdf, first_page, first_layer) =
            PdfDocument::new(&document.title, page_width, page_height, "Layer 1");
        let mut fonts: HashMap<(FontFamily, bool, bool), IndirectFontRef> = HashMap::new();

        for (index, page) in document.pages.iter().enumerate() {
            let layer = if index == 0 {
                pdf.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) = pdf.add_page(page_width, page_height, "Layer 1");
                pdf.get_page(page_index).get_layer(layer_index)
            };
            for element in &page.elements {
                match element {
                    RenderedElement::Text(text) => {
                        draw_text(&pdf, &layer, &mut fonts, document.page_height, text)?;
                    }
                    RenderedElement::Line(line) => {
                        set_stroke(&layer, &line.style);
                        layer.add_line(Line {
                            points: vec![
                                (point(line.x1, line.y1, document.page_height), false),
                                (point(line.x2, line.y2, document.page_height), false),
                            ],
                            is_closed: false,
                        });
                    }
                    RenderedElement::Rect(rect) => {
                        let corners = vec![
                            (point(rect.x, rect.y, document.page_height), false),
                            (point(rect.x + rect.width, rect.y, document.page_height), false),
                            (
                                point(
                                    rect.x + rect.width,
                                    rect.y + rect.height,
                                    document.page_height,
                                ),
                                false,
                            ),
                            (point(rect.x, rect.y + rect.height, document.page_height), false),
                        ];
                        if let Some(fill) = &rect.fill {
                            layer.set_fill_color(pdf_color(fill));
                            layer.add_polygon(printpdf::Polygon {
                                rings: vec![corners.clone()],
                                mode: printpdf::path::PaintMode::Fill,
                                winding_order: printpdf::path::WindingOrder::NonZero,
                            });
                        }
                        if let Some(stroke) = &rect.stroke {
                            set_stroke(&layer, stroke);
                            layer.add_line(Line {
                                points: corners,
                                is_closed: true,
                            });
                        }
                    }
                }
            }
        }

        let file = File::create(path)?;
        pdf.save(&mut BufWriter::new(file))?;
        Ok(())
    }
}

fn draw_text(
    pdf: &PdfDocumentReference,
    layer: &PdfLayerReference,
    fonts: &mut HashMap<(FontFamily, bool, bool), IndirectFontRef>,
    page_height: f64,
    text: &RenderedText,
) -> Result<(), GenerateError> {
    let font = font_for(pdf, fonts, &text.style.font)?;
    layer.set_fill_color(pdf_color(&text.style.color));

    let x = aligned_x(text);
    let baseline = text.y + text.style.font.size as f64 * ASCENT_RATIO;
    layer.use_text(
        &text.text,
        text.style.font.size.into(),
        to_mm(x),
        to_mm(page_height - baseline),
        &font,
    );
    Ok(())
}

/// Left edge of the drawn text after applying the box alignment.
fn aligned_x(text: &RenderedText) -> f64 {
    let text_width = text.style.font.text_width(&text.text);
    match text.style.text_align {
        TextAlign::Left => text.x,
        TextAlign::Center => text.x + (text.width - text_width) / 2.0,
        TextAlign::Right => text.x + text.width - text_width,
    }
}

/// Looks up the built-in font for a spec, adding it to the document once.
fn font_for(
    pdf: &PdfDocumentReference,
    fonts: &mut HashMap<(FontFamily, bool, bool), IndirectFontRef>,
    spec: &FontSpec,
) -> Result<IndirectFontRef, GenerateError> {
    let key = (spec.family, spec.bold, spec.italic);
    if let Some(font) = fonts.get(&key) {
        return Ok(font.clone());
    }
    let font = pdf.add_builtin_font(builtin_font(spec))?;
    fonts.insert(key, font.clone());
    Ok(font)
}

fn builtin_font(spec: &FontSpec) -> BuiltinFont {
    match (spec.family, spec.bold, spec.italic) {
        (FontFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Courier, false, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

fn set_stroke(layer: &PdfLayerReference, style: &LineStyle) {
    layer.set_outline_color(pdf_color(&style.color));
    layer.set_outline_thickness(style.width.into());
    layer.set_line_dash_pattern(dash_pattern(style));
}

fn dash_pattern(style: &LineStyle) -> LineDashPattern {
    match style.dash {
        model::style::DashPattern::Solid => LineDashPattern::default(),
        model::style::DashPattern::Dashed => LineDashPattern {
            dash_1: Some(4),
            ..LineDashPattern::default()
        },
        model::style::DashPattern::Dotted => LineDashPattern {
            dash_1: Some(1),
            gap_1: Some(2),
            ..LineDashPattern::default()
        },
    }
}

fn pdf_color(color: &model::style::Color) -> Color {
    Color::Rgb(Rgb::new(
        (color.r as f32 / 255.0).into(),
        (color.g as f32 / 255.0).into(),
        (color.b as f32 / 255.0).into(),
        None,
    ))
}

/// Converts a top-origin point coordinate pair to a bottom-origin PDF point.
fn point(x: f64, y: f64, page_height: f64) -> Point {
    Point::new(to_mm(x), to_mm(page_height - y))
}

fn to_mm(points: f64) -> Mm {
    Mm(((points * MM_PER_PT) as f32).into())
}

// ============================================================================
// TESTS
// ============================================================================
