//! FILENAME: generators/src/xlsx_writer.rs
//! XLSX writer - one worksheet per page over the shared text grid.
//!
//! Cell text that parses as a number is written as a number so Excel can
//! keep calculating with it; everything else is written as a string. The
//! element style survives as an Excel cell format.

use std::path::Path;

use band_engine::RenderedDocument;
use model::style::{Color, ElementStyle, FontFamily, TextAlign};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::error::GenerateError;
use crate::grid::{quantize, GridPage};
use crate::Generator;

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;

/// Writes a rendered document as an XLSX workbook.
#[derive(Debug, Clone, Default)]
pub struct XlsxGenerator;

impl XlsxGenerator {
    pub fn new() -> Self {
        XlsxGenerator
    }
}

impl Generator for XlsxGenerator {
    fn generate(&self, document: &RenderedDocument, path: &Path) -> Result<(), GenerateError> {
        if document.pages.is_empty() {
            return Err(GenerateError::EmptyDocument);
        }
        let mut workbook = Workbook::new();
        for page in quantize(document) {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(format!("Page {}", page.number))?;

            for (column, width) in column_widths(&page).into_iter().enumerate() {
                worksheet.set_column_width(column as u16, width as f64)?;
            }
            for (row, cells) in page.cells.iter().enumerate() {
                for (column, cell) in cells.iter().enumerate() {
                    let cell = match cell {
                        Some(cell) => cell,
                        None => continue,
                    };
                    let format = convert_style_to_format(&cell.style);
                    if let Ok(number) = cell.text.parse::<f64>() {
                        worksheet.write_number_with_format(
                            row as u32,
                            column as u16,
                            number,
                            &format,
                        )?;
                    } else {
                        worksheet.write_string_with_format(
                            row as u32,
                            column as u16,
                            &cell.text,
                            &format,
                        )?;
                    }
                }
            }
        }
        workbook.save(path)?;
        Ok(())
    }
}

/// Column widths in characters, sized to the longest cell text.
fn column_widths(page: &GridPage) -> Vec<usize> {
    let mut widths = vec![MIN_COLUMN_WIDTH; page.column_count()];
    for row in &page.cells {
        for (column, cell) in row.iter().enumerate() {
            if let Some(cell) = cell {
                let wanted = (cell.text.chars().count() + 2).min(MAX_COLUMN_WIDTH);
                if wanted > widths[column] {
                    widths[column] = wanted;
                }
            }
        }
    }
    widths
}

/// Converts an element style to an Excel cell format.
fn convert_style_to_format(style: &ElementStyle) -> Format {
    let mut format = Format::new();
    if style.font.bold {
        format = format.set_bold();
    }
    if style.font.italic {
        format = format.set_italic();
    }
    format = format.set_font_size(style.font.size as f64);
    format = format.set_font_name(match style.font.family {
        FontFamily::Helvetica => "Helvetica",
        FontFamily::Times => "Times New Roman",
        FontFamily::Courier => "Courier New",
    });
    format = format.set_font_color(color_to_xlsx(&style.color));
    format = format.set_align(match style.text_align {
        TextAlign::Left => FormatAlign::Left,
        TextAlign::Center => FormatAlign::Center,
        TextAlign::Right => FormatAlign::Right,
    });
    format
}

fn color_to_xlsx(color: &Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(
        ((color.r as u32) << 16) | ((color.g as u32) << 8) | (color.b as u32),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use band_engine::{ObjectValue, Report, ReportBand};
    use model::Record;

    #[test]
    fn test_generates_an_xlsx_file() {
        let report = Report::new("Listing").with_detail(
            ReportBand::new(14.0)
                .with_element(ObjectValue::new(0.0, 0.0, "name"))
                .with_element(ObjectValue::new(120.0, 0.0, "price")),
        );
        let records = vec![
            Record::new().with("name", "Chair").with("price", 50.0),
            Record::new().with("name", "Desk").with("price", 80.0),
        ];
        let document = report.render(&records).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        XlsxGenerator::new().generate(&document, &path).unwrap();

        // XLSX files are zip archives.
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_column_widths_track_the_longest_text() {
        let report = Report::new("Widths").with_detail(
            ReportBand::new(14.0).with_element(ObjectValue::new(0.0, 0.0, "name")),
        );
        let records = vec![
            Record::new().with("name", "a very long product description"),
            Record::new().with("name", "short"),
        ];
        let document = report.render(&records).unwrap();
        let pages = quantize(&document);

        let widths = column_widths(&pages[0]);
        assert_eq!(widths, vec![33]);
    }

    #[test]
    fn test_color_packs_into_rgb_word() {
        let packed = color_to_xlsx(&Color::new(0x12, 0x34, 0x56));
        assert!(matches!(packed, rust_xlsxwriter::Color::RGB(0x123456)));
    }
}
