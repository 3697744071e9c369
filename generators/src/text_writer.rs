//! FILENAME: generators/src/text_writer.rs
//! Plain-text writer - renders pages onto a fixed-pitch character grid.
//!
//! Page coordinates are quantized to character cells, so the output lines
//! up the way the report would on a line printer. Lines and rect borders
//! become `-`, `|` and `+` runs; diagonal lines have no cell rendition and
//! are skipped. Pages are separated by a form feed.

use std::path::Path;

use band_engine::{RenderedDocument, RenderedElement, RenderedPage};
use model::style::TextAlign;
use model::unit::CM;

use crate::error::GenerateError;
use crate::Generator;

/// Writes a rendered document as monospaced text.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    /// Width of one character cell in points.
    pub character_width: f64,
    /// Height of one text row in points.
    pub row_height: f64,
}

impl Default for TextGenerator {
    fn default() -> Self {
        TextGenerator {
            character_width: 0.23 * CM,
            row_height: 0.5 * CM,
        }
    }
}

impl TextGenerator {
    pub fn new() -> Self {
        TextGenerator::default()
    }

    /// Overrides the cell geometry, in points.
    pub fn with_cell_size(mut self, character_width: f64, row_height: f64) -> Self {
        self.character_width = character_width;
        self.row_height = row_height;
        self
    }

    /// Renders one page onto its character matrix.
    fn render_page(&self, page: &RenderedPage, columns: usize, rows: usize) -> Vec<Vec<char>> {
        let mut matrix = vec![vec![' '; columns]; rows];
        for element in &page.elements {
            match element {
                RenderedElement::Text(text) => {
                    let row = self.row_index(text.y);
                    let start = self.column_index(text.x);
                    let box_columns = (text.width / self.character_width).round() as usize;
                    let chars: Vec<char> = text.text.chars().collect();
                    let offset = match text.style.text_align {
                        TextAlign::Left => 0,
                        TextAlign::Center => box_columns.saturating_sub(chars.len()) / 2,
                        TextAlign::Right => box_columns.saturating_sub(chars.len()),
                    };
                    put_run(&mut matrix, row, start + offset, &chars);
                }
                RenderedElement::Line(line) => {
                    if (line.y1 - line.y2).abs() < f64::EPSILON {
                        let row = self.row_index(line.y1);
                        let from = self.column_index(line.x1.min(line.x2));
                        let to = self.column_index(line.x1.max(line.x2));
                        put_horizontal(&mut matrix, row, from, to);
                    } else if (line.x1 - line.x2).abs() < f64::EPSILON {
                        let column = self.column_index(line.x1);
                        let from = self.row_index(line.y1.min(line.y2));
                        let to = self.row_index(line.y1.max(line.y2));
                        put_vertical(&mut matrix, column, from, to);
                    } else {
                        log::debug!("skipping diagonal line in text output");
                    }
                }
                RenderedElement::Rect(rect) => {
                    if rect.stroke.is_none() {
                        continue;
                    }
                    let top = self.row_index(rect.y);
                    let bottom = self.row_index(rect.y + rect.height);
                    let left = self.column_index(rect.x);
                    let right = self.column_index(rect.x + rect.width);
                    put_horizontal(&mut matrix, top, left, right);
                    put_horizontal(&mut matrix, bottom, left, right);
                    put_vertical(&mut matrix, left, top, bottom);
                    put_vertical(&mut matrix, right, top, bottom);
                    for (row, column) in [(top, left), (top, right), (bottom, left), (bottom, right)] {
                        put_char(&mut matrix, row, column, '+');
                    }
                }
            }
        }
        matrix
    }

    fn row_index(&self, y: f64) -> usize {
        ((y / self.row_height).round()).max(0.0) as usize
    }

    fn column_index(&self, x: f64) -> usize {
        ((x / self.character_width).round()).max(0.0) as usize
    }
}

impl Generator for TextGenerator {
    fn generate(&self, document: &RenderedDocument, path: &Path) -> Result<(), GenerateError> {
        if document.pages.is_empty() {
            return Err(GenerateError::EmptyDocument);
        }
        let columns = (document.page_width / self.character_width).ceil() as usize;
        let rows = (document.page_height / self.row_height).ceil() as usize;

        let mut output = String::new();
        for (index, page) in document.pages.iter().enumerate() {
            if index > 0 {
                output.push('\u{c}');
                output.push('\n');
            }
            let matrix = self.render_page(page, columns, rows);
            let filled_rows = matrix
                .iter()
                .rposition(|row| row.iter().any(|c| *c != ' '))
                .map(|last| last + 1)
                .unwrap_or(0);
            for row in &matrix[..filled_rows] {
                let line: String = row.iter().collect();
                output.push_str(line.trim_end());
                output.push('\n');
            }
        }
        std::fs::write(path, output)?;
        Ok(())
    }
}

fn put_char(matrix: &mut [Vec<char>], row: usize, column: usize, character: char) {
    if let Some(cells) = matrix.get_mut(row) {
        if let Some(cell) = cells.get_mut(column) {
            *cell = character;
        }
    }
}

fn put_run(matrix: &mut [Vec<char>], row: usize, start: usize, chars: &[char]) {
    for (index, character) in chars.iter().enumerate() {
        put_char(matrix, row, start + index, *character);
    }
}

fn put_horizontal(matrix: &mut [Vec<char>], row: usize, from: usize, to: usize) {
    for column in from..=to {
        put_char(matrix, row, column, '-');
    }
}

fn put_vertical(matrix: &mut [Vec<char>], column: usize, from: usize, to: usize) {
    for row in from..=to {
        put_char(matrix, row, column, '|');
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use band_engine::{
        Label, LineElement, Margins, ObjectValue, PageSize, RectElement, Report, ReportBand,
    };
    use model::style::{ElementStyle, TextAlign};
    use model::Record;

    fn write_to_string(report: &Report, records: &[Record], generator: &TextGenerator) -> String {
        let document = report.render(records).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        generator.generate(&document, &path).unwrap();
        std::fs::read_to_string(&path).unwrap()
    }

    fn ten_point_grid() -> TextGenerator {
        TextGenerator::new().with_cell_size(10.0, 10.0)
    }

    fn small_page(title: &str) -> Report {
        Report::new(title)
            .with_page_size(PageSize::Custom {
                width: 100.0,
                height: 60.0,
            })
            .with_margins(Margins::uniform(10.0))
    }

    #[test]
    fn test_detail_rows_land_on_grid_cells() {
        let report = small_page("Grid").with_detail(
            ReportBand::new(10.0)
                .with_element(Label::new(0.0, 0.0, "#"))
                .with_element(ObjectValue::new(30.0, 0.0, "name")),
        );
        let records = vec![
            Record::new().with("name", "Chair"),
            Record::new().with("name", "Desk"),
        ];

        let output = write_to_string(&report, &records, &ten_point_grid());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], " #  Chair");
        assert_eq!(lines[2], " #  Desk");
    }

    #[test]
    fn test_right_alignment_fills_the_box_from_its_far_edge() {
        let style = ElementStyle::new().with_align(TextAlign::Right);
        let report = small_page("Align").with_detail(
            ReportBand::new(10.0)
                .with_element(ObjectValue::new(0.0, 0.0, "name").with_width(60.0).with_style(style)),
        );
        let records = vec![Record::new().with("name", "Pen")];

        let output = write_to_string(&report, &records, &ten_point_grid());
        // Box spans columns 1..=6, so a 3-char value starts at column 4.
        assert_eq!(output.lines().nth(1).unwrap(), "    Pen");
    }

    #[test]
    fn test_pages_are_separated_by_form_feeds() {
        let report = small_page("Pages").with_detail(
            ReportBand::new(20.0).with_element(ObjectValue::new(0.0, 0.0, "name")),
        );
        let records = vec![
            Record::new().with("name", "first"),
            Record::new().with("name", "second"),
            Record::new().with("name", "third"),
        ];

        let output = write_to_string(&report, &records, &ten_point_grid());
        assert_eq!(output.matches('\u{c}').count(), 1);
        let (first_page, second_page) = output.split_once('\u{c}').unwrap();
        assert!(first_page.contains("first"));
        assert!(first_page.contains("second"));
        assert!(second_page.contains("third"));
    }

    #[test]
    fn test_lines_and_rects_use_box_drawing_characters() {
        let report = small_page("Boxes").with_detail(
            ReportBand::new(30.0)
                .with_element(LineElement::new(0.0, 0.0, 40.0, 0.0))
                .with_element(RectElement::new(0.0, 10.0, 40.0, 20.0)),
        );
        let records = vec![Record::new().with("name", "x")];

        let output = write_to_string(&report, &records, &ten_point_grid());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], " -----");
        assert_eq!(lines[2], " +---+");
        assert_eq!(lines[3], " |   |");
        assert_eq!(lines[4], " +---+");
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let document = RenderedDocument {
            title: "empty".into(),
            page_width: 100.0,
            page_height: 100.0,
            pages: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let result = TextGenerator::new().generate(&document, &dir.path().join("empty.txt"));
        assert!(matches!(result, Err(GenerateError::EmptyDocument)));
    }
}
