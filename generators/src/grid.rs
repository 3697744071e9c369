//! FILENAME: generators/src/grid.rs
//! Grid quantizer - maps positioned text onto rows and columns.
//!
//! CSV and XLSX have no notion of points, so the tabular writers snap
//! every text element to a cell: distinct y positions become rows (top to
//! bottom) and distinct x positions become columns (left to right),
//! bucketed at half-point resolution so float noise does not split cells.
//! Lines and rects carry no tabular meaning and are dropped.

use std::collections::{BTreeSet, HashMap};

use band_engine::{RenderedDocument, RenderedPage};
use model::style::ElementStyle;

/// Half-point buckets; positions closer than this share a row or column.
const BUCKET: f64 = 0.5;

/// One text-bearing cell of a quantized page.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub text: String,
    pub style: ElementStyle,
}

/// One page snapped to a dense row/column matrix.
#[derive(Debug)]
pub struct GridPage {
    /// 1-based page number, carried through from the rendered page.
    pub number: usize,
    /// Row-major matrix; `None` cells hold no text.
    pub cells: Vec<Vec<Option<GridCell>>>,
}

impl GridPage {
    pub fn column_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Snaps every page of a rendered document onto its text grid.
pub fn quantize(document: &RenderedDocument) -> Vec<GridPage> {
    document.pages.iter().map(quantize_page).collect()
}

fn quantize_page(page: &RenderedPage) -> GridPage {
    let mut row_keys = BTreeSet::new();
    let mut column_keys = BTreeSet::new();
    for text in page.texts() {
        row_keys.insert(bucket(text.y));
        column_keys.insert(bucket(text.x));
    }
    // BTreeSet iteration is sorted, so enumeration is the top-to-bottom,
    // left-to-right ordering.
    let row_index: HashMap<i64, usize> =
        row_keys.iter().enumerate().map(|(i, key)| (*key, i)).collect();
    let column_index: HashMap<i64, usize> =
        column_keys.iter().enumerate().map(|(i, key)| (*key, i)).collect();

    let mut cells: Vec<Vec<Option<GridCell>>> =
        vec![vec![None; column_keys.len()]; row_keys.len()];
    for text in page.texts() {
        let row = row_index[&bucket(text.y)];
        let column = column_index[&bucket(text.x)];
        match &mut cells[row][column] {
            Some(cell) => {
                // Two elements on the same spot; keep both, reading order.
                cell.text.push(' ');
                cell.text.push_str(&text.text);
            }
            slot => {
                *slot = Some(GridCell {
                    text: text.text.clone(),
                    style: text.style.clone(),
                });
            }
        }
    }
    GridPage {
        number: page.number,
        cells,
    }
}

fn bucket(position: f64) -> i64 {
    (position / BUCKET).round() as i64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use band_engine::{Label, ObjectValue, Report, ReportBand};
    use model::Record;

    fn listing_document() -> RenderedDocument {
        let report = Report::new("Grid").with_detail(
            ReportBand::new(14.0)
                .with_element(ObjectValue::new(0.0, 0.0, "name"))
                .with_element(ObjectValue::new(120.0, 0.0, "price")),
        );
        let records = vec![
            Record::new().with("name", "Chair").with("price", 50.0),
            Record::new().with("name", "Desk").with("price", 80.0),
        ];
        report.render(&records).unwrap()
    }

    #[test]
    fn test_rows_follow_y_and_columns_follow_x() {
        let pages = quantize(&listing_document());
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.cells.len(), 2);
        assert_eq!(page.column_count(), 2);
        assert_eq!(page.cells[0][0].as_ref().unwrap().text, "Chair");
        assert_eq!(page.cells[0][1].as_ref().unwrap().text, "50");
        assert_eq!(page.cells[1][0].as_ref().unwrap().text, "Desk");
        assert_eq!(page.cells[1][1].as_ref().unwrap().text, "80");
    }

    #[test]
    fn test_nearby_positions_share_a_bucket() {
        let report = Report::new("Buckets").with_detail(
            ReportBand::new(14.0)
                .with_element(Label::new(0.0, 0.0, "a"))
                .with_element(Label::new(0.1, 0.2, "b")),
        );
        let records = vec![Record::new().with("name", "x")];
        let pages = quantize(&report.render(&records).unwrap());
        let page = &pages[0];
        assert_eq!(page.cells.len(), 1);
        assert_eq!(page.column_count(), 1);
        assert_eq!(page.cells[0][0].as_ref().unwrap().text, "a b");
    }

    #[test]
    fn test_lines_do_not_create_cells() {
        let report = Report::new("Lines").with_detail(
            ReportBand::new(14.0)
                .with_element(band_engine::LineElement::new(0.0, 12.0, 100.0, 12.0))
                .with_element(ObjectValue::new(0.0, 0.0, "name")),
        );
        let records = vec![Record::new().with("name", "only")];
        let pages = quantize(&report.render(&records).unwrap());
        assert_eq!(pages[0].cells.len(), 1);
        assert_eq!(pages[0].column_count(), 1);
    }
}
