//! FILENAME: generators/src/csv_writer.rs
//! CSV writer - one record per grid row, pages separated by a blank line.

use std::fs;
use std::path::Path;

use band_engine::RenderedDocument;

use crate::error::GenerateError;
use crate::grid::quantize;
use crate::Generator;

/// Writes a rendered document as CSV.
///
/// Positioned text is snapped to the shared text grid; styling and
/// drawing elements do not survive the format.
#[derive(Debug, Clone, Default)]
pub struct CsvGenerator;

impl CsvGenerator {
    pub fn new() -> Self {
        CsvGenerator
    }
}

impl Generator for CsvGenerator {
    fn generate(&self, document: &RenderedDocument, path: &Path) -> Result<(), GenerateError> {
        if document.pages.is_empty() {
            return Err(GenerateError::EmptyDocument);
        }
        // One writer per page, with a raw newline between pages: csv quotes
        // a lone empty field as "", which is a one-field record rather than
        // a separator line.
        let mut output = Vec::new();
        for (index, page) in quantize(document).iter().enumerate() {
            if index > 0 {
                output.push(b'\n');
            }
            let mut writer = csv::Writer::from_writer(&mut output);
            for row in &page.cells {
                let fields: Vec<&str> = row
                    .iter()
                    .map(|cell| cell.as_ref().map(|cell| cell.text.as_str()).unwrap_or(""))
                    .collect();
                writer.write_record(fields)?;
            }
            writer.flush()?;
        }
        fs::write(path, &output)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
