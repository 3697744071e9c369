//! FILENAME: generators/src/lib.rs
//! Output writers for rendered Reporta documents.
//!
//! The band engine produces a `RenderedDocument` of positioned pages; this
//! crate turns that document into a file. Each writer implements the
//! `Generator` trait, and `generate_by` is the one-call path from a report
//! definition plus records to a finished file.
//!
//! Writers:
//! - `PdfGenerator`: paginated PDF with the built-in PDF fonts
//! - `TextGenerator`: fixed-pitch character matrix, one form feed per page
//! - `HtmlGenerator`: absolutely positioned HTML, one div per page
//! - `CsvGenerator` / `XlsxGenerator`: tabular exports over a shared grid

use std::path::Path;

use band_engine::{render_report, Report};
use model::Record;

mod csv_writer;
mod error;
mod grid;
mod html_writer;
mod pdf_writer;
mod text_writer;
mod xlsx_writer;

pub use csv_writer::CsvGenerator;
pub use error::GenerateError;
pub use html_writer::HtmlGenerator;
pub use pdf_writer::PdfGenerator;
pub use text_writer::TextGenerator;
pub use xlsx_writer::XlsxGenerator;

// ============================================================================
// GENERATOR TRAIT
// ============================================================================

/// A writer that can persist a rendered document to a file.
pub trait Generator {
    /// Writes `document` to `path` in this generator's format.
    fn generate(
        &self,
        document: &band_engine::RenderedDocument,
        path: &Path,
    ) -> Result<(), GenerateError>;
}

/// Renders `report` over `records` and writes the result with `generator`.
///
/// This is the usual entry point: it runs grouping, layout and pagination,
/// then hands the positioned pages to the writer. The file at `path` is
/// created or truncated.
pub fn generate_by<G: Generator>(
    report: &Report,
    records: &[Record],
    generator: &G,
    path: &Path,
) -> Result<(), GenerateError> {
    let document = render_report(report, records)?;
    log::info!(
        "generating {:?} ({} pages) with {}",
        path,
        document.page_count(),
        std::any::type_name::<G>()
    );
    generator.generate(&document, path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use band_engine::{ObjectValue, ReportBand};

    #[test]
    fn test_generate_by_runs_the_full_pipeline() {
        let report = Report::new("Pipeline").with_detail(
            ReportBand::new(12.0).with_element(ObjectValue::new(0.0, 0.0, "name")),
        );
        let records = vec![
            Record::new().with("name", "first"),
            Record::new().with("name", "second"),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.txt");
        generate_by(&report, &records, &TextGenerator::default(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("first"));
        assert!(written.contains("second"));
    }

    #[test]
    fn test_generate_by_propagates_render_errors() {
        let report = Report::new("Empty");
        let result = generate_by(&report, &[], &TextGenerator::default(), Path::new("unused.txt"));
        assert!(matches!(result, Err(GenerateError::Render(_))));
    }
}
