//! FILENAME: generators/src/error.rs
//! Error types for report output generation.

use thiserror::Error;

/// Errors that can occur while writing a rendered report to disk.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(#[from] band_engine::RenderError),

    #[error("PDF write error: {0}")]
    PdfWrite(#[from] printpdf::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("document has no pages")]
    EmptyDocument,
}

// ============================================================================
// TESTS
// ============================================================================
