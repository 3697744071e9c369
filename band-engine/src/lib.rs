//! FILENAME: band-engine/src/lib.rs
//! Band-based report engine for Reporta.
//!
//! Turns a declarative report definition and an ordered record slice into
//! positioned pages. It knows nothing about output formats; the
//! `generators` crate turns its output into PDF, text, HTML, CSV or XLSX.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the report IS)
//! - `element`: The positioned contents of bands
//! - `aggregate`: Aggregation actions over record scopes
//! - `engine`: Grouping, layout and pagination (HOW it renders)
//! - `view`: Positioned output pages (WHAT writers consume)

pub mod aggregate;
pub mod definition;
pub mod element;
pub mod engine;
pub mod view;

pub use aggregate::*;
pub use definition::*;
pub use element::*;
pub use engine::{render_report, RenderError, ReportRenderer};
pub use view::*;
